pub mod telegram;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// One entry of a getUpdates batch, as delivered by the Bot API.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Value>,
}

/// Content kinds a message can carry, in classification priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Audio,
    Document,
    Photo,
    Sticker,
    Video,
    Voice,
    VideoNote,
    Game,
    Contact,
    Location,
    Caption,
    Venue,
}

impl MessageKind {
    const PRIORITY: [MessageKind; 13] = [
        MessageKind::Text,
        MessageKind::Audio,
        MessageKind::Document,
        MessageKind::Photo,
        MessageKind::Sticker,
        MessageKind::Video,
        MessageKind::Voice,
        MessageKind::VideoNote,
        MessageKind::Game,
        MessageKind::Contact,
        MessageKind::Location,
        MessageKind::Caption,
        MessageKind::Venue,
    ];

    /// Message field whose presence marks this kind
    pub fn field(self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Audio => "audio",
            MessageKind::Document => "document",
            MessageKind::Photo => "photo",
            MessageKind::Sticker => "sticker",
            MessageKind::Video => "video",
            MessageKind::Voice => "voice",
            MessageKind::VideoNote => "video_note",
            MessageKind::Game => "game",
            MessageKind::Contact => "contact",
            MessageKind::Location => "location",
            MessageKind::Caption => "caption",
            MessageKind::Venue => "venue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("message carries no supported content field")]
pub struct UnsupportedMessageKind;

/// Classify a message payload by the first known content field it carries.
pub fn classify(message: &Map<String, Value>) -> Result<MessageKind, UnsupportedMessageKind> {
    MessageKind::PRIORITY
        .into_iter()
        .find(|kind| message.contains_key(kind.field()))
        .ok_or(UnsupportedMessageKind)
}

#[derive(Debug, Error)]
pub enum AdaptError {
    /// The update is well formed but its content can't be handled.
    /// Carries the chat so the sender can still be told.
    #[error("unsupported message kind in chat {chat_id}")]
    Unsupported { chat_id: String },
    #[error("update is missing `{0}`")]
    Malformed(&'static str),
}

/// A message received from Telegram, reduced to what the bot works with
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub chat_id: String,
    pub user_id: String,
    /// First name, plus last name when one is set
    pub user_name: String,
    pub kind: MessageKind,
    pub message: Map<String, Value>,
}

impl IncomingMessage {
    pub fn text(&self) -> Option<&str> {
        self.message.get("text").and_then(Value::as_str)
    }

    pub fn sticker_file_id(&self) -> Option<&str> {
        self.message
            .get("sticker")
            .and_then(|sticker| sticker.get("file_id"))
            .and_then(Value::as_str)
    }
}

/// Normalize a raw update into an [`IncomingMessage`].
pub fn adapt(update: &RawUpdate) -> Result<IncomingMessage, AdaptError> {
    let message = update
        .message
        .as_ref()
        .and_then(Value::as_object)
        .ok_or(AdaptError::Malformed("message"))?;

    let chat_id = message
        .get("chat")
        .and_then(|chat| chat.get("id"))
        .and_then(id_string)
        .ok_or(AdaptError::Malformed("chat.id"))?;

    let user = message
        .get("from")
        .and_then(Value::as_object)
        .ok_or(AdaptError::Malformed("from"))?;
    let user_id = user
        .get("id")
        .and_then(id_string)
        .ok_or(AdaptError::Malformed("from.id"))?;
    let user_name = display_name(user).ok_or(AdaptError::Malformed("from.first_name"))?;

    let kind = classify(message).map_err(|_| AdaptError::Unsupported {
        chat_id: chat_id.clone(),
    })?;

    Ok(IncomingMessage {
        chat_id,
        user_id,
        user_name,
        kind,
        message: message.clone(),
    })
}

/// "First Last", or just "First" when the last name is absent or empty.
pub fn display_name(user: &Map<String, Value>) -> Option<String> {
    let first = user.get("first_name").and_then(Value::as_str)?;
    match user.get("last_name").and_then(Value::as_str) {
        Some(last) if !last.is_empty() => Some(format!("{} {}", first, last)),
        _ => Some(first.to_string()),
    }
}

// Telegram ids are integers; they're kept as strings so they can key the roster.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// A reply the bot wants delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub chat_id: String,
    pub content: OutgoingContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingContent {
    Text { text: String, markdown: bool },
    Sticker { file_id: String },
}

impl Outgoing {
    pub fn text(chat_id: &str, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            content: OutgoingContent::Text {
                text: text.into(),
                markdown: false,
            },
        }
    }

    pub fn markdown(chat_id: &str, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            content: OutgoingContent::Text {
                text: text.into(),
                markdown: true,
            },
        }
    }

    pub fn sticker(chat_id: &str, file_id: &str) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            content: OutgoingContent::Sticker {
                file_id: file_id.to_string(),
            },
        }
    }
}
