use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::commands::{Command, FALLBACK_HINT, FALLBACK_PHRASES, HELP_TEXT};
use crate::logs::LogCollector;
use crate::memory::RosterStore;
use crate::platform::{IncomingMessage, Outgoing};

pub const EMPTY_ROSTER: &str = "No one is eating shaverma today :(";

/// Turns text commands into replies, owning the roster and log access.
pub struct Dispatcher<R = StdRng> {
    roster: RosterStore,
    logs: LogCollector,
    rng: R,
}

impl Dispatcher<StdRng> {
    pub fn new(roster: RosterStore, logs: LogCollector) -> Self {
        Self::with_rng(roster, logs, StdRng::from_entropy())
    }
}

impl<R: Rng> Dispatcher<R> {
    pub fn with_rng(roster: RosterStore, logs: LogCollector, rng: R) -> Self {
        Self { roster, logs, rng }
    }

    #[cfg(test)]
    pub fn roster(&self) -> &RosterStore {
        &self.roster
    }

    /// Handle one text message. The reply to the originating chat comes
    /// last; side messages (e.g. to the sender privately) precede it.
    pub fn handle_text(&mut self, msg: &IncomingMessage, text: &str) -> Result<Vec<Outgoing>> {
        let command = Command::parse(text);
        info!("{} ({}): {:?}", msg.user_name, msg.user_id, command);

        let replies = match command {
            Command::Help => vec![Outgoing::text(&msg.chat_id, HELP_TEXT)],
            Command::Register => vec![self.register(msg)?],
            Command::Leave => vec![self.leave(msg)],
            Command::List => vec![self.list(msg)],
            Command::Roll => self.roll(msg)?,
            Command::Logs(lines) => vec![Outgoing::text(&msg.chat_id, self.logs.tail(lines))],
            Command::Unknown => vec![Outgoing::text(&msg.chat_id, self.fallback())],
        };
        Ok(replies)
    }

    fn register(&mut self, msg: &IncomingMessage) -> Result<Outgoing> {
        let text = if self.roster.register(&msg.user_id, &msg.user_name)? {
            "Registered!"
        } else {
            "Already registered!"
        };
        Ok(Outgoing::text(&msg.chat_id, text))
    }

    fn leave(&mut self, msg: &IncomingMessage) -> Outgoing {
        let text = if self.roster.unregister(&msg.user_id) {
            "Goodbye!"
        } else {
            "You can't leave if you didn't register!"
        };
        Outgoing::text(&msg.chat_id, text)
    }

    fn list(&self, msg: &IncomingMessage) -> Outgoing {
        if self.roster.session().is_empty() {
            return Outgoing::text(&msg.chat_id, EMPTY_ROSTER);
        }
        let names: Vec<String> = self
            .roster
            .list_session()
            .into_iter()
            .map(escape_markdown)
            .collect();
        let names = names.join("\n");
        Outgoing::markdown(&msg.chat_id, format!("*List of users:*\n\n{}", names))
    }

    fn roll(&mut self, msg: &IncomingMessage) -> Result<Vec<Outgoing>> {
        let mut replies = Vec::new();
        let mut text = format!("{} has started a roll!\n\n", msg.user_name);

        if !self.roster.is_registered(&msg.user_id) {
            replies.push(Outgoing::text(&msg.user_id, "Autoregistered!"));
            self.roster.register(&msg.user_id, &msg.user_name)?;
        }

        info!("Rolling for: {:?}", self.roster.list_session());

        match self.roster.pick_random(&mut self.rng) {
            Some(loser) => text.push_str(&format!("Sorry, you lose, {}", loser.name)),
            None => text.push_str(EMPTY_ROSTER),
        }
        replies.push(Outgoing::text(&msg.chat_id, text));
        Ok(replies)
    }

    fn fallback(&mut self) -> String {
        let phrase = FALLBACK_PHRASES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(FALLBACK_PHRASES[0]);
        format!("{}{}", phrase, FALLBACK_HINT)
    }

    /// Close the durable roster
    pub fn shutdown(self) -> Result<()> {
        self.roster.close()
    }
}

/// Backslash-escape the characters legacy Markdown treats as entity markers.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
