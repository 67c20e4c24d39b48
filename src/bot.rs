use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::config::TelegramConfig;
use crate::dispatcher::Dispatcher;
use crate::platform::telegram::{ApiError, BotApi};
use crate::platform::{
    adapt, AdaptError, IncomingMessage, MessageKind, Outgoing, OutgoingContent, RawUpdate,
};
use crate::polling::Poller;
use crate::stickers;

/// Long-polling bot: fetches a batch, handles each update in order, and
/// moves the cursor past it before touching the next one.
pub struct Bot<A, R> {
    api: A,
    poller: Poller,
    dispatcher: Dispatcher<R>,
    retry_delay: Duration,
}

impl<A: BotApi, R: Rng> Bot<A, R> {
    pub fn new(api: A, dispatcher: Dispatcher<R>, config: &TelegramConfig) -> Self {
        Self {
            api,
            poller: Poller::new(config.poll_timeout_secs),
            dispatcher,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    #[cfg(test)]
    pub fn api(&self) -> &A {
        &self.api
    }

    #[cfg(test)]
    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    #[cfg(test)]
    pub fn dispatcher(&self) -> &Dispatcher<R> {
        &self.dispatcher
    }

    /// Poll until Ctrl-C or SIGTERM, then close the roster.
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Poll until `shutdown` resolves, then close the roster.
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        info!("Starting Telegram polling...");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = self.poll_once() => {}
            }
        }

        self.dispatcher.shutdown()?;
        info!("Logs and DB closed");
        Ok(())
    }

    /// One polling round. Returns how many updates were handled.
    pub async fn poll_once(&mut self) -> usize {
        let updates = match self.poller.fetch_batch(&self.api).await {
            Ok(updates) => updates,
            Err(e @ ApiError::BadResponse { .. }) => {
                warn!("{}", e);
                return 0;
            }
            Err(e) => {
                warn!("{}", e);
                tokio::time::sleep(self.retry_delay).await;
                return 0;
            }
        };

        let count = updates.len();
        for update in &updates {
            self.process_update(update).await;
            self.poller.acknowledge(update.update_id);
        }
        if count > 0 {
            debug!(
                "Handled {} update(s), offset now {:?}",
                count,
                self.poller.cursor().offset()
            );
        }
        count
    }

    async fn process_update(&mut self, update: &RawUpdate) {
        let msg = match adapt(update) {
            Ok(msg) => msg,
            Err(AdaptError::Unsupported { chat_id }) => {
                info!(
                    "Unsupported message type! JSON:\n{}",
                    update.message.as_ref().map(|m| m.to_string()).unwrap_or_default()
                );
                self.deliver(&[Outgoing::text(&chat_id, "What is it?")]).await;
                return;
            }
            Err(e) => {
                warn!("Skipping update {}: {}", update.update_id, e);
                return;
            }
        };

        match self.route(&msg) {
            Ok(replies) => self.deliver(&replies).await,
            Err(e) => error!("Error handling update {}: {:#}", update.update_id, e),
        }
    }

    fn route(&mut self, msg: &IncomingMessage) -> Result<Vec<Outgoing>> {
        match msg.kind {
            MessageKind::Text => {
                let text = msg.text().unwrap_or_default();
                self.dispatcher.handle_text(msg, text)
            }
            MessageKind::Sticker => {
                info!("{} sent sticker", msg.user_name);
                let reply = stickers::reply_sticker(msg.sticker_file_id().unwrap_or_default());
                Ok(vec![Outgoing::sticker(&msg.chat_id, reply)])
            }
            _ => Ok(vec![Outgoing::text(&msg.chat_id, "Use /help")]),
        }
    }

    async fn deliver(&self, replies: &[Outgoing]) {
        for reply in replies {
            let result = match &reply.content {
                OutgoingContent::Text { text, markdown } => {
                    self.api.send_message(&reply.chat_id, text, *markdown).await
                }
                OutgoingContent::Sticker { file_id } => {
                    self.api.send_sticker(&reply.chat_id, file_id).await
                }
            };
            if let Err(e) = result {
                warn!("Failed to deliver reply to {}: {}", reply.chat_id, e);
            }
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => {
                        if let Err(e) = result {
                            warn!("Failed to listen for Ctrl-C: {}", e);
                        }
                    }
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
        }
    }
}
