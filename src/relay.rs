use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::context::BotContext;
use crate::platform::ChatSender;

/// Default time between two relay ticks.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(10 * 60);

/// Periodically pushes the change feed, translated, to one fixed chat.
pub struct RelayLoop {
    ctx: BotContext,
    sender: Arc<dyn ChatSender>,
    chat_id: String,
    target_language: String,
    period: Duration,
}

impl RelayLoop {
    pub fn new(
        ctx: BotContext,
        sender: Arc<dyn ChatSender>,
        chat_id: String,
        target_language: String,
    ) -> Self {
        Self {
            ctx,
            sender,
            chat_id,
            target_language,
            period: DEFAULT_PERIOD,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// One fetch-translate-send round. Returns whether a message went out.
    pub async fn tick(&self) -> bool {
        let changes = match self.ctx.feed.fetch().await {
            Ok(changes) => changes,
            Err(e) => {
                warn!("Error fetching recent changes, skipping relay tick: {}", e);
                return false;
            }
        };

        let text = self
            .ctx
            .translate_or_original(&changes, &self.target_language)
            .await;

        match self.sender.send(&self.chat_id, &text).await {
            Ok(()) => {
                info!("Relayed recent changes to chat {}", self.chat_id);
                true
            }
            Err(e) => {
                error!("Failed to relay recent changes to chat {}: {:#}", self.chat_id, e);
                false
            }
        }
    }

    /// Tick immediately, then once per period, until `shutdown` changes or its sender drops.
    ///
    /// Ticks never overlap: a slow tick delays the next one instead of queueing a burst.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Relay loop started: chat {}, language {}, every {:?}",
            self.chat_id, self.target_language, self.period
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = shutdown.changed() => {
                    break;
                }
            }
        }

        info!("Relay loop stopped");
    }
}
