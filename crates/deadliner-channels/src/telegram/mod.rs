//! Telegram Bot API gateway.
//!
//! Delivers reminders with `sendMessage`.
//! Docs: <https://core.telegram.org/bots/api>

mod send;
pub(crate) mod types;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use deadliner_core::{config::TelegramConfig, error::DeadlinerError, traits::Notifier};

/// Telegram's per-message text limit.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Notification gateway backed by a Telegram bot.
pub struct TelegramNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramNotifier {
    /// Create a gateway from config. The token is captured here and never
    /// read from global state afterwards.
    pub fn new(config: &TelegramConfig) -> Self {
        Self::with_base_url(format!("https://api.telegram.org/bot{}", config.bot_token))
    }

    /// Create a gateway talking to an explicit Bot API base URL
    /// (`.../bot<token>`).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<(), DeadlinerError> {
        self.send_text(chat_id, text).await
    }
}
