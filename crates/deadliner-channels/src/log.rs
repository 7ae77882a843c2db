//! Log-only gateway, used when no messaging platform is configured.

use async_trait::async_trait;
use deadliner_core::{error::DeadlinerError, traits::Notifier};
use tracing::info;

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<(), DeadlinerError> {
        info!("notification for chat {chat_id}:\n{text}");
        Ok(())
    }
}
