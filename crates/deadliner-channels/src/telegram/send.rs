//! Message sending.

use super::types::{TgResponse, TgSentMessage};
use super::{TelegramNotifier, MAX_MESSAGE_LEN};
use crate::utils::split_message;
use deadliner_core::error::DeadlinerError;
use tracing::{debug, warn};

impl TelegramNotifier {
    /// Send an HTML-formatted text message to a chat, splitting it when it
    /// exceeds Telegram's limit. Falls back to plain text if Telegram
    /// rejects the markup.
    pub(crate) async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DeadlinerError> {
        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            let body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
                "parse_mode": "HTML",
            });

            match self.post_message(&body).await {
                Ok(message_id) => {
                    debug!("telegram: delivered message {message_id} to chat {chat_id}");
                }
                Err(e) if e.to_string().contains("can't parse entities") => {
                    warn!("HTML parse failed, retrying as plain text: {e}");
                    let plain_body = serde_json::json!({
                        "chat_id": chat_id,
                        "text": chunk,
                    });
                    self.post_message(&plain_body).await.map_err(|e| {
                        DeadlinerError::Gateway(format!("telegram send (plain fallback) failed: {e}"))
                    })?;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// POST one `sendMessage` call. Returns the delivered message id.
    async fn post_message(&self, body: &serde_json::Value) -> Result<i64, DeadlinerError> {
        let url = format!("{}/sendMessage", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| DeadlinerError::Gateway(format!("telegram send failed: {e}")))?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        let parsed: Option<TgResponse<TgSentMessage>> = serde_json::from_str(&text).ok();

        match parsed {
            Some(TgResponse {
                ok: true,
                result: Some(msg),
                ..
            }) if status.is_success() => Ok(msg.message_id),
            Some(TgResponse {
                description: Some(description),
                ..
            }) => Err(DeadlinerError::Gateway(format!(
                "telegram send failed ({status}): {description}"
            ))),
            _ => Err(DeadlinerError::Gateway(format!(
                "telegram send failed ({status}): {text}"
            ))),
        }
    }
}
