//! Tests for the Telegram gateway.

use super::types::*;
use super::TelegramNotifier;
use deadliner_core::error::DeadlinerError;
use deadliner_core::traits::Notifier;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ok_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "ok": true,
        "result": {"message_id": 77, "chat": {"id": 42, "type": "private"}}
    }))
}

fn notifier_for(server: &MockServer) -> TelegramNotifier {
    TelegramNotifier::with_base_url(format!("{}/bot123:abc", server.uri()))
}

#[test]
fn test_tg_response_error_shape() {
    let resp: TgResponse<TgSentMessage> = serde_json::from_str(
        r#"{"ok": false, "error_code": 403, "description": "Forbidden: bot was blocked by the user"}"#,
    )
    .unwrap();
    assert!(!resp.ok);
    assert!(resp.result.is_none());
    assert_eq!(
        resp.description.as_deref(),
        Some("Forbidden: bot was blocked by the user")
    );
}

#[tokio::test]
async fn test_send_posts_html_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(json!({
            "chat_id": 42,
            "text": "<b>hi</b>",
            "parse_mode": "HTML",
        })))
        .respond_with(ok_response())
        .expect(1)
        .mount(&server)
        .await;

    let notifier = notifier_for(&server);
    assert_eq!(notifier.name(), "telegram");
    notifier.send(42, "<b>hi</b>").await.unwrap();
}

#[tokio::test]
async fn test_send_reports_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "ok": false,
            "error_code": 403,
            "description": "Forbidden: bot was blocked by the user",
        })))
        .mount(&server)
        .await;

    let err = notifier_for(&server).send(42, "hi").await.unwrap_err();
    assert!(matches!(err, DeadlinerError::Gateway(_)));
    assert!(err.to_string().contains("blocked by the user"), "{err}");
}

#[tokio::test]
async fn test_send_falls_back_to_plain_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(json!({"parse_mode": "HTML"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: can't parse entities: unsupported start tag",
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ok_response())
        .expect(1)
        .mount(&server)
        .await;

    notifier_for(&server)
        .send(42, "<x>broken</x>")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_splits_long_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ok_response())
        .expect(2)
        .mount(&server)
        .await;

    let text = "line\n".repeat(1000);
    notifier_for(&server).send(42, &text).await.unwrap();
}

#[tokio::test]
async fn test_unreachable_gateway_is_error() {
    let notifier = TelegramNotifier::with_base_url("http://127.0.0.1:1/bot0");
    let err = notifier.send(42, "hi").await.unwrap_err();
    assert!(matches!(err, DeadlinerError::Gateway(_)));
}
