use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::http::AppState;
use super::messages::{
    confirmation_text, derive_caption, ONBOARDING_TEXT, PHOTO_REQUIRED_TEXT, PUBLISH_FAILED_TEXT,
};
use crate::instagram::{PublishError, PublishedMedia};
use crate::telegram::{select_highest_resolution, PhotoSize, TelegramError, Update};

/// Rejections reported straight to the webhook caller, before any chat is known.
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid payload")]
    InvalidPayload(#[source] serde_json::Error),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::Forbidden => StatusCode::FORBIDDEN,
            WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "ok": false, "error": self.to_string() }))).into_response()
    }
}

/// Failures of the fetch-and-publish step. These end up as a chat message, never as
/// an HTTP error.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("file resolution failed: {0}")]
    File(#[from] TelegramError),

    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),
}

pub async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, WebhookError> {
    // 1. Verify shared secret
    if !secret_matches(&state.config.telegram_webhook_secret, params.get("secret")) {
        warn!("Rejected webhook call with invalid secret");
        return Err(WebhookError::Forbidden);
    }

    // 2. Parse Update
    let update: Update = serde_json::from_slice(&body).map_err(|e| {
        warn!("Unable to parse webhook payload: {}", e);
        WebhookError::InvalidPayload(e)
    })?;

    handle_update(&state, update).await;

    Ok(Json(json!({ "ok": true })))
}

fn secret_matches(expected: &str, provided: Option<&String>) -> bool {
    match provided {
        Some(provided) => bool::from(expected.as_bytes().ct_eq(provided.as_bytes())),
        None => false,
    }
}

/// Run one update through the bridge. Every outcome is reported to the chat, so this
/// never fails.
pub async fn handle_update(state: &AppState, update: Update) {
    let update_id = update.update_id;
    let Some(message) = update.into_message() else {
        debug!("Ignoring update {} without a message", update_id);
        return;
    };

    let chat_id = message.chat.id;

    if message.is_start_command() {
        notify(state, chat_id, ONBOARDING_TEXT).await;
        return;
    }

    let Some(photo) = message.photos().and_then(select_highest_resolution) else {
        notify(state, chat_id, PHOTO_REQUIRED_TEXT).await;
        return;
    };

    let caption = derive_caption(message.caption.as_deref().or(message.text.as_deref()));

    match relay_photo(state, photo, &caption).await {
        Ok(published) => {
            info!(
                "Relayed photo {}x{} from chat {} as media {}",
                photo.width, photo.height, chat_id, published.media_id
            );
            let text = confirmation_text(photo, published.permalink.as_deref());
            notify(state, chat_id, &text).await;
        }
        Err(e) => {
            error!("Failed to complete Instagram publish workflow for chat {}: {}", chat_id, e);
            notify(state, chat_id, PUBLISH_FAILED_TEXT).await;
        }
    }
}

async fn relay_photo(
    state: &AppState,
    photo: &PhotoSize,
    caption: &str,
) -> Result<PublishedMedia, RelayError> {
    let file_url = state.telegram.get_file_url(&photo.file_id).await?;
    let published = state.publisher.publish(&file_url, caption).await?;
    Ok(published)
}

/// Send a reply, logging instead of failing: the webhook must still answer 200.
async fn notify(state: &AppState, chat_id: i64, text: &str) {
    if let Err(e) = state.telegram.send_message(chat_id, text).await {
        error!("Failed to send Telegram message to chat {}: {}", chat_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::instagram::MockMediaPublisher;
    use crate::telegram::MockTelegramApi;

    const SECRET: &str = "s3cret";

    fn config() -> Arc<Config> {
        let config = Config::from_lookup(|key| {
            Some(match key {
                "TELEGRAM_WEBHOOK_SECRET" => SECRET.to_string(),
                "TELEGRAM_BOT_TOKEN" => "1:abc".to_string(),
                "INSTAGRAM_ACCESS_TOKEN" => "EAAG".to_string(),
                "INSTAGRAM_BUSINESS_ACCOUNT_ID" => "1784".to_string(),
                _ => return None,
            })
        })
        .unwrap();
        Arc::new(config)
    }

    fn state(telegram: MockTelegramApi, publisher: MockMediaPublisher) -> Arc<AppState> {
        Arc::new(AppState {
            config: config(),
            telegram: Arc::new(telegram),
            publisher: Arc::new(publisher),
        })
    }

    fn query(secret: Option<&str>) -> Query<HashMap<String, String>> {
        let mut params = HashMap::new();
        if let Some(secret) = secret {
            params.insert("secret".to_string(), secret.to_string());
        }
        Query(params)
    }

    #[tokio::test]
    async fn test_wrong_secret_makes_no_calls() {
        let mut telegram = MockTelegramApi::new();
        telegram.expect_send_message().times(0);
        telegram.expect_get_file_url().times(0);
        let mut publisher = MockMediaPublisher::new();
        publisher.expect_publish().times(0);

        let body = Bytes::from_static(br#"{"message": {"chat": {"id": 1}, "text": "/start"}}"#);
        let result = webhook_handler(State(state(telegram, publisher)), query(Some("nope")), body).await;

        assert!(matches!(result, Err(WebhookError::Forbidden)));
    }

    #[tokio::test]
    async fn test_missing_secret_is_forbidden() {
        let body = Bytes::from_static(b"{}");
        let result = webhook_handler(
            State(state(MockTelegramApi::new(), MockMediaPublisher::new())),
            query(None),
            body,
        )
        .await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_bad_request() {
        let body = Bytes::from_static(b"{not json");
        let result = webhook_handler(
            State(state(MockTelegramApi::new(), MockMediaPublisher::new())),
            query(Some(SECRET)),
            body,
        )
        .await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_file_resolution_failure_sends_notice() {
        let mut telegram = MockTelegramApi::new();
        telegram
            .expect_get_file_url()
            .returning(|_| Err(TelegramError::MissingFilePath));
        telegram
            .expect_send_message()
            .withf(|chat_id, text| *chat_id == 5 && text == PUBLISH_FAILED_TEXT)
            .times(1)
            .returning(|_, _| Ok(()));
        let mut publisher = MockMediaPublisher::new();
        publisher.expect_publish().times(0);

        let body = Bytes::from_static(
            br#"{"message": {"chat": {"id": 5}, "photo": [{"file_id": "a", "width": 10, "height": 10}]}}"#,
        );
        let result = webhook_handler(State(state(telegram, publisher)), query(Some(SECRET)), body).await;

        assert_eq!(result.unwrap().0, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_reply_failure_still_answers_ok() {
        let mut telegram = MockTelegramApi::new();
        telegram
            .expect_send_message()
            .times(1)
            .returning(|_, _| {
                Err(TelegramError::Status {
                    method: "sendMessage",
                    status: 403,
                    body: "bot was blocked by the user".to_string(),
                })
            });

        let body = Bytes::from_static(br#"{"message": {"chat": {"id": 9}, "text": "hello"}}"#);
        let result = webhook_handler(
            State(state(telegram, MockMediaPublisher::new())),
            query(Some(SECRET)),
            body,
        )
        .await;

        assert_eq!(result.unwrap().0, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_selects_largest_variant_and_caption() {
        let mut telegram = MockTelegramApi::new();
        telegram
            .expect_get_file_url()
            .withf(|file_id| file_id == "large")
            .times(1)
            .returning(|id| Ok(format!("https://files.example/{}.jpg", id)));
        telegram
            .expect_send_message()
            .withf(|_, text| text.contains("Photo size: 1280x960") && !text.contains("🔗"))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut publisher = MockMediaPublisher::new();
        publisher
            .expect_publish()
            .withf(|url, caption| url == "https://files.example/large.jpg" && caption == "holiday")
            .times(1)
            .returning(|_, _| {
                Ok(PublishedMedia {
                    media_id: "m1".to_string(),
                    permalink: None,
                })
            });

        let body = Bytes::from_static(
            br#"{"update_id": 3, "edited_message": {"chat": {"id": 2}, "caption": "  holiday ", "photo": [
                {"file_id": "small", "width": 320, "height": 240},
                {"file_id": "large", "width": 1280, "height": 960},
                {"file_id": "mid", "width": 800, "height": 600}
            ]}}"#,
        );
        let result = webhook_handler(State(state(telegram, publisher)), query(Some(SECRET)), body).await;

        assert!(result.is_ok());
    }
}
