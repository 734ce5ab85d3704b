use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_GRAPH_API_BASE;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Graph API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Graph API response is missing an id")]
    MissingId,
}

/// Error object embedded in Graph API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    pub error_subcode: Option<i64>,
    pub fbtrace_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PermalinkResponse {
    permalink: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMedia {
    pub media_id: String,
    pub permalink: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaPublisher: Send + Sync {
    async fn publish(&self, image_url: &str, caption: &str) -> Result<PublishedMedia, PublishError>;
}

/// Publishes images to one Instagram Business account through the Graph API.
#[derive(Clone)]
pub struct InstagramClient {
    client: Client,
    access_token: String,
    account_id: String,
    api_base: String,
}

impl InstagramClient {
    pub fn new(access_token: String, account_id: String) -> Self {
        Self::with_api_base(access_token, account_id, DEFAULT_GRAPH_API_BASE.to_string())
    }

    pub fn with_api_base(access_token: String, account_id: String, api_base: String) -> Self {
        Self {
            client: Client::new(),
            access_token,
            account_id,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// POST form parameters (plus the access token) and decode a created-object id.
    async fn call_graph(&self, url: &str, params: &[(&str, &str)]) -> Result<String, PublishError> {
        let mut form: Vec<(&str, &str)> = vec![("access_token", self.access_token.as_str())];
        form.extend_from_slice(params);

        let resp = self.client.post(url).form(&form).send().await?;
        let status = resp.status();
        let payload: Value = resp.json().await?;

        if let Some(err) = graph_error(status, &payload) {
            error!(
                url = %url,
                status = status.as_u16(),
                error = ?payload.get("error"),
                "Instagram Graph API error"
            );
            return Err(err);
        }

        let created: CreatedObject = serde_json::from_value(payload).unwrap_or(CreatedObject { id: None });
        created
            .id
            .filter(|id| !id.is_empty())
            .ok_or(PublishError::MissingId)
    }

    async fn create_container(&self, image_url: &str, caption: &str) -> Result<String, PublishError> {
        let url = format!("{}/{}/media", self.api_base, self.account_id);
        self.call_graph(&url, &[("image_url", image_url), ("caption", caption)])
            .await
    }

    async fn publish_container(&self, creation_id: &str) -> Result<String, PublishError> {
        let url = format!("{}/{}/media_publish", self.api_base, self.account_id);
        self.call_graph(&url, &[("creation_id", creation_id)]).await
    }

    /// Best-effort permalink lookup; every failure degrades to `None`.
    pub async fn media_permalink(&self, media_id: &str) -> Option<String> {
        let url = format!("{}/{}", self.api_base, media_id);
        let resp = match self
            .client
            .get(&url)
            .query(&[("access_token", self.access_token.as_str()), ("fields", "permalink")])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Failed to fetch media permalink: {}", e);
                return None;
            }
        };

        let status = resp.status();
        let payload: Value = match resp.json().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to decode media permalink response: {}", e);
                return None;
            }
        };

        if let Some(err) = graph_error(status, &payload) {
            warn!("Failed to fetch media permalink: {}", err);
            return None;
        }

        serde_json::from_value::<PermalinkResponse>(payload)
            .ok()
            .and_then(|p| p.permalink)
    }
}

#[async_trait]
impl MediaPublisher for InstagramClient {
    async fn publish(&self, image_url: &str, caption: &str) -> Result<PublishedMedia, PublishError> {
        let creation_id = self.create_container(image_url, caption).await?;
        debug!("Created media container {}", creation_id);

        let media_id = self.publish_container(&creation_id).await?;
        info!("Published Instagram media {}", media_id);

        let permalink = self.media_permalink(&media_id).await;

        Ok(PublishedMedia {
            media_id,
            permalink,
        })
    }
}

/// A Graph response is an error when the status is not a success or the body carries
/// an `error` object.
fn graph_error(status: reqwest::StatusCode, payload: &Value) -> Option<PublishError> {
    let error_obj = payload.get("error").filter(|e| e.is_object());
    if status.is_success() && error_obj.is_none() {
        return None;
    }

    let message = error_obj
        .and_then(|e| serde_json::from_value::<GraphError>(e.clone()).ok())
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("Graph API request failed: {}", status.as_u16()));

    Some(PublishError::Api {
        status: status.as_u16(),
        message,
    })
}
