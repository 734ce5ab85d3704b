//! HTTP server for the photo relay
//!
//! Serves the Telegram webhook plus a small landing page describing the setup.

use anyhow::Result;
use axum::{
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::webhook::webhook_handler;
use crate::config::{Config, ServerConfig, REQUIRED_VARS};
use crate::instagram::{InstagramClient, MediaPublisher};
use crate::telegram::{TelegramApi, TelegramClient};

/// Shared, read-only state for every request.
pub struct AppState {
    pub config: Arc<Config>,
    pub telegram: Arc<dyn TelegramApi>,
    pub publisher: Arc<dyn MediaPublisher>,
}

impl AppState {
    /// State backed by the real Telegram and Graph API clients.
    pub fn from_config(config: Arc<Config>) -> Self {
        let telegram = TelegramClient::with_api_base(
            config.telegram_bot_token.clone(),
            config.telegram_api_base.clone(),
        );
        let publisher = InstagramClient::with_api_base(
            config.instagram_access_token.clone(),
            config.instagram_business_account_id.clone(),
            config.graph_api_base.clone(),
        );

        Self {
            config,
            telegram: Arc::new(telegram),
            publisher: Arc::new(publisher),
        }
    }
}

pub struct Server {
    config: Arc<Config>,
    server: ServerConfig,
}

impl Server {
    pub fn new(config: Arc<Config>, server: ServerConfig) -> Self {
        Self { config, server }
    }

    pub async fn run(&self) -> Result<()> {
        let state = Arc::new(AppState::from_config(self.config.clone()));
        let app = router(state);

        let addr: SocketAddr = format!("{}:{}", self.server.bind, self.server.port).parse()?;

        info!("Starting HTTP server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/health", get(health_check))
        .route("/webhook", post(webhook_handler))
        // Legacy path for bots registered before /webhook existed
        .route("/api/telegram", post(webhook_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn landing_page() -> Html<String> {
    Html(render_landing_page())
}

const SETUP_STEPS: [(&str, &str); 3] = [
    (
        "Configure secrets",
        "Export the required environment variables, or put them in a <code>.env.local</code> file next to the binary.",
    ),
    (
        "Register Telegram webhook",
        "Point your bot to the <code>/webhook</code> endpoint and include the shared secret, or run <code>photo-relay set-webhook --public-url &lt;url&gt;</code>.",
    ),
    (
        "Send a photo message",
        "Send a photo with an optional caption in Telegram. The bot forwards it to Instagram.",
    ),
];

fn render_landing_page() -> String {
    let steps: String = SETUP_STEPS
        .iter()
        .map(|(title, description)| format!("<li><strong>{}</strong><p>{}</p></li>", title, description))
        .collect();
    let vars: String = REQUIRED_VARS
        .iter()
        .map(|var| format!("<li><code>{}</code></li>", var))
        .collect();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Telegram → Instagram</title>
</head>
<body>
<main>
<h1>Telegram → Instagram</h1>
<p>Bridge a Telegram bot with an Instagram Business profile. When a user sends a photo to the bot, it is published to Instagram with the same caption.</p>
<h2>Setup checklist</h2>
<ol>{steps}</ol>
<h2>Environment variables</h2>
<ul>{vars}</ul>
<h2>Webhook registration</h2>
<pre>curl -X POST "https://api.telegram.org/bot$TELEGRAM_BOT_TOKEN/setWebhook" \
  -H "Content-Type: application/json" \
  -d '{{"url":"https://&lt;your-host&gt;/webhook?secret=$TELEGRAM_WEBHOOK_SECRET"}}'</pre>
</main>
</body>
</html>
"#
    )
}

/// Wait for ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("ctrl-c handler failed: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received ctrl-c, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
