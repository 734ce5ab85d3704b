pub mod http;
pub mod messages;
pub mod webhook;

pub use http::{router, AppState, Server};
pub use webhook::{handle_update, webhook_handler, RelayError, WebhookError};
