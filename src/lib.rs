//! Relay photos sent to a Telegram bot to an Instagram Business account.
//!
//! One webhook delivery resolves the largest photo variant to a download URL,
//! publishes it through the Graph API and replies to the sender with the result.

pub mod config;
pub mod instagram;
pub mod server;
pub mod telegram;
