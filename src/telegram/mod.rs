//! Telegram Bot API: inbound update payloads and the outbound client.

pub mod client;
pub mod types;

#[cfg(test)]
pub use client::MockTelegramApi;
pub use client::{TelegramApi, TelegramClient, TelegramError};
pub use types::{select_highest_resolution, Chat, Message, PhotoSize, Update};
