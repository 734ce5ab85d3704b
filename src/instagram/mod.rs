//! Instagram Graph API publishing.

pub mod client;

#[cfg(test)]
pub use client::MockMediaPublisher;
pub use client::{GraphError, InstagramClient, MediaPublisher, PublishError, PublishedMedia};
