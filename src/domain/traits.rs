//! # Domain Traits
//!
//! Abstract interfaces for the pipeline's external seams (chat channel,
//! news provider, render surface). Allows for pluggable implementations in
//! the Infrastructure layer and fakes in tests.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::types::{FetchError, NewsRecord, RenderError, Reply};

/// Abstract interface for an outbound chat channel (e.g., Matrix, Console)
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Transmit one reply envelope to the room this channel is bound to
    async fn send_reply(&self, reply: Reply) -> Result<(), String>;

    /// Get the current room ID
    fn room_id(&self) -> String;
}

/// Abstract interface for the upstream news provider
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch up to `count` news records. Single attempt, no retry.
    async fn fetch_news(&self, api_key: &str, count: u32) -> Result<Vec<NewsRecord>, FetchError>;
}

/// Abstract interface for the markup-to-bitmap render surface
#[async_trait]
pub trait Compositor: Send + Sync {
    /// Lay out the markup document and capture a PNG snapshot of the canvas
    async fn compose(&self, markup: &str) -> Result<Bytes, RenderError>;
}
