//! # Domain Types
//!
//! News records, the reply envelope handed to the chat channel, and the
//! error taxonomy of the report pipeline.

use bytes::Bytes;
use thiserror::Error;

use crate::strings::messages;

/// A single normalized news item from the provider.
///
/// Leaf fields that the provider omitted are already replaced with
/// placeholder strings by the time this struct exists; only the image
/// reference stays optional so the renderer can drop incomplete records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsRecord {
    pub title: String,
    pub description: String,
    pub published_at: String,
    pub image_url: Option<String>,
}

/// The reply envelope delivered to the chat channel: exactly one of these
/// is produced per trigger invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Rendered card as a PNG bitmap.
    Image(Bytes),
    /// Short user-safe message (Chinese) describing the failure.
    Error(String),
}

/// Configuration failures. The Display text is shown to the user verbatim.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("请先配置{0}文件")]
    Missing(String),
    #[error("API key配置缺失。")]
    MissingKey,
    #[error("配置文件解析失败: {0}")]
    Invalid(String),
}

/// Failures while talking to the news provider.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("provider returned code {0}: {1}")]
    Provider(i64, String),
    #[error("malformed response body: {0}")]
    Malformed(String),
}

/// Failures while compositing the card in the render surface.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch render surface: {0}")]
    Launch(String),
    #[error("render surface error: {0}")]
    Surface(String),
    #[error("content did not settle within {0} seconds")]
    Timeout(u64),
}

/// Union of everything that can terminate a pipeline invocation early.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PipelineError {
    /// Short Chinese message safe to show the end user. The full
    /// diagnostic only goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            // Config problems are actionable by the operator, report verbatim.
            PipelineError::Config(e) => e.to_string(),
            PipelineError::Fetch(FetchError::Provider(..))
            | PipelineError::Fetch(FetchError::Malformed(_)) => {
                messages::FETCH_BAD_FORMAT.to_string()
            }
            PipelineError::Fetch(_) => messages::FETCH_FAILED.to_string(),
            PipelineError::Render(_) => messages::RENDER_FAILED.to_string(),
        }
    }
}
