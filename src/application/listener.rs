//! # Trigger Listener
//!
//! External-facing entry point: inspects inbound text events, recognizes
//! the trigger phrase, and spawns the report pipeline so the host's
//! synchronous handler call returns immediately.

use std::sync::Arc;

use crate::application::pipeline::ReportPipeline;
use crate::domain::traits::ChatChannel;

/// Exact literal that activates the pipeline (prefix match after trimming).
pub const TRIGGER: &str = "AI日报";

/// Cooperative signal to the host dispatcher: whether remaining handlers
/// should still see this event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFlow {
    Continue,
    Break,
}

pub struct TriggerListener {
    pipeline: Arc<ReportPipeline>,
}

impl TriggerListener {
    pub fn new(pipeline: Arc<ReportPipeline>) -> Self {
        Self { pipeline }
    }

    /// Prefix match on the trimmed message body. "AI日报123" matches,
    /// "日报AI" does not.
    pub fn matches(content: &str) -> bool {
        content.trim().starts_with(TRIGGER)
    }

    /// Synchronous entry point for inbound text events. On a trigger match
    /// the pipeline runs on its own task; this call never awaits it.
    pub fn on_text_event(&self, content: &str, channel: Arc<dyn ChatChannel>) -> EventFlow {
        if !Self::matches(content) {
            return EventFlow::Continue;
        }

        tracing::info!("收到消息: {}", content.trim());
        let pipeline = self.pipeline.clone();
        tokio::spawn(async move {
            pipeline.run(channel).await;
        });
        EventFlow::Break
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Mutex;

    use crate::domain::config::NewsConfig;
    use crate::domain::traits::{Compositor, NewsSource};
    use crate::domain::types::{FetchError, NewsRecord, RenderError, Reply};
    use bytes::Bytes;

    #[test]
    fn trigger_is_an_exact_prefix_match() {
        assert!(TriggerListener::matches("AI日报"));
        assert!(TriggerListener::matches("AI日报123"));
        assert!(TriggerListener::matches("  AI日报 今天"));
        assert!(!TriggerListener::matches("日报AI"));
        assert!(!TriggerListener::matches("ai日报"));
        assert!(!TriggerListener::matches(""));
    }

    struct EmptySource;

    #[async_trait]
    impl NewsSource for EmptySource {
        async fn fetch_news(
            &self,
            _api_key: &str,
            _count: u32,
        ) -> Result<Vec<NewsRecord>, FetchError> {
            Ok(Vec::new())
        }
    }

    struct StubCompositor;

    #[async_trait]
    impl Compositor for StubCompositor {
        async fn compose(&self, _markup: &str) -> Result<Bytes, RenderError> {
            Ok(Bytes::from_static(b"png"))
        }
    }

    #[derive(Default)]
    struct RecordingChannel {
        replies: Mutex<Vec<Reply>>,
    }

    #[async_trait]
    impl ChatChannel for RecordingChannel {
        async fn send_reply(&self, reply: Reply) -> Result<(), String> {
            self.replies.lock().await.push(reply);
            Ok(())
        }

        fn room_id(&self) -> String {
            "!test:example.org".to_string()
        }
    }

    fn listener() -> TriggerListener {
        let pipeline = ReportPipeline::new(
            Ok(NewsConfig {
                api_key: "k".to_string(),
            }),
            Arc::new(EmptySource),
            Arc::new(StubCompositor),
        );
        TriggerListener::new(Arc::new(pipeline))
    }

    #[tokio::test]
    async fn non_trigger_message_is_ignored() {
        let channel = Arc::new(RecordingChannel::default());
        let flow = listener().on_text_event("日报AI", channel.clone());

        assert_eq!(flow, EventFlow::Continue);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(channel.replies.lock().await.is_empty());
    }

    #[tokio::test]
    async fn trigger_spawns_pipeline_and_breaks() {
        let channel = Arc::new(RecordingChannel::default());
        let flow = listener().on_text_event("AI日报", channel.clone());
        assert_eq!(flow, EventFlow::Break);

        // The pipeline runs on its own task; poll for the reply.
        for _ in 0..200 {
            if !channel.replies.lock().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let replies = channel.replies.lock().await;
        assert_eq!(replies.len(), 1);
        assert!(matches!(replies[0], Reply::Image(_)));
    }
}
