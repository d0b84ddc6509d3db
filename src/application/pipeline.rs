//! # Report Pipeline
//!
//! Orchestrates one trigger invocation: fetch the feed, render the markup,
//! compose the bitmap, deliver the reply. Each stage either passes its
//! output forward or short-circuits into the error-reporting path; both
//! paths terminate in exactly one reply to the channel.

use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::application::card;
use crate::domain::config::NewsConfig;
use crate::domain::traits::{ChatChannel, Compositor, NewsSource};
use crate::domain::types::{ConfigError, PipelineError, RenderError, Reply};

use bytes::Bytes;

/// The provider page size. The card layout fits six units.
pub const NEWS_COUNT: u32 = 6;

/// Ceiling on simultaneously live render surfaces across invocations.
const MAX_RENDER_SURFACES: usize = 2;

pub struct ReportPipeline {
    config: Result<NewsConfig, ConfigError>,
    source: Arc<dyn NewsSource>,
    compositor: Arc<dyn Compositor>,
    render_slots: Arc<Semaphore>,
}

impl ReportPipeline {
    pub fn new(
        config: Result<NewsConfig, ConfigError>,
        source: Arc<dyn NewsSource>,
        compositor: Arc<dyn Compositor>,
    ) -> Self {
        Self {
            config,
            source,
            compositor,
            render_slots: Arc::new(Semaphore::new(MAX_RENDER_SURFACES)),
        }
    }

    /// Run one invocation end to end and deliver the outcome. Never
    /// returns an error: every failure becomes an ERROR reply.
    pub async fn run(&self, channel: Arc<dyn ChatChannel>) {
        let result = self.generate().await;
        deliver(result, channel.as_ref()).await;
    }

    async fn generate(&self) -> Result<Bytes, PipelineError> {
        // A bad config is remembered from startup; no network call happens.
        let config = self.config.as_ref().map_err(|e| e.clone())?;

        let feed = self.source.fetch_news(&config.api_key, NEWS_COUNT).await?;
        tracing::info!("获取到 {} 条资讯, 开始生成HTML内容...", feed.len());

        let markup = card::render_markup(&feed);
        tracing::debug!("生成的HTML内容长度: {}", markup.len());

        let _permit = self
            .render_slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| RenderError::Surface("render slots closed".to_string()))?;

        let image = self.compositor.compose(&markup).await?;
        tracing::debug!("卡片生成完成 ({} bytes)", image.len());
        Ok(image)
    }
}

/// Wrap the pipeline outcome in a reply envelope and hand it to the
/// channel. The failure is logged before the reply is built, so a dead
/// channel never suppresses the log record.
pub async fn deliver(result: Result<Bytes, PipelineError>, channel: &dyn ChatChannel) {
    let reply = match result {
        Ok(image) => Reply::Image(image),
        Err(err) => {
            tracing::error!("报告生成失败: {err}");
            Reply::Error(err.user_message())
        }
    };

    if let Err(e) = channel.send_reply(reply).await {
        tracing::error!("回复发送失败 (room {}): {}", channel.room_id(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    use crate::domain::types::{FetchError, NewsRecord};

    fn record(n: usize) -> NewsRecord {
        NewsRecord {
            title: format!("资讯{n}"),
            description: format!("描述{n}"),
            published_at: "2024-05-01 08:00".to_string(),
            image_url: Some(format!("https://img/{n}.png")),
        }
    }

    enum SourceMode {
        Feed(Vec<NewsRecord>),
        Fail,
    }

    struct FakeSource {
        mode: SourceMode,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn with_feed(feed: Vec<NewsRecord>) -> Self {
            Self {
                mode: SourceMode::Feed(feed),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                mode: SourceMode::Fail,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl NewsSource for FakeSource {
        async fn fetch_news(
            &self,
            _api_key: &str,
            _count: u32,
        ) -> Result<Vec<NewsRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.mode {
                SourceMode::Feed(feed) => Ok(feed.clone()),
                SourceMode::Fail => Err(FetchError::Status(500)),
            }
        }
    }

    struct FakeCompositor {
        calls: AtomicUsize,
    }

    impl FakeCompositor {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Compositor for FakeCompositor {
        async fn compose(&self, _markup: &str) -> Result<Bytes, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from_static(b"png-bytes"))
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

    fn good_config() -> Result<NewsConfig, ConfigError> {
        Ok(NewsConfig {
            api_key: "test-key".to_string(),
        })
    }

    #[tokio::test]
    async fn full_feed_yields_exactly_one_image_reply() {
        let feed: Vec<NewsRecord> = (0..6).map(record).collect();
        let pipeline = ReportPipeline::new(
            good_config(),
            Arc::new(FakeSource::with_feed(feed)),
            Arc::new(FakeCompositor::new()),
        );
        let channel = Arc::new(RecordingChannel::default());

        pipeline.run(channel.clone()).await;

        let replies = channel.replies.lock().await;
        assert_eq!(replies.len(), 1);
        assert!(matches!(replies[0], Reply::Image(_)));
    }

    #[tokio::test]
    async fn missing_config_yields_error_reply_without_fetch() {
        let source = Arc::new(FakeSource::with_feed(vec![record(0)]));
        let pipeline = ReportPipeline::new(
            Err(ConfigError::Missing("data/config.json".to_string())),
            source.clone(),
            Arc::new(FakeCompositor::new()),
        );
        let channel = Arc::new(RecordingChannel::default());

        pipeline.run(channel.clone()).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        let replies = channel.replies.lock().await;
        assert_eq!(replies.len(), 1);
        match &replies[0] {
            Reply::Error(msg) => assert!(msg.contains("data/config.json")),
            other => panic!("expected error reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_failure_yields_generic_error_reply() {
        let pipeline = ReportPipeline::new(
            good_config(),
            Arc::new(FakeSource::failing()),
            Arc::new(FakeCompositor::new()),
        );
        let channel = Arc::new(RecordingChannel::default());

        pipeline.run(channel.clone()).await;

        let replies = channel.replies.lock().await;
        assert_eq!(replies.len(), 1);
        assert_eq!(
            replies[0],
            Reply::Error(crate::strings::messages::FETCH_FAILED.to_string())
        );
    }

    #[tokio::test]
    async fn empty_newslist_still_delivers_an_image() {
        let compositor = Arc::new(FakeCompositor::new());
        let pipeline = ReportPipeline::new(
            good_config(),
            Arc::new(FakeSource::with_feed(Vec::new())),
            compositor.clone(),
        );
        let channel = Arc::new(RecordingChannel::default());

        pipeline.run(channel.clone()).await;

        assert_eq!(compositor.calls.load(Ordering::SeqCst), 1);
        let replies = channel.replies.lock().await;
        assert_eq!(replies.len(), 1);
        assert!(matches!(replies[0], Reply::Image(_)));
    }

    #[tokio::test]
    async fn render_failure_yields_card_error_reply() {
        struct FailingCompositor;

        #[async_trait]
        impl Compositor for FailingCompositor {
            async fn compose(&self, _markup: &str) -> Result<Bytes, RenderError> {
                Err(RenderError::Timeout(60))
            }
        }

        let pipeline = ReportPipeline::new(
            good_config(),
            Arc::new(FakeSource::with_feed(vec![record(0)])),
            Arc::new(FailingCompositor),
        );
        let channel = Arc::new(RecordingChannel::default());

        pipeline.run(channel.clone()).await;

        let replies = channel.replies.lock().await;
        assert_eq!(
            *replies,
            vec![Reply::Error(
                crate::strings::messages::RENDER_FAILED.to_string()
            )]
        );
    }
}
