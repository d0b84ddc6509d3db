//! # Browser Compositor
//!
//! Lays the card markup out in a disposable headless Chromium instance and
//! captures a PNG snapshot of the fixed 600x1380 canvas. One browser per
//! call, torn down on every exit path.

use async_trait::async_trait;
use bytes::Bytes;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use futures::StreamExt;
use std::time::Duration;

use crate::domain::traits::Compositor;
use crate::domain::types::RenderError;

/// Logical canvas size; output dimensions are fixed regardless of how many
/// news units the markup carries.
pub const CANVAS_WIDTH: u32 = 600;
pub const CANVAS_HEIGHT: u32 = 1380;

/// Ceiling for remote resources (per-record images, web font) to settle.
const LOAD_TIMEOUT_SECS: u64 = 60;

pub struct BrowserCompositor;

impl BrowserCompositor {
    pub fn new() -> Self {
        Self
    }

    async fn snapshot(browser: &Browser, markup: &str) -> Result<Vec<u8>, RenderError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Surface(e.to_string()))?;

        page.set_content(markup)
            .await
            .map_err(|e| RenderError::Surface(e.to_string()))?;
        // Let remote images and the web font finish loading.
        page.wait_for_navigation()
            .await
            .map_err(|e| RenderError::Surface(e.to_string()))?;

        page.screenshot(
            ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .full_page(false)
                .build(),
        )
        .await
        .map_err(|e| RenderError::Surface(e.to_string()))
    }
}

impl Default for BrowserCompositor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Compositor for BrowserCompositor {
    async fn compose(&self, markup: &str) -> Result<Bytes, RenderError> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .window_size(CANVAS_WIDTH, CANVAS_HEIGHT)
            .viewport(Viewport {
                width: CANVAS_WIDTH,
                height: CANVAS_HEIGHT,
                ..Viewport::default()
            })
            .build()
            .map_err(RenderError::Launch)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        // The CDP connection is driven by this task for the browser's lifetime.
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let shot = tokio::time::timeout(
            Duration::from_secs(LOAD_TIMEOUT_SECS),
            Self::snapshot(&browser, markup),
        )
        .await;

        // Teardown runs on success, surface error, and timeout alike.
        if let Err(e) = browser.close().await {
            tracing::warn!("关闭浏览器失败: {e}");
        }
        let _ = browser.wait().await;
        events.abort();

        match shot {
            Ok(Ok(png)) => {
                tracing::debug!("图片生成成功 ({} bytes)", png.len());
                Ok(Bytes::from(png))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(RenderError::Timeout(LOAD_TIMEOUT_SECS)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::card;

    fn png_dimensions(png: &[u8]) -> (u32, u32) {
        // IHDR is the first chunk: width and height at byte offsets 16 and 20.
        let width = u32::from_be_bytes(png[16..20].try_into().unwrap());
        let height = u32::from_be_bytes(png[20..24].try_into().unwrap());
        (width, height)
    }

    /// Needs a Chromium binary on the host.
    #[tokio::test]
    #[ignore]
    async fn empty_card_composes_at_fixed_canvas_size() {
        let markup = card::render_markup(&[]);
        let compositor = BrowserCompositor::new();
        let png = compositor.compose(&markup).await.unwrap();
        assert_eq!(png_dimensions(&png), (CANVAS_WIDTH, CANVAS_HEIGHT));
    }
}
