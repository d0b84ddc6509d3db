//! # News Provider Client
//!
//! Fetches the AI news feed from TianAPI and validates the response
//! envelope against an explicit schema. Only per-record leaf fields fall
//! back to placeholders; a broken envelope is a typed `FetchError`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::traits::NewsSource;
use crate::domain::types::{FetchError, NewsRecord};
use crate::strings::messages;

const ENDPOINT: &str = "https://apis.tianapi.com/ai/index";

/// HTTP client reused across requests
fn http_client() -> &'static Client {
    use std::sync::OnceLock;
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client")
    })
}

/// Provider response envelope: `{code, msg, result: {newslist: [...]}}`.
/// Success is `code == 200` with a present newslist.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    code: i64,
    #[serde(default)]
    msg: String,
    result: Option<ApiResult>,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    newslist: Option<Vec<RawNewsItem>>,
}

#[derive(Debug, Deserialize)]
struct RawNewsItem {
    title: Option<String>,
    description: Option<String>,
    ctime: Option<String>,
    #[serde(rename = "picUrl")]
    pic_url: Option<String>,
}

fn normalize(raw: RawNewsItem) -> NewsRecord {
    NewsRecord {
        title: raw
            .title
            .unwrap_or_else(|| messages::PLACEHOLDER_TITLE.to_string()),
        description: raw
            .description
            .unwrap_or_else(|| messages::PLACEHOLDER_DESCRIPTION.to_string()),
        published_at: raw
            .ctime
            .unwrap_or_else(|| messages::PLACEHOLDER_TIME.to_string()),
        image_url: raw.pic_url.filter(|url| !url.trim().is_empty()),
    }
}

fn parse_feed(body: &str) -> Result<Vec<NewsRecord>, FetchError> {
    let envelope: ApiEnvelope =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if envelope.code != 200 {
        return Err(FetchError::Provider(envelope.code, envelope.msg));
    }

    let newslist = envelope
        .result
        .and_then(|r| r.newslist)
        .ok_or_else(|| FetchError::Malformed("missing result.newslist".to_string()))?;

    Ok(newslist.into_iter().map(normalize).collect())
}

pub struct NewsClient {
    endpoint: String,
}

impl NewsClient {
    pub fn new() -> Self {
        Self {
            endpoint: ENDPOINT.to_string(),
        }
    }
}

impl Default for NewsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsSource for NewsClient {
    async fn fetch_news(&self, api_key: &str, count: u32) -> Result<Vec<NewsRecord>, FetchError> {
        tracing::info!("请求API: {}?num={}", self.endpoint, count);

        let response = http_client()
            .get(&self.endpoint)
            .query(&[("key", api_key), ("num", &count.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        tracing::debug!("API返回数据: {}", body);
        parse_feed(&body)
    }
}
