//! # Messages
//!
//! Constant strings for user-facing replies. Error detail stays in the log;
//! the user only ever sees one of these short messages.

/// Transport-level failure talking to the news provider.
pub const FETCH_FAILED: &str = "请求失败，请稍后再试。";

/// Provider answered, but not with the expected envelope.
pub const FETCH_BAD_FORMAT: &str = "获取资讯失败，返回数据格式不正确。";

/// The render surface failed to produce a card.
pub const RENDER_FAILED: &str = "生成卡片失败，请稍后再试...";

/// Placeholders for absent per-record fields from the provider.
pub const PLACEHOLDER_TITLE: &str = "未知标题";
pub const PLACEHOLDER_DESCRIPTION: &str = "无描述";
pub const PLACEHOLDER_TIME: &str = "未知时间";
