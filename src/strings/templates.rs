//! # Templates
//!
//! Exposes the card layout assets from the `templates/` directory. The
//! shell (header + footer) is fixed; only the per-record unit fragment
//! carries substitution slots.

pub const CARD_HEADER: &str = include_str!("../../templates/card_header.html");
pub const CARD_FOOTER: &str = include_str!("../../templates/card_footer.html");
pub const NEWS_UNIT: &str = include_str!("../../templates/news_unit.html");
