//! # Card Renderer
//!
//! Turns a news feed into the markup document for the fixed 600x1380 card:
//! the constant shell from `templates/` around one unit fragment per
//! record. Pure: identical input yields byte-identical markup.

use crate::domain::types::NewsRecord;
use crate::strings::templates::{CARD_FOOTER, CARD_HEADER, NEWS_UNIT};

/// Descriptions longer than this are cut (chars, not bytes).
const MAX_DESCRIPTION_CHARS: usize = 100;

/// Render the full markup document for a feed.
///
/// Records without an image reference are dropped entirely rather than
/// rendered with a placeholder; a partial record would break the fixed
/// unit layout. Input order is preserved for the rest.
pub fn render_markup(feed: &[NewsRecord]) -> String {
    let mut doc = String::from(CARD_HEADER);

    for record in feed {
        let Some(image_url) = &record.image_url else {
            tracing::warn!("无效的图片 URL, 跳过: {}", record.title);
            continue;
        };

        let unit = NEWS_UNIT
            .replace("{pic_url}", image_url)
            .replace("{title}", &record.title)
            .replace("{description}", &truncate_description(&record.description))
            .replace("{ctime}", &record.published_at);
        doc.push_str(&unit);
    }

    doc.push_str(CARD_FOOTER);
    doc
}

fn truncate_description(text: &str) -> String {
    if text.chars().count() <= MAX_DESCRIPTION_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_DESCRIPTION_CHARS).collect();
    cut.push_str("...");
    cut
}
