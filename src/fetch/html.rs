// src/fetch/html.rs
// =============================================================================
// This module pulls raw anchor targets out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Unlike a link checker we do NOT resolve anything here. The crawler has its
// own resolver and scope rules, so this returns the href values exactly as
// written, in document order.
// =============================================================================

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("a[href] is a valid selector"));

// Extracts every <a href> value from an HTML document
//
// Example:
//   html = "<a href='/docs'>Docs</a><a href='https://x.com'>X</a>"
//   result = ["/docs", "https://x.com"]
//
// The result is a plain Vec: finite, and can be walked as often as needed.
pub fn extract_anchor_targets(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHORS)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
