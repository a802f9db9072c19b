//! Page title extraction

use scraper::{Html, Selector};

/// Title used when a document has none
pub const UNTITLED: &str = "Untitled";

/// Text of the first non-empty `<title>` element, whitespace-collapsed.
///
/// Never returns an empty string.
pub fn extract_title(markup: &str) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return UNTITLED.to_string();
    };

    let doc = Html::parse_document(markup);
    doc.select(&selector)
        .map(|el| normalize_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .find(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
