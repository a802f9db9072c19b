//! Content classification

use serde::{Deserialize, Serialize};

/// Renderable kind derived from a response's declared content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    Markup,
    Image,
    StructuredText,
    PlainText,
    /// Opaque bytes: never interpreted, only reported
    Other,
}

impl ContentKind {
    /// Classify a `Content-Type` header value. First match wins.
    pub fn classify(content_type: &str) -> Self {
        let content_type = content_type.to_ascii_lowercase();

        if content_type.contains("text/html") {
            ContentKind::Markup
        } else if content_type.contains("image/") {
            ContentKind::Image
        } else if content_type.contains("application/json") {
            ContentKind::StructuredText
        } else if content_type.contains("text/") {
            ContentKind::PlainText
        } else {
            ContentKind::Other
        }
    }

    pub fn is_renderable(&self) -> bool {
        !matches!(self, ContentKind::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Markup => "markup",
            ContentKind::Image => "image",
            ContentKind::StructuredText => "structured-text",
            ContentKind::PlainText => "plain-text",
            ContentKind::Other => "other",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
