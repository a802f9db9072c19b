//! What a tab's content area shows

use serde::Serialize;

use tabshell_relay::{ContentKind, RelayError, RelayResponse};

/// Tab title after a failed load
pub const FAILED_TITLE: &str = "Failed to load";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum PageView {
    NewTab,
    Loading {
        url: String,
    },
    #[serde(rename_all = "camelCase")]
    Document {
        kind: ContentKind,
        content_type: String,
        content: String,
        /// URL after redirects
        url: String,
        status: u16,
    },
    /// Fetched, but of a kind the shell can't display
    #[serde(rename_all = "camelCase")]
    Unsupported {
        content_type: String,
    },
    Failed {
        message: String,
    },
}

impl PageView {
    pub fn from_response(response: RelayResponse) -> Self {
        if response.kind.is_renderable() {
            PageView::Document {
                kind: response.kind,
                content_type: response.content_type,
                content: response.content,
                url: response.url,
                status: response.status,
            }
        } else {
            PageView::Unsupported {
                content_type: response.content_type,
            }
        }
    }

    pub fn from_error(error: &RelayError) -> Self {
        PageView::Failed {
            message: error.to_string(),
        }
    }

    /// Inline message shown instead of content
    pub fn message(&self) -> Option<String> {
        match self {
            PageView::Unsupported { content_type } => {
                Some(format!("Cannot display content of type {content_type}"))
            }
            PageView::Failed { message } => Some(message.clone()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PageView::Loading { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn response(content_type: &str) -> RelayResponse {
        RelayResponse {
            content: "body".to_string(),
            content_type: content_type.to_string(),
            url: "https://ex.com/".to_string(),
            status: 200,
            title: "Untitled".to_string(),
            kind: ContentKind::classify(content_type),
        }
    }

    #[test]
    fn test_renderable_kinds_become_documents() {
        for content_type in ["text/html", "image/png", "application/json", "text/plain"] {
            let view = PageView::from_response(response(content_type));
            assert!(matches!(view, PageView::Document { .. }), "{content_type}");
            assert_eq!(view.message(), None);
        }
    }

    #[test]
    fn test_unsupported_message() {
        let view = PageView::from_response(response("application/octet-stream"));
        assert_eq!(
            view.message().as_deref(),
            Some("Cannot display content of type application/octet-stream")
        );
    }

    #[test]
    fn test_failure_carries_cause() {
        let view = PageView::from_error(&RelayError::Timeout(Duration::from_secs(15)));
        assert_eq!(view.message().as_deref(), Some("Request timed out after 15s"));
    }
}
