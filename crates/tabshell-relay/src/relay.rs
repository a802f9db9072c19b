//! Relay pipeline: validate, fetch, classify, rewrite, title

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::content::ContentKind;
use crate::error::RelayError;
use crate::fetcher::{FetchedPage, Fetcher, HttpFetcher, RelayOptions};
use crate::rewrite::rewrite_with_base;
use crate::title::{extract_title, UNTITLED};
use crate::Result;

/// Classified, possibly rewritten, remote content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    pub content: String,
    pub content_type: String,
    /// URL after redirects
    pub url: String,
    pub status: u16,
    pub title: String,
    /// Derived from `content_type`; not part of the wire payload
    #[serde(skip, default = "unclassified")]
    pub kind: ContentKind,
}

fn unclassified() -> ContentKind {
    ContentKind::Other
}

impl RelayResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Validate a relay target: absolute, http or https.
///
/// Runs before any network access so other schemes can't be used to
/// probe local resources.
pub fn parse_target(target: &str) -> Result<Url> {
    let target = target.trim();
    let url = Url::parse(target).map_err(|e| RelayError::InvalidUrl(format!("{target}: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(RelayError::InvalidUrl(format!(
            "unsupported scheme `{scheme}`"
        ))),
    }
}

pub struct ContentRelay<F: Fetcher = HttpFetcher> {
    fetcher: F,
    timeout: Duration,
}

impl ContentRelay<HttpFetcher> {
    /// Relay backed by a real HTTP client
    pub fn http(options: RelayOptions) -> Result<Self> {
        let timeout = options.timeout;
        Ok(Self::new(HttpFetcher::new(options)?, timeout))
    }
}

impl<F: Fetcher> ContentRelay<F> {
    pub fn new(fetcher: F, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch `target` and prepare it for display.
    ///
    /// Non-2xx statuses are returned like any other response.
    pub async fn fetch(&self, target: &str) -> Result<RelayResponse> {
        let url = parse_target(target)?;

        // Dropping the future on timeout aborts the request
        let page = tokio::time::timeout(self.timeout, self.fetcher.fetch(&url))
            .await
            .map_err(|_| RelayError::Timeout(self.timeout))??;

        let response = self.prepare(&url, page);

        tracing::info!(
            url = %url,
            status = response.status,
            kind = %response.kind,
            "Relayed content"
        );

        Ok(response)
    }

    fn prepare(&self, requested: &Url, page: FetchedPage) -> RelayResponse {
        let kind = ContentKind::classify(&page.content_type);

        let (content, title) = if kind == ContentKind::Markup {
            let base = rewrite_base(requested, &page.final_url);
            let content = rewrite_with_base(&page.body, &base);
            let title = extract_title(&content);
            (content, title)
        } else {
            (page.body, UNTITLED.to_string())
        };

        RelayResponse {
            content,
            content_type: page.content_type,
            url: page.final_url,
            status: page.status,
            title,
            kind,
        }
    }
}

/// Base for resolving references: the requested URL, unless redirects
/// moved the page to another origin.
fn rewrite_base(requested: &Url, final_url: &str) -> Url {
    match Url::parse(final_url) {
        Ok(fetched) if fetched.origin() != requested.origin() => fetched,
        _ => requested.clone(),
    }
}
