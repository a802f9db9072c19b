//! Outbound fetching

use futures_util::StreamExt;
use reqwest::redirect::Policy;
use std::error::Error as _;
use std::future::Future;
use std::time::Duration;
use url::Url;

use crate::error::RelayError;
use crate::Result;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Outbound request limits
#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Budget for the whole request, body included
    pub timeout: Duration,
    pub max_body_bytes: usize,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            max_body_bytes: 10 * 1024 * 1024,
            max_redirects: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// A fully read response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    /// URL after redirects
    pub final_url: String,
    /// `Content-Type` header, empty when absent
    pub content_type: String,
    pub body: String,
}

/// Performs the network side of a relay request.
///
/// [`ContentRelay`](crate::ContentRelay) enforces the time budget around
/// this call, so implementations only report transport failures.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchedPage>> + Send;
}

/// reqwest-backed fetcher
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    options: RelayOptions,
}

impl HttpFetcher {
    pub fn new(options: RelayOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::limited(options.max_redirects))
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|e| RelayError::FetchFailed(error_chain(&e)))?;

        Ok(Self { client, options })
    }

    pub fn options(&self) -> &RelayOptions {
        &self.options
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if let Some(length) = response.content_length() {
            if length > self.options.max_body_bytes as u64 {
                return Err(self.oversized());
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.map_error(e))?;
            if body.len() + chunk.len() > self.options.max_body_bytes {
                return Err(self.oversized());
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(
            url = %url,
            status,
            bytes = body.len(),
            content_type = %content_type,
            "Fetched remote content"
        );

        Ok(FetchedPage {
            status,
            final_url,
            content_type,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

impl HttpFetcher {
    fn map_error(&self, e: reqwest::Error) -> RelayError {
        if e.is_timeout() {
            RelayError::Timeout(self.options.timeout)
        } else {
            RelayError::FetchFailed(error_chain(&e))
        }
    }

    fn oversized(&self) -> RelayError {
        RelayError::FetchFailed(format!(
            "Response body exceeds {} bytes",
            self.options.max_body_bytes
        ))
    }
}

/// reqwest's top-level message hides the cause (DNS, TLS, refused...)
fn error_chain(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
