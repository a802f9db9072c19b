//! Relay error types

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Rejected before any network access
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Transport failure: DNS, connection refused, TLS, oversized body...
    #[error("{0}")]
    FetchFailed(String),
}

impl RelayError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::InvalidUrl(_) => "invalid_url",
            RelayError::Timeout(_) => "timeout",
            RelayError::FetchFailed(_) => "fetch_failed",
        }
    }
}
