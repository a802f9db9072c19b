//! TabShell Content Relay
//!
//! Fetches remote pages on behalf of the shell so content never has to be
//! loaded cross-origin by the client:
//!
//! 1. Validate the target (absolute http/https only, before any I/O)
//! 2. GET it within a fixed time budget
//! 3. Classify by declared content type
//! 4. Rewrite markup so embedded references resolve outside their origin
//! 5. Extract a title
//!
//! [`RelayServer`] exposes the same pipeline over HTTP as a JSON API.

mod content;
mod error;
mod fetcher;
mod relay;
mod rewrite;
mod server;
mod title;
mod wire;

pub use content::ContentKind;
pub use error::RelayError;
pub use fetcher::{FetchedPage, Fetcher, HttpFetcher, RelayOptions, DEFAULT_USER_AGENT};
pub use relay::{parse_target, ContentRelay, RelayResponse};
pub use rewrite::{rewrite, rewrite_with_base};
pub use server::RelayServer;
pub use title::{extract_title, UNTITLED};

pub type Result<T> = std::result::Result<T, RelayError>;
