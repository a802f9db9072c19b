//! Minimal HTTP/1.1 framing for the relay server
//!
//! Only the request head is read; bodies are ignored. Every reply closes
//! the connection.

use serde::Serialize;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use url::Url;

/// Largest request head accepted
pub(crate) const MAX_HEAD_BYTES: usize = 16 * 1024;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"),
    (
        "Access-Control-Allow-Headers",
        "Content-Type, Authorization, X-Client-Info, Apikey",
    ),
];

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum HeadRead {
    Complete(Vec<u8>),
    TooLarge,
    /// Peer closed before sending a full head
    Closed,
}

/// Read up to and including the blank line ending the request head
pub(crate) async fn read_head<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<HeadRead> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(HeadRead::Closed);
        }

        // Terminator may straddle two reads
        let search_from = buf.len().saturating_sub(HEAD_TERMINATOR.len() - 1);
        buf.extend_from_slice(&chunk[..n]);

        if let Some(pos) = find(&buf[search_from..], HEAD_TERMINATOR) {
            let end = search_from + pos + HEAD_TERMINATOR.len();
            if end > MAX_HEAD_BYTES {
                return Ok(HeadRead::TooLarge);
            }
            buf.truncate(end);
            return Ok(HeadRead::Complete(buf));
        }

        if buf.len() > MAX_HEAD_BYTES {
            return Ok(HeadRead::TooLarge);
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Request line of an incoming request
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestHead {
    pub method: String,
    pub target: String,
}

impl RequestHead {
    pub fn parse(head: &[u8]) -> Option<Self> {
        let head = std::str::from_utf8(head).ok()?;
        let request_line = head.lines().next()?;

        let mut parts = request_line.split_whitespace();
        let method = parts.next()?;
        let target = parts.next()?;
        let version = parts.next()?;

        if parts.next().is_some()
            || !version.starts_with("HTTP/1.")
            || !method.bytes().all(|b| b.is_ascii_uppercase())
        {
            return None;
        }

        Some(Self {
            method: method.to_string(),
            target: target.to_string(),
        })
    }

    pub fn is_preflight(&self) -> bool {
        self.method == "OPTIONS"
    }

    /// Percent-decoded query parameter; the path is irrelevant
    pub fn query_param(&self, name: &str) -> Option<String> {
        let base = Url::parse("http://relay.invalid/").ok()?;
        let url = base.join(&self.target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

/// Outgoing response
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HttpReply {
    pub status: u16,
    /// JSON body, if any
    pub body: Option<String>,
}

impl HttpReply {
    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status,
                body: Some(body),
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize reply");
                Self::error(500, "Internal error", None)
            }
        }
    }

    pub fn error(status: u16, error: &str, message: Option<&str>) -> Self {
        let body = ErrorBody { error, message };
        // ErrorBody only holds strings
        let body = serde_json::to_string(&body).unwrap_or_else(|_| String::from("{}"));
        Self {
            status,
            body: Some(body),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason(self.status));
        for (name, value) in CORS_HEADERS {
            head.push_str(&format!("{name}: {value}\r\n"));
        }

        let body = self.body.as_deref().unwrap_or_default();
        if self.body.is_some() {
            head.push_str("Content-Type: application/json\r\n");
        }
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
        head.push_str("Connection: close\r\n\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(body.as_bytes());
        bytes
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
