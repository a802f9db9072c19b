//! HTTP front end for [`ContentRelay`]
//!
//! `GET ?url=<target>` on any path. Responses are JSON with permissive
//! CORS headers; one request per connection.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use crate::error::RelayError;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::relay::ContentRelay;
use crate::wire::{read_head, HeadRead, HttpReply, RequestHead};

const MISSING_URL: &str = "Missing url parameter";
const INVALID_URL: &str = "Invalid URL";
const FETCH_FAILED: &str = "Failed to fetch the URL";
const MALFORMED: &str = "Malformed request";

pub struct RelayServer<F: Fetcher = HttpFetcher> {
    listener: TcpListener,
    relay: Arc<ContentRelay<F>>,
}

impl<F: Fetcher> RelayServer<F> {
    pub async fn bind<A: ToSocketAddrs>(addr: A, relay: Arc<ContentRelay<F>>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(addr = %listener.local_addr()?, "Relay server bound");

        Ok(Self { listener, relay })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the process exits
    pub async fn serve(self) -> io::Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Connections already accepted run to completion on their own tasks.
    pub async fn serve_with_shutdown<S>(self, shutdown: S) -> io::Result<()>
    where
        S: Future<Output = ()> + Send,
    {
        tracing::info!(addr = %self.listener.local_addr()?, "Relay server listening");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Relay server shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            // Per-connection failures (e.g. EMFILE) must not stop the loop
                            tracing::warn!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    };

                    let relay = Arc::clone(&self.relay);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(relay, stream).await {
                            tracing::debug!(peer = %peer, error = %e, "Connection error");
                        }
                    });
                }
            }
        }
    }
}

async fn handle_connection<F: Fetcher>(
    relay: Arc<ContentRelay<F>>,
    mut stream: TcpStream,
) -> io::Result<()> {
    let reply = match read_head(&mut stream).await? {
        HeadRead::Closed => return Ok(()),
        HeadRead::TooLarge => HttpReply::error(400, MALFORMED, None),
        HeadRead::Complete(bytes) => match RequestHead::parse(&bytes) {
            Some(head) => respond(&relay, &head).await,
            None => HttpReply::error(400, MALFORMED, None),
        },
    };

    stream.write_all(&reply.to_bytes()).await?;
    stream.shutdown().await
}

async fn respond<F: Fetcher>(relay: &ContentRelay<F>, head: &RequestHead) -> HttpReply {
    if head.is_preflight() {
        return HttpReply::empty(200);
    }

    let target = match head.query_param("url") {
        Some(target) if !target.trim().is_empty() => target,
        _ => return HttpReply::error(400, MISSING_URL, None),
    };

    match relay.fetch(&target).await {
        Ok(response) => HttpReply::json(200, &response),
        Err(RelayError::InvalidUrl(reason)) => {
            tracing::debug!(url = %target, reason = %reason, "Rejected relay target");
            HttpReply::error(400, INVALID_URL, None)
        }
        Err(e) => {
            tracing::warn!(url = %target, kind = e.kind(), error = %e, "Relay fetch failed");
            HttpReply::error(500, &e.to_string(), Some(FETCH_FAILED))
        }
    }
}
