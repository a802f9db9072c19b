//! TabShell relay server
//!
//! Serves the content relay over HTTP for clients that can't fetch
//! cross-origin pages themselves.

use anyhow::Context;
use std::future::Future;
use std::sync::Arc;

use tabshell_core::{Config, ContentRelay, RelayServer};

/// Bind the relay server described by `config` and serve until `shutdown`
/// resolves
pub async fn run<S>(config: Config, shutdown: S) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send,
{
    config.validate()?;

    let relay = ContentRelay::http(config.relay_options()).context("Failed to build HTTP client")?;
    let server = RelayServer::bind(config.bind_addr, Arc::new(relay))
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %server.local_addr()?,
        timeout_secs = config.fetch_timeout_secs,
        "TabShell relay started"
    );

    server.serve_with_shutdown(shutdown).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_rejects_invalid_config() {
        let mut config = Config::default();
        config.fetch_timeout_secs = 0;

        let result = run(config, async {}).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let mut config = Config::default();
        config.bind_addr = "127.0.0.1:0".parse().unwrap();

        run(config, async {}).await.unwrap();
    }
}
