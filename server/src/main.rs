#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tabshell_core::init_logging();

    let config = tabshell_core::Config::from_env()?;

    tabshell_lib::run(config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    })
    .await
}
