use anyhow::Context;

use nexus_api::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nexus_observability::init();

    let config = ServerConfig::from_env()?;
    let app = nexus_api::app::build_app(&config.storage).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
