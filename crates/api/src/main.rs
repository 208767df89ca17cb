use std::sync::Arc;

use anyhow::Context;

use stockpulse_api::app::{build_app, build_services};
use stockpulse_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockpulse_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = Arc::new(build_services(&config).await?);
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
