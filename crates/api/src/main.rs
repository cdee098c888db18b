use std::sync::Arc;

use anyhow::Context;
use todoboard_api::app::{self, services};
use todoboard_infra::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    todoboard_observability::init();

    let config = Config::from_env().context("invalid configuration")?;
    let services = services::build_services(&config)
        .await
        .context("failed to build services")?;
    tracing::info!(backend = services.backend(), "storage ready");

    let app = app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
