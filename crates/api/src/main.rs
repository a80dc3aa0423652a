use std::sync::Arc;

use anyhow::Context;

use eshop_infra::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    eshop_observability::init();

    let config = Config::from_env();
    let services = Arc::new(eshop_api::app::services::build_services(&config).await?);
    let worker = services.updates.spawn_worker(services.store.clone())?;

    let app = eshop_api::app::build_app(services.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    // No new jobs after the server stops; everything already accepted still runs.
    services.updates.close();
    let stats = worker.shutdown().await;
    tracing::info!(?stats, "update queue drained, exiting");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
