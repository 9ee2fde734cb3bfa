//! Calbridge server binary.

use calbridge_app::{router, AppContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real deployments set the variables directly
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = calbridge_infra::config::load()?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = router(AppContext::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "calbridge listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
    }
}
