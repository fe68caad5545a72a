mod error;
mod handlers;
mod response;
mod routes;
mod state;

use anyhow::Context;
use restal_adapter_pg::{AccessGate, PgExecutor};
use restal_core::RestalConfig;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config_path =
        std::env::var("RESTAL_CONFIG").unwrap_or_else(|_| "restal.yaml".to_string());
    let config = RestalConfig::load(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    let gate = AccessGate::new(config.access.clone());
    let executor = PgExecutor::connect(&config.upstream, gate)
        .await
        .context("connecting to upstream Postgres")?;
    let state = AppState::new(executor);

    let app = routes::create_router(state);
    let addr = config.http.bind_addr();
    tracing::info!("restal listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
