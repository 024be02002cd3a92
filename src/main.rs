use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use weather_api::{app, config, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up TABLE_NAME, WEATHER_DATA_DIR, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting weather API in {:?} mode", config.environment);

    let auth = &config.auth;
    match auth.pool_summary() {
        Some(pool) => tracing::info!("Accepting claims for {}", pool),
        None => tracing::warn!("USER_POOL_ID is not set; claims are accepted from any issuer the gateway trusts"),
    }
    if auth.forward_secret.is_none() {
        tracing::warn!("AUTH_FORWARD_SECRET is not set; protected routes will reject every request");
    }

    let router = app::build_router(config).await?;
    let state = Arc::new(server::HostState {
        router,
        claims_header: auth.claims_header.clone(),
        forward_secret: auth.forward_secret.clone(),
    });
    let http = server::app(state, config.server.enable_request_logging);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Weather API listening on http://{}", bind_addr);

    axum::serve(listener, http).await?;
    Ok(())
}
