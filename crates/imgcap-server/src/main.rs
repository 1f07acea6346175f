use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use imgcap_server::{router, telemetry, AppState, Config, ModerationClient};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::parse();
    let bind = config.bind;

    let moderator =
        ModerationClient::new(&config).context("failed to build moderation client")?;
    let moderation = moderator.is_configured();

    let state = AppState::with_moderator(config, Arc::new(moderator));

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    info!(%bind, moderation, "imgcap listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
