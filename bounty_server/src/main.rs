use std::sync::{atomic::Ordering, Arc};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bounty_server::{app, config::ServerConfig, AppState};

async fn shutdown_signal(state: Arc<AppState>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            // without a handler the server can only be stopped externally
            error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    }
    state.shutdown.store(true, Ordering::Relaxed);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    let state = Arc::new(AppState::from_config(&config)?);

    // expire abandoned commitments in the background
    let sweeper = state.clone();
    let mut ticker = tokio::time::interval(config.sweep_interval);
    tokio::spawn(async move {
        loop {
            ticker.tick().await;
            sweeper.spins.commitments().sweep_expired();
        }
    });

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!(bet_max = config.bet_max, strip_length = config.strip_length, "listening on {}", config.bind);
    axum::serve(listener, app(state.clone()))
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;
    Ok(())
}
