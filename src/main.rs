//! EduTrack analytics server - binary entry point

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use edutrack::api::http::create_router;
use edutrack::api::websocket::{AppState, Broadcaster, RandomTelemetry};
use edutrack::{Args, Dataset, ServerConfig, WeightedRiskScorer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = ServerConfig::from(&args);
    config.validate()?;

    info!(
        listen = %config.listen_addr,
        period_ms = config.broadcast.period.as_millis() as u64,
        send_timeout_ms = config.broadcast.send_timeout.as_millis() as u64,
        "Starting EduTrack server"
    );

    let (broadcaster, ticker) = Broadcaster::spawn(config.broadcast, Arc::new(RandomTelemetry));

    // The loop is never restarted; a fault leaves the query service up and
    // live-update registrations answering 503.
    let supervisor = tokio::spawn(async move {
        match ticker.await {
            Ok(Ok(())) => info!("live update loop exited"),
            Ok(Err(err)) => error!(error = %err, "live update loop stopped on fault"),
            Err(join_err) => error!(error = %join_err, "live update loop panicked"),
        }
    });

    let state = Arc::new(AppState::new(
        Arc::new(Dataset::demo()),
        Arc::new(WeightedRiskScorer::default()),
        Arc::clone(&broadcaster),
    ));
    let app = create_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Listening on {}", config.listen_addr);

    let shutdown_broadcaster = Arc::clone(&broadcaster);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Shutdown requested");
            // Closes every live-update stream so graceful shutdown can finish
            shutdown_broadcaster.shutdown();
        })
        .await?;

    // Upgraded connections are not covered by graceful shutdown; wait for
    // them to send their Close frames before the runtime drops them.
    broadcaster.shutdown();
    if state.drain_connections().await {
        info!("live update connections drained");
    }

    if let Err(join_err) = supervisor.await {
        error!(error = %join_err, "live update supervisor panicked");
    }
    info!("Server stopped");

    Ok(())
}
