// Reminder dispatcher binary entry point

use anyhow::Context;
use common::bootstrap;
use common::config::Settings;
use common::dispatch::Scanner;
use common::telemetry;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;
    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    telemetry::init_logging(&settings.observability.log_level)?;

    info!(
        scan_interval_seconds = settings.dispatcher.scan_interval_seconds,
        chunk_size = settings.dispatcher.chunk_size,
        "Starting reminder dispatcher"
    );

    let handles = bootstrap::init_engine(&settings).await.map_err(|e| {
        error!(error = %e, "Failed to initialize dispatch engine");
        e
    })?;

    // Graceful shutdown on interrupt/terminate: stop scheduling new cycles,
    // let an in-flight cycle finish, then close the pool and exit cleanly.
    let engine_for_shutdown = handles.engine.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Received shutdown signal, initiating graceful shutdown");
        engine_for_shutdown.stop().await;
    });

    let result = handles.engine.start().await;
    handles.pool.close().await;

    if let Err(e) = result {
        error!(error = %e, "Dispatch engine error");
        return Err(e);
    }

    info!("Reminder dispatcher stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
