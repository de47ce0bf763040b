// Bootstrap utilities for binary initialization

use crate::config::Settings;
use crate::db::DbPool;
use crate::dispatch::{DispatchEngine, EngineConfig};
use crate::notify::{GatewayNotifier, Notifier};
use crate::store::{Directory, PgDirectory, PgReminderStore, ReminderStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Handles for coordinated graceful shutdown: stop the engine first, then
/// close the store connection.
pub struct EngineHandles {
    pub engine: Arc<DispatchEngine>,
    pub pool: DbPool,
}

/// Wire settings into a ready-to-start dispatch engine.
#[tracing::instrument(skip(settings))]
pub async fn init_engine(settings: &Settings) -> Result<EngineHandles> {
    info!("Initializing database connection pool");
    let pool = DbPool::new(&settings.database)
        .await
        .context("Failed to initialize database pool")?;
    pool.health_check()
        .await
        .context("Database health check failed")?;

    let store = Arc::new(PgReminderStore::new(pool.clone())) as Arc<dyn ReminderStore>;
    let directory = Arc::new(PgDirectory::new(pool.clone())) as Arc<dyn Directory>;

    let notifier = Arc::new(
        GatewayNotifier::new(&settings.notifier).context("Failed to initialize notifier")?,
    ) as Arc<dyn Notifier>;
    info!(endpoint = %settings.notifier.endpoint, "Notification gateway client initialized");

    let engine_config = EngineConfig {
        scan_interval_seconds: settings.dispatcher.scan_interval_seconds,
        chunk_size: settings.dispatcher.chunk_size,
    };

    let engine = Arc::new(DispatchEngine::new(engine_config, store, directory, notifier));
    info!("Dispatch engine initialized");

    Ok(EngineHandles { engine, pool })
}
