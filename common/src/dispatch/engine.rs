// Scan engine: recurring driver for fetch-due -> dispatch -> summarize cycles

use crate::clock::{Clock, SystemClock};
use crate::dispatch::BatchDispatcher;
use crate::errors::StoreError;
use crate::models::CycleSummary;
use crate::notify::Notifier;
use crate::store::{Directory, ReminderStore};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument};

/// Configuration for the scan engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How often to scan for due reminders (in seconds)
    pub scan_interval_seconds: u64,
    /// Maximum concurrent notification attempts per batch
    pub chunk_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scan_interval_seconds: 120,
            chunk_size: 50,
        }
    }
}

/// Scanner trait for reminder scan operations
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Run the recurring scan loop until stopped
    async fn start(&self) -> anyhow::Result<()>;

    /// Signal the loop to stop scheduling further cycles. An in-flight cycle
    /// always runs to completion; `start` returns once it has.
    async fn stop(&self);

    /// One full pass: fetch the due set and dispatch it in chunks
    async fn run_cycle(&self) -> Result<CycleSummary, StoreError>;
}

/// Recurring scan engine with at most one cycle in flight at any time.
pub struct DispatchEngine {
    config: EngineConfig,
    store: Arc<dyn ReminderStore>,
    dispatcher: BatchDispatcher,
    clock: Arc<dyn Clock>,
    shutdown_tx: tokio::sync::broadcast::Sender<()>,
}

impl DispatchEngine {
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn ReminderStore>,
        directory: Arc<dyn Directory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_clock(config, store, directory, notifier, Arc::new(SystemClock))
    }

    /// Create an engine with an injected clock. Tests drive due-time
    /// evaluation through this instead of the system time.
    pub fn with_clock(
        config: EngineConfig,
        store: Arc<dyn ReminderStore>,
        directory: Arc<dyn Directory>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (shutdown_tx, _shutdown_rx) = tokio::sync::broadcast::channel(1);
        let dispatcher = BatchDispatcher::new(
            config.chunk_size,
            Arc::clone(&store),
            directory,
            notifier,
            Arc::clone(&clock),
        );

        Self {
            config,
            store,
            dispatcher,
            clock,
            shutdown_tx,
        }
    }

    /// Get a shutdown signal receiver
    pub fn shutdown_receiver(&self) -> tokio::sync::broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }
}

#[async_trait]
impl Scanner for DispatchEngine {
    /// Start the scan loop: one cycle immediately, then one per interval.
    #[instrument(skip(self))]
    async fn start(&self) -> anyhow::Result<()> {
        info!(
            scan_interval_seconds = self.config.scan_interval_seconds,
            chunk_size = self.config.chunk_size,
            "Starting reminder scan engine"
        );

        let mut scan_interval = interval(Duration::from_secs(self.config.scan_interval_seconds));
        // A tick that fires while a cycle is still running is coalesced into
        // the next interval instead of queueing a burst of catch-up cycles.
        scan_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut shutdown_rx = self.shutdown_receiver();

        loop {
            tokio::select! {
                // Check shutdown first so stop() never starts another cycle.
                biased;
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping scan engine");
                    break;
                }
                _ = scan_interval.tick() => {
                    match self.run_cycle().await {
                        Ok(summary) if summary.total > 0 => {
                            info!(
                                total = summary.total,
                                processed = summary.processed,
                                failed = summary.failed,
                                "Reminder scan completed"
                            );
                        }
                        Ok(_) => {
                            debug!("No reminders due");
                        }
                        Err(e) => {
                            // The cycle failed to run; the next trigger still fires.
                            error!(error = %e, "Reminder scan failed");
                        }
                    }
                }
            }
        }

        info!("Reminder scan engine stopped");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop(&self) {
        let _ = self.shutdown_tx.send(());
    }

    #[instrument(skip(self))]
    async fn run_cycle(&self) -> Result<CycleSummary, StoreError> {
        let now = self.clock.now();
        let due = self.store.fetch_due(now).await?;
        if due.is_empty() {
            return Ok(CycleSummary::default());
        }

        debug!(count = due.len(), "Fetched due reminders");
        Ok(self.dispatcher.dispatch(&due).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NotifyError;
    use crate::message::ReminderMessage;
    use crate::models::{Recipient, Reminder, ReminderChannel, ReminderStatus, TaskInfo};
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    use crate::store::{MockDirectory, MockReminderStore};

    struct NoopNotifier;

    #[async_trait]
    impl Notifier for NoopNotifier {
        async fn send(
            &self,
            _reminder: &Reminder,
            _recipient: &Recipient,
            _message: &ReminderMessage,
        ) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    fn engine_with_store(store: MockReminderStore) -> DispatchEngine {
        let mut directory = MockDirectory::new();
        directory.expect_get_task().returning(|_| {
            Ok(Some(TaskInfo {
                title: "Task".to_string(),
                description: None,
                due_date: None,
            }))
        });
        directory.expect_get_recipient().returning(|_| {
            Ok(Some(Recipient {
                contact_address: "an@example.com".to_string(),
                display_name: "An".to_string(),
            }))
        });

        DispatchEngine::new(
            EngineConfig::default(),
            Arc::new(store),
            Arc::new(directory),
            Arc::new(NoopNotifier),
        )
    }

    fn due_reminder() -> Reminder {
        let base = Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap();
        Reminder {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            scheduled_at: base,
            status: ReminderStatus::Scheduled,
            channel: ReminderChannel::Email,
            timezone: "UTC".to_string(),
            processed_at: None,
            created_at: base,
            updated_at: base,
        }
    }

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.scan_interval_seconds, 120);
        assert_eq!(config.chunk_size, 50);
    }

    #[tokio::test]
    async fn test_empty_due_set_returns_zero_summary() {
        let mut store = MockReminderStore::new();
        store.expect_fetch_due().returning(|_| Ok(Vec::new()));
        store.expect_mark_sent().never();

        let engine = engine_with_store(store);
        let summary = engine.run_cycle().await.unwrap();

        assert_eq!(summary, CycleSummary::default());
    }

    #[tokio::test]
    async fn test_store_failure_propagates_out_of_the_cycle() {
        let mut store = MockReminderStore::new();
        store
            .expect_fetch_due()
            .returning(|_| Err(StoreError::Unavailable("connection refused".into())));

        let engine = engine_with_store(store);
        assert!(matches!(
            engine.run_cycle().await,
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_back_to_back_cycles_do_not_resend() {
        // First fetch returns one due reminder, later fetches return nothing:
        // the reminder was marked sent and is no longer eligible.
        let fetches = AtomicUsize::new(0);
        let mut store = MockReminderStore::new();
        store.expect_fetch_due().times(2).returning(move |_| {
            if fetches.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![due_reminder()])
            } else {
                Ok(Vec::new())
            }
        });
        store.expect_mark_sent().times(1).returning(|id, processed_at| {
            let mut reminder = due_reminder();
            reminder.id = id;
            reminder.status = ReminderStatus::Sent;
            reminder.processed_at = Some(processed_at);
            Ok(reminder)
        });

        let engine = engine_with_store(store);

        let first = engine.run_cycle().await.unwrap();
        assert_eq!((first.total, first.processed), (1, 1));

        let second = engine.run_cycle().await.unwrap();
        assert_eq!(second.total, 0);
    }
}
