// Batch dispatcher: chunked fan-out with isolated per-reminder failure

use crate::clock::Clock;
use crate::errors::DispatchError;
use crate::message;
use crate::models::{CycleSummary, Recipient, Reminder, TaskInfo};
use crate::notify::Notifier;
use crate::store::{Directory, ReminderStore};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Drives delivery of a due set, `chunk_size` reminders at a time. Chunks run
/// sequentially; reminders within a chunk fan out concurrently and the
/// dispatcher waits for the whole chunk before starting the next one, so
/// in-flight notification attempts never exceed `chunk_size`.
pub struct BatchDispatcher {
    chunk_size: usize,
    store: Arc<dyn ReminderStore>,
    directory: Arc<dyn Directory>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl BatchDispatcher {
    pub fn new(
        chunk_size: usize,
        store: Arc<dyn ReminderStore>,
        directory: Arc<dyn Directory>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            store,
            directory,
            notifier,
            clock,
        }
    }

    /// Process an already-fetched due set and aggregate per-chunk outcomes
    /// into cycle totals.
    #[instrument(skip_all, fields(total = due.len()))]
    pub async fn dispatch(&self, due: &[Reminder]) -> CycleSummary {
        let mut summary = CycleSummary {
            total: due.len(),
            ..Default::default()
        };

        for chunk in due.chunks(self.chunk_size) {
            let results = join_all(chunk.iter().map(|r| self.process_reminder(r))).await;

            for (reminder, result) in chunk.iter().zip(results) {
                match result {
                    Ok(()) => summary.processed += 1,
                    Err(e) if e.is_duplicate_risk() => {
                        summary.failed += 1;
                        warn!(
                            reminder_id = %reminder.id,
                            error = %e,
                            "Notification delivered but reminder still scheduled; duplicate possible next cycle"
                        );
                    }
                    Err(e @ (DispatchError::TaskMissing(_)
                    | DispatchError::RecipientUnresolvable(_))) => {
                        summary.failed += 1;
                        warn!(
                            reminder_id = %reminder.id,
                            error = %e,
                            "Skipped reminder, left scheduled for retry"
                        );
                    }
                    Err(e) => {
                        summary.failed += 1;
                        error!(reminder_id = %reminder.id, error = %e, "Failed to process reminder");
                    }
                }
            }
        }

        summary
    }

    /// Deliver one reminder and mark it sent. Failures stay local to this
    /// reminder; a skipped reminder remains `scheduled` and is retried on a
    /// later cycle.
    async fn process_reminder(&self, reminder: &Reminder) -> Result<(), DispatchError> {
        let (task, recipient) = self.resolve(reminder).await?;

        let message = message::render(reminder, &task, &recipient);
        self.notifier.send(reminder, &recipient, &message).await?;

        self.store
            .mark_sent(reminder.id, self.clock.now())
            .await
            .map_err(DispatchError::MarkSent)?;

        info!(reminder_id = %reminder.id, to = %recipient.contact_address, "Reminder sent");
        Ok(())
    }

    async fn resolve(&self, reminder: &Reminder) -> Result<(TaskInfo, Recipient), DispatchError> {
        let (task, recipient) = tokio::join!(
            self.directory.get_task(reminder.task_id),
            self.directory.get_recipient(reminder.user_id)
        );

        let task = task?.ok_or(DispatchError::TaskMissing(reminder.task_id))?;
        let recipient = recipient?
            .filter(Recipient::has_contact)
            .ok_or(DispatchError::RecipientUnresolvable(reminder.user_id))?;

        Ok((task, recipient))
    }
}
