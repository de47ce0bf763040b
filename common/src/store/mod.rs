// Persistence contracts consumed by the dispatch engine

pub mod postgres;

use crate::errors::StoreError;
use crate::models::{Recipient, Reminder, TaskInfo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use postgres::{PgDirectory, PgReminderStore};

/// Persisted reminder state. The store is the single source of truth: the
/// engine never caches reminders across scan cycles, and every mark operation
/// is independently atomic (no cross-reminder transaction).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// All reminders still `scheduled` with `scheduled_at <= now`, ordered
    /// ascending by schedule time, ties broken by id so scans are
    /// reproducible.
    async fn fetch_due(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError>;

    /// Transition a `scheduled` reminder to `sent`, stamping `processed_at`.
    /// Returns `NotFound` when the reminder is absent or no longer
    /// `scheduled`.
    async fn mark_sent(
        &self,
        id: Uuid,
        processed_at: DateTime<Utc>,
    ) -> Result<Reminder, StoreError>;

    /// Transition a `scheduled` reminder to `cancelled`.
    async fn mark_cancelled(&self, id: Uuid) -> Result<Reminder, StoreError>;
}

/// Task and recipient lookups used to address and render notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Directory: Send + Sync {
    async fn get_task(&self, task_id: Uuid) -> Result<Option<TaskInfo>, StoreError>;

    async fn get_recipient(&self, user_id: Uuid) -> Result<Option<Recipient>, StoreError>;
}
