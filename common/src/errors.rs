// Error handling framework

use thiserror::Error;
use uuid::Uuid;

/// Reminder store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Reminder store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Reminder not found: {0}")]
    NotFound(Uuid),
}

/// Notification transport errors. Expected failure modes (bad address,
/// transport error) are values, never panics.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid recipient address: {0:?}")]
    InvalidAddress(String),

    #[error("Notification gateway rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Per-reminder dispatch failures. These stay local to one reminder and are
/// aggregated into the cycle summary; they never unwind the rest of a chunk.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Task {0} no longer exists")]
    TaskMissing(Uuid),

    #[error("Recipient {0} missing or without a usable contact address")]
    RecipientUnresolvable(Uuid),

    #[error("Task/recipient lookup failed: {0}")]
    Lookup(#[from] StoreError),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] NotifyError),

    #[error("Delivered but mark-sent failed: {0}")]
    MarkSent(StoreError),
}

impl DispatchError {
    /// The notification went out but the state transition did not stick, so
    /// the reminder stays `scheduled` and will be re-sent next cycle.
    pub fn is_duplicate_risk(&self) -> bool {
        matches!(self, DispatchError::MarkSent(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StoreError::Unavailable(err.to_string()),
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let id = Uuid::new_v4();
        let err = StoreError::NotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_mark_sent_failure_is_duplicate_risk() {
        let err = DispatchError::MarkSent(StoreError::Unavailable("connection reset".into()));
        assert!(err.is_duplicate_risk());
    }

    #[test]
    fn test_other_failures_are_not_duplicate_risk() {
        let delivery = DispatchError::Delivery(NotifyError::Transport("timeout".into()));
        let lookup = DispatchError::Lookup(StoreError::QueryFailed("syntax".into()));
        assert!(!delivery.is_duplicate_risk());
        assert!(!lookup.is_duplicate_risk());
    }

    #[test]
    fn test_notify_error_rejected_display() {
        let err = NotifyError::Rejected {
            status: 502,
            body: "bad gateway".into(),
        };
        assert!(err.to_string().contains("502"));
    }
}
