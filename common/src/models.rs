use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Reminder Models
// ============================================================================

/// Lifecycle state of a reminder. `Sent` and `Cancelled` are terminal; only
/// `Scheduled` reminders are ever picked up by a scan cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Scheduled,
    Sent,
    Cancelled,
}

impl ReminderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderStatus::Scheduled => "scheduled",
            ReminderStatus::Sent => "sent",
            ReminderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReminderStatus::Scheduled)
    }
}

impl FromStr for ReminderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(ReminderStatus::Scheduled),
            "sent" => Ok(ReminderStatus::Sent),
            "cancelled" => Ok(ReminderStatus::Cancelled),
            other => Err(format!("Unknown reminder status: {}", other)),
        }
    }
}

/// Delivery medium tag. The dispatch engine treats it as an opaque selector
/// handed through to the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderChannel {
    Email,
    Push,
    Sms,
}

impl ReminderChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderChannel::Email => "email",
            ReminderChannel::Push => "push",
            ReminderChannel::Sms => "sms",
        }
    }
}

impl FromStr for ReminderChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(ReminderChannel::Email),
            "push" => Ok(ReminderChannel::Push),
            "sms" => Ok(ReminderChannel::Sms),
            other => Err(format!("Unknown reminder channel: {}", other)),
        }
    }
}

/// A scheduled notification tied to one task and one recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    /// Absolute UTC instant at which the reminder becomes due.
    pub scheduled_at: DateTime<Utc>,
    pub status: ReminderStatus,
    pub channel: ReminderChannel,
    /// IANA zone name, used only when rendering times in the notification
    /// body. Due-time comparison always uses the absolute `scheduled_at`.
    pub timezone: String,
    /// Set when the reminder transitions out of `scheduled`. A `sent`
    /// reminder always has it; a `scheduled` one never does.
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reminder {
    /// A reminder is due once it is still `scheduled` and its schedule time
    /// has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == ReminderStatus::Scheduled && self.scheduled_at <= now
    }
}

/// Payload for persisting a new reminder.
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub channel: ReminderChannel,
    pub timezone: String,
}

impl NewReminder {
    /// Schedule a reminder `lead` ahead of the task's due time. The lead
    /// interval is a policy value carried in configuration, not a constant
    /// baked in here.
    pub fn for_task_due(
        task_id: Uuid,
        user_id: Uuid,
        due_at: DateTime<Utc>,
        lead: Duration,
        channel: ReminderChannel,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            user_id,
            scheduled_at: due_at - lead,
            channel,
            timezone: timezone.into(),
        }
    }
}

// ============================================================================
// Lookup Projections
// ============================================================================

/// Task fields needed to render a notification.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Contact details for the reminder's owner.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub contact_address: String,
    pub display_name: String,
}

impl Recipient {
    /// Whether the recipient can actually be addressed.
    pub fn has_contact(&self) -> bool {
        !self.contact_address.trim().is_empty()
    }
}

// ============================================================================
// Cycle Outcome
// ============================================================================

/// Aggregate outcome of one scan cycle, loggable by the supervisor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reminder_at(scheduled_at: DateTime<Utc>, status: ReminderStatus) -> Reminder {
        Reminder {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            scheduled_at,
            status,
            channel: ReminderChannel::Email,
            timezone: "Asia/Ho_Chi_Minh".to_string(),
            processed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_reminder_due_only_after_schedule_time() {
        let due_at = Utc::now();
        let lead = Duration::minutes(60);
        let new = NewReminder::for_task_due(
            Uuid::new_v4(),
            Uuid::new_v4(),
            due_at,
            lead,
            ReminderChannel::Email,
            "UTC",
        );
        let reminder = reminder_at(new.scheduled_at, ReminderStatus::Scheduled);

        // One minute before the reminder time it is not yet due, one minute
        // after it is.
        assert!(!reminder.is_due(due_at - Duration::minutes(61)));
        assert!(reminder.is_due(due_at - Duration::minutes(59)));
        assert!(reminder.is_due(new.scheduled_at));
    }

    #[test]
    fn test_terminal_reminders_are_never_due() {
        let past = Utc::now() - Duration::hours(2);
        assert!(!reminder_at(past, ReminderStatus::Sent).is_due(Utc::now()));
        assert!(!reminder_at(past, ReminderStatus::Cancelled).is_due(Utc::now()));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ReminderStatus::Scheduled,
            ReminderStatus::Sent,
            ReminderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<ReminderStatus>(), Ok(status));
        }
        assert!("done".parse::<ReminderStatus>().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!ReminderStatus::Scheduled.is_terminal());
        assert!(ReminderStatus::Sent.is_terminal());
        assert!(ReminderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_recipient_contact_check() {
        let recipient = Recipient {
            contact_address: "   ".to_string(),
            display_name: "An".to_string(),
        };
        assert!(!recipient.has_contact());

        let recipient = Recipient {
            contact_address: "an@example.com".to_string(),
            display_name: "An".to_string(),
        };
        assert!(recipient.has_contact());
    }
}
