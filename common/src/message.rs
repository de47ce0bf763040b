// Notification content rendering

use crate::models::{Recipient, Reminder, TaskInfo};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Rendered notification handed to the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderMessage {
    pub subject: String,
    pub body: String,
}

/// Render a human-readable reminder for one task and recipient. Times in the
/// body are shown in the reminder's timezone; an unknown zone falls back to
/// UTC. The zone is presentation only and never enters due-time comparison.
pub fn render(reminder: &Reminder, task: &TaskInfo, recipient: &Recipient) -> ReminderMessage {
    let tz: Tz = reminder.timezone.parse().unwrap_or(Tz::UTC);

    let subject = format!("Task Reminder: {}", task.title);

    let mut lines = Vec::new();
    lines.push(format!("Hello {}", recipient.display_name).trim_end().to_string());
    lines.push(String::new());
    lines.push(format!("This is a reminder for your task: {}.", task.title));
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("Description: {}", description));
    }
    if let Some(due) = task.due_date {
        lines.push(format!("Due: {}", format_in_zone(due, tz)));
    }
    lines.push(format!(
        "Scheduled at: {} ({})",
        format_in_zone(reminder.scheduled_at, tz),
        reminder.timezone
    ));

    ReminderMessage {
        subject,
        body: lines.join("\n"),
    }
}

fn format_in_zone(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%b %-d, %Y, %-I:%M %p").to_string()
}
