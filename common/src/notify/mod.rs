// Notification transport contract

pub mod gateway;

use crate::errors::NotifyError;
use crate::message::ReminderMessage;
use crate::models::{Recipient, Reminder};
use async_trait::async_trait;

pub use gateway::GatewayNotifier;

/// Delivers one rendered reminder to one recipient. Pure transport: the
/// dispatcher supplies the content, the notifier only reports success or
/// failure.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        reminder: &Reminder,
        recipient: &Recipient,
        message: &ReminderMessage,
    ) -> Result<(), NotifyError>;
}
