// HTTP notification gateway adapter

use crate::config::NotifierConfig;
use crate::errors::NotifyError;
use crate::message::ReminderMessage;
use crate::models::{Recipient, Reminder};
use crate::notify::Notifier;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Notifier that posts rendered reminders to the notification gateway, which
/// owns the actual email/push/SMS delivery behind a single HTTP surface.
pub struct GatewayNotifier {
    client: Client,
    endpoint: String,
    token: Option<String>,
    from_address: String,
}

impl GatewayNotifier {
    pub fn new(config: &NotifierConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                NotifyError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Notifier for GatewayNotifier {
    #[tracing::instrument(skip_all, fields(reminder_id = %reminder.id))]
    async fn send(
        &self,
        reminder: &Reminder,
        recipient: &Recipient,
        message: &ReminderMessage,
    ) -> Result<(), NotifyError> {
        if !recipient.has_contact() {
            return Err(NotifyError::InvalidAddress(
                recipient.contact_address.clone(),
            ));
        }

        let payload = json!({
            "channel": reminder.channel.as_str(),
            "to": recipient.contact_address,
            "from": self.from_address,
            "subject": message.subject,
            "body": message.body,
        });

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        tracing::debug!(to = %recipient.contact_address, "Notification accepted by gateway");
        Ok(())
    }
}
