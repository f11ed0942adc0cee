//! Webhook notification client
//!
//! Posts a form-relay style JSON payload (FormSubmit compatible): the relay
//! turns it into an e-mail to the configured address.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::io::HttpClient;
use crate::notifier::{Notification, Notifier};
use crate::RoomMonitorError;

/// Webhook notification sender
pub struct WebhookNotifier {
    endpoint: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl WebhookNotifier {
    pub fn new(endpoint: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        let endpoint = endpoint.into();
        tracing::debug!("Created WebhookNotifier for {}", endpoint);
        Self { endpoint, http }
    }
}

/// Request body for a notification
pub fn payload(notification: &Notification) -> serde_json::Value {
    json!({
        "_subject": notification.subject,
        "message": notification.message,
        "timestamp": notification.timestamp,
        "_captcha": "false",
        "_template": "table",
    })
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn type_name(&self) -> &str {
        "webhook"
    }

    async fn notify(&self, notification: &Notification) -> crate::Result<()> {
        tracing::debug!(
            "Sending webhook notification: subject='{}'",
            notification.subject
        );

        let response = self
            .http
            .post_json(&self.endpoint, &payload(notification))
            .await?;

        if !response.is_success() {
            return Err(RoomMonitorError::Alert(format!(
                "Webhook returned status {}: {}",
                response.status, response.body
            )));
        }

        // an unparseable body means the relay did not accept the request
        serde_json::from_str::<serde_json::Value>(&response.body).map_err(|e| {
            RoomMonitorError::Alert(format!("Webhook response is not JSON: {}", e))
        })?;

        tracing::debug!("Webhook notification sent successfully");
        Ok(())
    }
}
