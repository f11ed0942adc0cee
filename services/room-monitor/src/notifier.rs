//! Notifier trait for sending alerts

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A notification to be sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub subject: String,
    pub message: String,
    pub timestamp: String,
}

/// Record of an attempted notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub notifier_type: String,
    pub subject: String,
    pub temperature: f64,
    pub success: bool,
    pub error: Option<String>,
    pub timestamp_epoch_ms: i64,
}

/// Trait for sending notifications
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Get the notifier type name (e.g. "webhook")
    fn type_name(&self) -> &str;

    /// Send a notification
    async fn notify(&self, notification: &Notification) -> crate::Result<()>;
}
