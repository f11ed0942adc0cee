//! High temperature alert dispatcher with cooldown
//!
//! A reading strictly above the threshold is a candidate alert. Candidates
//! within the cooldown of the last *successful* dispatch are suppressed.
//! Failed dispatches never touch the cooldown, so the next qualifying reading
//! retries.
//!
//! The alert state lives behind a single mutex held from the cooldown check
//! through the send, so two overlapping evaluations can never both dispatch.
//! Readers see a copy published through a watch channel, which never waits on
//! a send in progress.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};

use crate::config::AlertConfig;
use crate::notifier::{Notification, NotificationRecord, Notifier};

/// Timestamp format used in alert messages
pub const ALERT_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Cooldown state shared across cycles
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    pub last_sent_at: Option<DateTime<Local>>,
}

impl AlertState {
    /// Time left before another alert may be sent, if any
    pub fn cooldown_remaining(&self, now: DateTime<Local>, cooldown: Duration) -> Option<Duration> {
        let last = self.last_sent_at?;
        // a clock step backwards counts as no time elapsed
        let elapsed = match now.signed_duration_since(last).to_std() {
            Ok(elapsed) => elapsed,
            Err(_) => {
                tracing::warn!(
                    "Clock is behind the last alert ({} < {}), cooldown restarts from now",
                    now.format(ALERT_TIME_FORMAT),
                    last.format(ALERT_TIME_FORMAT)
                );
                Duration::ZERO
            }
        };
        cooldown.checked_sub(elapsed).filter(|r| !r.is_zero())
    }
}

/// Result of evaluating one temperature
#[derive(Debug, Clone, PartialEq)]
pub enum AlertOutcome {
    BelowThreshold,
    Suppressed { remaining: Duration },
    Sent,
    Failed(String),
}

/// Decides whether a temperature warrants an alert and sends it
#[derive(Debug)]
pub struct AlertDispatcher {
    notifier: Arc<dyn Notifier>,
    threshold: f64,
    cooldown: Duration,
    state: Mutex<AlertState>,
    published: watch::Sender<AlertState>,
}

impl AlertDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, threshold: f64, cooldown: Duration) -> Self {
        Self {
            notifier,
            threshold,
            cooldown,
            state: Mutex::new(AlertState::default()),
            published: watch::Sender::new(AlertState::default()),
        }
    }

    pub fn from_config(config: &AlertConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(notifier, config.threshold_celsius, config.cooldown)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Last published cooldown state. Does not wait for a send in progress.
    pub fn state(&self) -> AlertState {
        *self.published.borrow()
    }

    /// Subscribe to cooldown state changes
    pub fn subscribe(&self) -> watch::Receiver<AlertState> {
        self.published.subscribe()
    }

    /// Evaluate a temperature observed at `now`.
    ///
    /// Returns the outcome together with the record of the dispatch attempt,
    /// if one was made.
    pub async fn evaluate(
        &self,
        temperature: f64,
        now: DateTime<Local>,
    ) -> (AlertOutcome, Option<NotificationRecord>) {
        if temperature <= self.threshold || temperature.is_nan() {
            return (AlertOutcome::BelowThreshold, None);
        }

        let mut state = self.state.lock().await;

        if let Some(remaining) = state.cooldown_remaining(now, self.cooldown) {
            tracing::info!(
                "Temperature {:.1}°C above {:.1}°C but alert suppressed, cooldown has {} left",
                temperature,
                self.threshold,
                humantime::format_duration(Duration::from_secs(remaining.as_secs()))
            );
            return (AlertOutcome::Suppressed { remaining }, None);
        }

        let notification = self.build_notification(temperature, now);
        let result = self.notifier.notify(&notification).await;

        let record = NotificationRecord {
            notifier_type: self.notifier.type_name().to_string(),
            subject: notification.subject.clone(),
            temperature,
            success: result.is_ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
            timestamp_epoch_ms: now.timestamp_millis(),
        };

        let outcome = match result {
            Ok(()) => {
                state.last_sent_at = Some(now);
                self.published.send_replace(*state);
                tracing::info!(
                    "High temperature alert sent via '{}': {:.1}°C",
                    self.notifier.type_name(),
                    temperature
                );
                AlertOutcome::Sent
            }
            Err(e) => {
                tracing::warn!(
                    "High temperature alert via '{}' failed: {}",
                    self.notifier.type_name(),
                    e
                );
                AlertOutcome::Failed(e.to_string())
            }
        };

        (outcome, Some(record))
    }

    fn build_notification(&self, temperature: f64, now: DateTime<Local>) -> Notification {
        Notification {
            subject: format!("Temperature alert: {:.1}°C", temperature),
            message: format!(
                "The room temperature reached {:.1}°C, above the {:.1}°C safety limit. \
                 Check the room as soon as possible.",
                temperature, self.threshold
            ),
            timestamp: now.format(ALERT_TIME_FORMAT).to_string(),
        }
    }
}
