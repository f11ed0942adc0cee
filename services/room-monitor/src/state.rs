//! Shared state for the reading window, analysis, and alert history

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::analyzer::{analyze, Analysis};
use crate::history::HistoryBuffer;
use crate::notifier::NotificationRecord;
use crate::reading::Reading;

/// Consecutive failures after which a warning is logged
pub const CONSECUTIVE_FAILURE_WARNING: u32 = 5;

/// Per-cycle counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleStats {
    pub recorded: u64,
    pub no_data: u64,
    pub failures: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

/// Shared state accessible by engine and dashboard
#[derive(Debug)]
pub struct SharedState {
    pub history: HistoryBuffer,
    pub analysis: Analysis,
    pub stats: CycleStats,
    pub alerts: VecDeque<NotificationRecord>,
    pub alerts_max_size: usize,
    pub trend_threshold: f64,
    pub started_at: Instant,
}

impl SharedState {
    pub fn new(capacity: usize, trend_threshold: f64, alerts_max_size: usize) -> Self {
        Self {
            history: HistoryBuffer::new(capacity),
            analysis: Analysis::pending(),
            stats: CycleStats::default(),
            alerts: VecDeque::with_capacity(alerts_max_size),
            alerts_max_size,
            trend_threshold,
            started_at: Instant::now(),
        }
    }

    /// Append a reading and publish the analysis of the new window.
    ///
    /// Both happen under the caller's single `&mut` borrow, so no other
    /// append can land between them.
    pub fn record_reading(&mut self, reading: Reading) -> Analysis {
        let snapshot = self.history.append(reading);
        if let Some(analysis) = analyze(&snapshot, self.trend_threshold) {
            self.analysis = analysis;
        }
        self.stats.recorded += 1;
        self.stats.consecutive_failures = 0;
        self.analysis.clone()
    }

    /// Most recent reading, if any
    pub fn latest(&self) -> Option<&Reading> {
        self.history.latest()
    }

    /// Count a cycle skipped because the record was absent
    pub fn record_no_data(&mut self) {
        self.stats.no_data += 1;
        self.stats.consecutive_failures = 0;
    }

    /// Count a failed cycle, returning the consecutive failure count
    pub fn record_failure(&mut self, error: String) -> u32 {
        self.stats.failures += 1;
        self.stats.consecutive_failures += 1;
        self.stats.last_error = Some(error);
        self.stats.consecutive_failures
    }

    /// Add an alert attempt to the log
    pub fn add_alert(&mut self, record: NotificationRecord) {
        if self.alerts_max_size == 0 {
            return;
        }
        if self.alerts.len() >= self.alerts_max_size {
            self.alerts.pop_front();
        }
        self.alerts.push_back(record);
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<SharedState>>;

pub fn new_state_handle(
    capacity: usize,
    trend_threshold: f64,
    alerts_max_size: usize,
) -> StateHandle {
    Arc::new(RwLock::new(SharedState::new(
        capacity,
        trend_threshold,
        alerts_max_size,
    )))
}
