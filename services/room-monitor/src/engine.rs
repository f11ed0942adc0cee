//! Engine: drives the poll cycle and feeds readings through the pipeline
//!
//! One cycle is fetch, then alert evaluation on the raw reading, then window
//! append and analysis. Cycles never overlap: the next tick is only awaited
//! once the current cycle has finished.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::alert::{AlertDispatcher, AlertOutcome};
use crate::analyzer::Analysis;
use crate::reading::{RawSample, Reading};
use crate::source::SensorSource;
use crate::state::{StateHandle, CONSECUTIVE_FAILURE_WARNING};
use crate::RoomMonitorError;

/// What a single cycle did
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Recorded(Analysis),
    NoData,
    Failed(String),
}

/// The engine owns the schedule and sequences each cycle
#[derive(Debug)]
pub struct Engine {
    source: Arc<dyn SensorSource>,
    dispatcher: Option<Arc<AlertDispatcher>>,
    state: StateHandle,
    interval: Duration,
    fetch_timeout: Duration,
}

impl Engine {
    pub fn new(
        source: Arc<dyn SensorSource>,
        dispatcher: Option<Arc<AlertDispatcher>>,
        state: StateHandle,
        interval: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            dispatcher,
            state,
            // tokio intervals panic on a zero period
            interval: interval.max(Duration::from_millis(1)),
            fetch_timeout,
        }
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    /// Run one complete cycle
    pub async fn run_cycle(&self) -> CycleOutcome {
        let fetched = self.fetch().await;
        self.apply(fetched).await
    }

    /// Feed one reading through alerting, the window, and analysis
    pub async fn on_reading(&self, reading: Reading) -> Analysis {
        if let Some(dispatcher) = &self.dispatcher {
            let (outcome, record) = dispatcher
                .evaluate(reading.temperature, reading.timestamp)
                .await;
            if outcome != AlertOutcome::BelowThreshold {
                tracing::debug!("Alert evaluation at {}: {:?}", reading.display_time, outcome);
            }
            if let Some(record) = record {
                self.state.write().await.add_alert(record);
            }
        }

        let analysis = self.state.write().await.record_reading(reading);
        tracing::debug!(
            "Window updated: temperature avg {:.1} ({}), humidity avg {:.0} ({})",
            analysis.temperature.average,
            analysis.temperature.status,
            analysis.humidity.average,
            analysis.humidity.status
        );
        analysis
    }

    async fn fetch(&self) -> crate::Result<Option<RawSample>> {
        match tokio::time::timeout(self.fetch_timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(RoomMonitorError::Source(format!(
                "fetch timed out after {}",
                humantime::format_duration(self.fetch_timeout)
            ))),
        }
    }

    async fn apply(&self, fetched: crate::Result<Option<RawSample>>) -> CycleOutcome {
        match fetched {
            Ok(Some(sample)) => {
                let reading = Reading::from_sample(sample, Local::now());
                tracing::debug!(
                    "Reading at {}: {:.1}°C, {:.0}%",
                    reading.display_time,
                    reading.temperature,
                    reading.humidity
                );
                CycleOutcome::Recorded(self.on_reading(reading).await)
            }
            Ok(None) => {
                tracing::info!("No sensor data found, skipping cycle");
                self.state.write().await.record_no_data();
                CycleOutcome::NoData
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!("Failed to fetch sensor data: {}", message);
                let failures = self.state.write().await.record_failure(message.clone());
                if failures == CONSECUTIVE_FAILURE_WARNING {
                    tracing::warn!("Sensor source has failed {} cycles in a row", failures);
                }
                CycleOutcome::Failed(message)
            }
        }
    }

    /// Poll until the cancellation token is triggered.
    ///
    /// The first cycle runs immediately. A fetch still in flight when the
    /// token fires is dropped and its result never applied.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Polling sensor every {}",
            humantime::format_duration(self.interval)
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Discarding in-flight fetch");
                    break;
                }
                fetched = self.fetch() => fetched,
            };

            self.apply(fetched).await;
        }

        tracing::debug!("Polling loop cancelled");
    }

    /// Start polling in a background task
    pub fn start(self, cancel: CancellationToken) -> PollerHandle {
        let engine = Arc::new(self);
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            engine.run(task_cancel).await;
        });
        PollerHandle { cancel, task }
    }
}

/// Handle to a running poller
#[derive(Debug)]
pub struct PollerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop polling. Once this returns no further reading will be applied.
    pub async fn stop(self) {
        self.cancel.cancel();
        self.join().await;
    }

    /// Wait for the poller to finish after its token is cancelled elsewhere
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::warn!("Poller task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
