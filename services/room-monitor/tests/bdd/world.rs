//! BDD test world for the room monitor service

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local};
use cucumber::World;
use room_monitor::alert::{AlertDispatcher, AlertOutcome};
use room_monitor::analyzer::Analysis;
use room_monitor::engine::{CycleOutcome, Engine};
use room_monitor::notifier::{Notification, Notifier};
use room_monitor::reading::{RawSample, Reading};
use room_monitor::source::SensorSource;
use room_monitor::state::new_state_handle;
use room_monitor::RoomMonitorError;

/// A notifier that records deliveries and can be switched to failing
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    failing: AtomicBool,
    delivered: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn delivered(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    fn type_name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, notification: &Notification) -> room_monitor::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RoomMonitorError::Alert("channel unreachable".to_string()));
        }
        self.delivered.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// What the scripted sensor should answer next
#[derive(Debug)]
pub enum ScriptStep {
    Sample(RawSample),
    Missing,
    Failure,
}

/// A sensor source that plays back a script, then reports no data
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<ScriptStep>>,
}

impl ScriptedSource {
    pub fn push(&self, step: ScriptStep) {
        self.script.lock().unwrap().push_back(step);
    }
}

#[async_trait::async_trait]
impl SensorSource for ScriptedSource {
    async fn fetch(&self) -> room_monitor::Result<Option<RawSample>> {
        match self.script.lock().unwrap().pop_front() {
            Some(ScriptStep::Sample(sample)) => Ok(Some(sample)),
            Some(ScriptStep::Failure) => Err(RoomMonitorError::Http(
                "GET sensor record failed: connection reset".to_string(),
            )),
            Some(ScriptStep::Missing) | None => Ok(None),
        }
    }
}

#[derive(Debug, Default, World)]
pub struct RoomMonitorWorld {
    // Alert testing
    pub notifier: Arc<RecordingNotifier>,
    pub dispatcher: Option<AlertDispatcher>,
    pub base_time: Option<DateTime<Local>>,
    pub last_alert: Option<AlertOutcome>,

    // Cycle testing
    pub source: Arc<ScriptedSource>,
    pub engine: Option<Engine>,
    pub before_cycle: Option<(Vec<Reading>, Analysis)>,
    pub last_cycle: Option<CycleOutcome>,
}

impl RoomMonitorWorld {
    /// The engine under test, built on first use
    pub fn engine(&mut self) -> &Engine {
        let source: Arc<dyn SensorSource> = self.source.clone();
        self.engine.get_or_insert_with(|| {
            Engine::new(
                source,
                None,
                new_state_handle(10, 5.0, 10),
                Duration::from_secs(10),
                Duration::from_secs(5),
            )
        })
    }
}
