//! BDD step definitions for the poll cycle feature

use cucumber::{given, then, when};

use room_monitor::engine::CycleOutcome;
use room_monitor::reading::RawSample;

use crate::world::{RoomMonitorWorld, ScriptStep};

async fn run_cycles(world: &mut RoomMonitorWorld, count: usize) {
    for _ in 0..count {
        let before = {
            let state = world.engine().state().read().await;
            (state.history.snapshot(), state.analysis.clone())
        };
        world.before_cycle = Some(before);
        let outcome = world.engine().run_cycle().await;
        world.last_cycle = Some(outcome);
    }
}

#[given(expr = "the sensor reports {float} degrees and {float} percent")]
fn sensor_reports(world: &mut RoomMonitorWorld, temperature: f64, humidity: f64) {
    world.source.push(ScriptStep::Sample(RawSample {
        temperature,
        humidity,
    }));
}

#[given(expr = "the sensor reports temperatures from {int} to {int}")]
fn sensor_reports_range(world: &mut RoomMonitorWorld, from: i32, to: i32) {
    for t in from..=to {
        world.source.push(ScriptStep::Sample(RawSample {
            temperature: f64::from(t),
            humidity: 50.0,
        }));
    }
}

#[given("the sensor record is missing")]
fn sensor_missing(world: &mut RoomMonitorWorld) {
    world.source.push(ScriptStep::Missing);
}

#[given("the sensor source is failing")]
fn sensor_failing(world: &mut RoomMonitorWorld) {
    world.source.push(ScriptStep::Failure);
}

#[given(expr = "{int} cycle(s) has/have run")]
async fn cycles_have_run(world: &mut RoomMonitorWorld, count: usize) {
    run_cycles(world, count).await;
}

#[when("a cycle runs")]
async fn a_cycle_runs(world: &mut RoomMonitorWorld) {
    run_cycles(world, 1).await;
}

#[when(expr = "{int} cycle(s) run(s)")]
async fn cycles_run(world: &mut RoomMonitorWorld, count: usize) {
    run_cycles(world, count).await;
}

#[then("the cycle is skipped for lack of data")]
fn cycle_no_data(world: &mut RoomMonitorWorld) {
    assert_eq!(world.last_cycle, Some(CycleOutcome::NoData));
}

#[then("the cycle fails")]
fn cycle_failed(world: &mut RoomMonitorWorld) {
    assert!(
        matches!(world.last_cycle, Some(CycleOutcome::Failed(_))),
        "got {:?}",
        world.last_cycle
    );
}

#[then("the window and analysis are unchanged")]
async fn window_unchanged(world: &mut RoomMonitorWorld) {
    let (window, analysis) = world.before_cycle.clone().expect("no cycle has run");
    let state = world.engine().state().read().await;
    assert_eq!(state.history.snapshot(), window);
    assert_eq!(state.analysis, analysis);
}

#[then(expr = "the window holds temperatures from {int} to {int}")]
async fn window_holds(world: &mut RoomMonitorWorld, from: i32, to: i32) {
    let state = world.engine().state().read().await;
    let temperatures: Vec<f64> = state
        .history
        .snapshot()
        .iter()
        .map(|r| r.temperature)
        .collect();
    let expected: Vec<f64> = (from..=to).map(f64::from).collect();
    assert_eq!(temperatures, expected);
}

#[then(expr = "the temperature status is {string} with color {string}")]
async fn temperature_status(world: &mut RoomMonitorWorld, status: String, color: String) {
    let state = world.engine().state().read().await;
    assert_eq!(state.analysis.temperature.status, status);
    assert_eq!(state.analysis.temperature.color, color);
}

#[then(expr = "the humidity status is {string} with color {string}")]
async fn humidity_status(world: &mut RoomMonitorWorld, status: String, color: String) {
    let state = world.engine().state().read().await;
    assert_eq!(state.analysis.humidity.status, status);
    assert_eq!(state.analysis.humidity.color, color);
}

#[then(expr = "the temperature average is {float}")]
async fn temperature_average(world: &mut RoomMonitorWorld, average: f64) {
    let state = world.engine().state().read().await;
    assert_eq!(state.analysis.temperature.average, average);
}
