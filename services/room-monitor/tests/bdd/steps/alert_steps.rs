//! BDD step definitions for the alerting feature

use std::time::Duration;

use chrono::{Local, TimeZone};
use cucumber::{given, then, when};

use room_monitor::alert::{AlertDispatcher, AlertOutcome};

use crate::world::RoomMonitorWorld;

fn minute(world: &RoomMonitorWorld, minute: i64) -> chrono::DateTime<Local> {
    world.base_time.expect("base time not set") + chrono::Duration::minutes(minute)
}

#[given(expr = "an alert dispatcher with a threshold of {float} degrees and a {int} minute cooldown")]
fn alert_dispatcher(world: &mut RoomMonitorWorld, threshold: f64, cooldown_minutes: u64) {
    world.dispatcher = Some(AlertDispatcher::new(
        world.notifier.clone(),
        threshold,
        Duration::from_secs(cooldown_minutes * 60),
    ));
    world.base_time = Some(Local.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap());
}

#[given("the alert channel is failing")]
fn channel_failing(world: &mut RoomMonitorWorld) {
    world.notifier.set_failing(true);
}

#[given("the alert channel has recovered")]
fn channel_recovered(world: &mut RoomMonitorWorld) {
    world.notifier.set_failing(false);
}

#[when(expr = "a temperature of {float} degrees is evaluated at minute {int}")]
async fn evaluate_temperature(world: &mut RoomMonitorWorld, temperature: f64, at: i64) {
    let now = minute(world, at);
    let dispatcher = world.dispatcher.as_ref().expect("dispatcher not set");
    let (outcome, _) = dispatcher.evaluate(temperature, now).await;
    world.last_alert = Some(outcome);
}

#[then("an alert is sent")]
fn alert_sent(world: &mut RoomMonitorWorld) {
    assert_eq!(world.last_alert, Some(AlertOutcome::Sent));
}

#[then("no alert is attempted")]
fn alert_not_attempted(world: &mut RoomMonitorWorld) {
    assert_eq!(world.last_alert, Some(AlertOutcome::BelowThreshold));
}

#[then("the alert is suppressed")]
fn alert_suppressed(world: &mut RoomMonitorWorld) {
    assert!(
        matches!(world.last_alert, Some(AlertOutcome::Suppressed { .. })),
        "got {:?}",
        world.last_alert
    );
}

#[then("the alert delivery fails")]
fn alert_failed(world: &mut RoomMonitorWorld) {
    assert!(
        matches!(world.last_alert, Some(AlertOutcome::Failed(_))),
        "got {:?}",
        world.last_alert
    );
}

#[then(expr = "the last alert time is minute {int}")]
fn last_alert_time(world: &mut RoomMonitorWorld, at: i64) {
    let expected = minute(world, at);
    let dispatcher = world.dispatcher.as_ref().expect("dispatcher not set");
    assert_eq!(dispatcher.state().last_sent_at, Some(expected));
}

#[then("no alert time is recorded")]
fn no_alert_time(world: &mut RoomMonitorWorld) {
    let dispatcher = world.dispatcher.as_ref().expect("dispatcher not set");
    assert_eq!(dispatcher.state().last_sent_at, None);
}

#[then(expr = "the channel has received {int} notification(s)")]
fn notifications_delivered(world: &mut RoomMonitorWorld, count: usize) {
    assert_eq!(world.notifier.delivered(), count);
}
