//! Step definitions for the polling monitor

use std::time::Duration;

use cucumber::{given, then, when};

use brewwatch::monitor::{Phase, TEMPERATURE_ALERT};
use brewwatch::timer::TimerKind;

use crate::world::{reading, unreachable, BrewwatchWorld};

// --- Given ---

#[given("uptime alerts are disabled")]
fn uptime_alerts_disabled(world: &mut BrewwatchWorld) {
    world.settings_mut().uptime_alert_enabled = false;
}

#[given(expr = "uptime alerts are enabled with a limit of {int} minutes")]
fn uptime_alerts_enabled(world: &mut BrewwatchWorld, minutes: u64) {
    let settings = world.settings_mut();
    settings.uptime_alert_enabled = true;
    settings.max_uptime_minutes = minutes as f64;
}

#[given("the machine is unreachable")]
fn machine_unreachable(world: &mut BrewwatchWorld) {
    world.probe.respond_with(Err(unreachable()));
}

#[given(expr = "the machine reports {float}°C against a target of {float}°C after {int} seconds")]
fn machine_reports(world: &mut BrewwatchWorld, temperature: f64, target: f64, uptime_seconds: u64) {
    world
        .probe
        .respond_with(reading(temperature, target, uptime_seconds));
}

// --- When ---

#[when("the machine becomes unreachable")]
fn machine_becomes_unreachable(world: &mut BrewwatchWorld) {
    world.probe.respond_with(Err(unreachable()));
}

#[when(expr = "the machine starts reporting {float}°C against a target of {float}°C after {int} seconds")]
fn machine_starts_reporting(
    world: &mut BrewwatchWorld,
    temperature: f64,
    target: f64,
    uptime_seconds: u64,
) {
    world
        .probe
        .respond_with(reading(temperature, target, uptime_seconds));
}

#[when("the monitor starts")]
async fn monitor_starts(world: &mut BrewwatchWorld) {
    world.build_monitor().start().await;
}

#[when("the poll timer fires")]
async fn poll_timer_fires(world: &mut BrewwatchWorld) {
    world.fire_poll_timer().await;
}

#[when(expr = "the poll timer fires {int} more times")]
async fn poll_timer_fires_times(world: &mut BrewwatchWorld, times: usize) {
    for _ in 0..times {
        world.fire_poll_timer().await;
    }
}

#[when("the restart timer fires")]
async fn restart_timer_fires(world: &mut BrewwatchWorld) {
    world.fire_restart_timer().await;
}

// --- Then ---

#[then("the machine is considered online")]
fn machine_is_online(world: &mut BrewwatchWorld) {
    let monitor = world.monitor();
    assert!(monitor.state().is_online());
    assert!(monitor.state().uptime_started_at().is_some());
    assert_eq!(monitor.phase(), Phase::OnlinePolling);
}

#[then("the machine is considered offline")]
fn machine_is_offline(world: &mut BrewwatchWorld) {
    let monitor = world.monitor();
    assert!(!monitor.state().is_online());
    assert!(monitor.state().uptime_started_at().is_none());
    assert_eq!(monitor.phase(), Phase::OfflinePolling);
}

#[then(expr = "the poll interval is {int} seconds")]
fn poll_interval_is(world: &mut BrewwatchWorld, seconds: u64) {
    assert_eq!(world.poll_period(), Duration::from_secs(seconds));
}

#[then("no alerts have been sent")]
async fn no_alerts_sent(world: &mut BrewwatchWorld) {
    assert!(world.notifier.messages().await.is_empty());
}

#[then(expr = "the number of alerts sent is {int}")]
async fn alerts_sent(world: &mut BrewwatchWorld, count: usize) {
    assert_eq!(world.notifier.messages().await.len(), count);
}

#[then("the last alert is the temperature alert")]
async fn last_alert_is_temperature(world: &mut BrewwatchWorld) {
    let messages = world.notifier.messages().await;
    assert_eq!(messages.last().map(String::as_str), Some(TEMPERATURE_ALERT));
}

#[then(expr = "the last alert mentions {string}")]
async fn last_alert_mentions(world: &mut BrewwatchWorld, text: String) {
    let messages = world.notifier.messages().await;
    let last = messages.last().expect("no alert sent");
    assert!(last.contains(&text), "alert {:?} does not mention {:?}", last, text);
}

#[then("monitoring is paused")]
fn monitoring_is_paused(world: &mut BrewwatchWorld) {
    assert_eq!(world.monitor().phase(), Phase::PausedAfterCompletion);
    assert!(world.scheduler.active(TimerKind::Poll).is_empty());
}

#[then(expr = "a restart is scheduled in {int} seconds")]
fn restart_scheduled(world: &mut BrewwatchWorld, seconds: u64) {
    let restarts = world.scheduler.active(TimerKind::Restart);
    assert_eq!(restarts.len(), 1);
    assert_eq!(restarts[0].period(), Duration::from_secs(seconds));
}

#[then("no restart is pending")]
fn no_restart_pending(world: &mut BrewwatchWorld) {
    assert!(world.monitor().restart_timer().is_none());
}

#[then("both alert flags are cleared")]
fn alert_flags_cleared(world: &mut BrewwatchWorld) {
    let state = world.monitor().state();
    assert!(!state.temperature_notified());
    assert!(!state.uptime_notified());
}

#[then(expr = "the status endpoint has been probed {int} times")]
fn probed_times(world: &mut BrewwatchWorld, count: usize) {
    assert_eq!(world.probe.calls(), count);
}
