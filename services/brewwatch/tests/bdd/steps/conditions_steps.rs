//! Step definitions for the pure alert conditions

use std::time::Duration;

use cucumber::{given, then, when};

use brewwatch::conditions::{temperature_reached, uptime_exceeded, uptime_minutes};

use crate::world::BrewwatchWorld;

#[given(expr = "a startup delay of {int} ms")]
fn set_startup_delay(world: &mut BrewwatchWorld, delay_ms: u64) {
    world.startup_delay_ms = Some(delay_ms);
}

#[given(expr = "a temperature variance of {float}°C")]
fn set_variance(world: &mut BrewwatchWorld, variance: f64) {
    world.variance_c = Some(variance);
}

#[when(expr = "the temperature is checked at {float}°C against a target of {float}°C after {int} seconds")]
fn check_temperature(world: &mut BrewwatchWorld, current: f64, target: f64, uptime_seconds: u64) {
    let delay = Duration::from_millis(world.startup_delay_ms.unwrap_or(120_000));
    let variance = world.variance_c.unwrap_or(0.5);
    world.temperature_check = Some(temperature_reached(
        current,
        target,
        uptime_seconds,
        delay,
        false,
        variance,
    ));
}

#[when(expr = "the uptime is checked after {int} seconds with a limit of {int} minutes")]
fn check_uptime(world: &mut BrewwatchWorld, uptime_seconds: u64, limit_minutes: u64) {
    world.uptime_alert_fires = Some(uptime_exceeded(
        uptime_minutes(uptime_seconds),
        false,
        true,
        limit_minutes as f64,
    ));
}

#[then("the temperature is considered reached")]
fn temperature_is_reached(world: &mut BrewwatchWorld) {
    let check = world.temperature_check.expect("temperature not checked");
    assert!(check.reached);
    assert_eq!(check.startup_remaining_secs, 0);
}

#[then("the temperature is not considered reached")]
fn temperature_is_not_reached(world: &mut BrewwatchWorld) {
    let check = world.temperature_check.expect("temperature not checked");
    assert!(!check.reached);
}

#[then(expr = "{int} seconds of startup delay remain")]
fn startup_delay_remains(world: &mut BrewwatchWorld, seconds: u64) {
    let check = world.temperature_check.expect("temperature not checked");
    assert_eq!(check.startup_remaining_secs, seconds);
}

#[then("the uptime alert fires")]
fn uptime_alert_fires(world: &mut BrewwatchWorld) {
    assert_eq!(world.uptime_alert_fires, Some(true));
}

#[then("the uptime alert does not fire")]
fn uptime_alert_does_not_fire(world: &mut BrewwatchWorld) {
    assert_eq!(world.uptime_alert_fires, Some(false));
}
