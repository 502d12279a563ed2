//! Pure alert conditions evaluated against a telemetry snapshot

use std::time::Duration;

/// Outcome of the temperature check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureCheck {
    pub reached: bool,
    /// Whole seconds left in the startup grace period, 0 once it has elapsed
    pub startup_remaining_secs: u64,
}

/// Uptime rounded to the nearest whole minute
pub fn uptime_minutes(uptime_seconds: u64) -> u64 {
    (uptime_seconds as f64 / 60.0).round() as u64
}

/// True when the uptime alert should fire now
pub fn uptime_exceeded(
    uptime_minutes: u64,
    already_notified: bool,
    enabled: bool,
    max_minutes: f64,
) -> bool {
    enabled && !already_notified && uptime_minutes as f64 > max_minutes
}

/// Inclusive tolerance band around the target
pub fn temperature_in_range(current_c: f64, target_c: f64, variance_c: f64) -> bool {
    current_c >= target_c - variance_c && current_c <= target_c + variance_c
}

/// Decide whether the temperature alert should fire now.
///
/// Nothing is evaluated until the appliance has been up for the startup
/// delay; until then the remaining delay is reported, rounded up.
pub fn temperature_reached(
    current_c: f64,
    target_c: f64,
    uptime_seconds: u64,
    startup_delay: Duration,
    already_notified: bool,
    variance_c: f64,
) -> TemperatureCheck {
    let uptime_ms = u128::from(uptime_seconds) * 1000;
    let delay_ms = startup_delay.as_millis();

    if uptime_ms < delay_ms {
        let remaining_ms = delay_ms - uptime_ms;
        return TemperatureCheck {
            reached: false,
            startup_remaining_secs: remaining_ms.div_ceil(1000) as u64,
        };
    }

    TemperatureCheck {
        reached: !already_notified && temperature_in_range(current_c, target_c, variance_c),
        startup_remaining_secs: 0,
    }
}
