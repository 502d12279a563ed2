//! Mutable monitoring state and its transitions

use std::time::Duration;

use tokio::time::Instant;

use crate::timer::{Scheduler, TimerHandle, TimerId, TimerKind};

/// Poll cadences for the two reachability states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub online: Duration,
    pub offline: Duration,
}

/// Everything the monitor remembers between ticks.
///
/// Owned by exactly one [`crate::monitor::Monitor`]; every method is a
/// complete transition.
#[derive(Debug)]
pub struct MonitorState {
    intervals: PollIntervals,
    online: bool,
    temperature_notified: bool,
    uptime_notified: bool,
    uptime_started_at: Option<Instant>,
    poll_timer: Option<TimerHandle>,
}

impl MonitorState {
    pub fn new(intervals: PollIntervals) -> Self {
        Self {
            intervals,
            online: false,
            temperature_notified: false,
            uptime_notified: false,
            uptime_started_at: None,
            poll_timer: None,
        }
    }

    /// Offline to online: stamp the uptime start and poll at the online rate.
    ///
    /// The temperature flag is left alone.
    pub fn enter_online(&mut self, scheduler: &dyn Scheduler, now: Instant) {
        tracing::info!("Coffee machine is now online");
        self.online = true;
        self.uptime_started_at = Some(now);
        self.uptime_notified = false;
        self.rearm(scheduler, self.intervals.online);
    }

    /// Online to offline: forget the uptime start and poll at the slow rate
    pub fn enter_offline(&mut self, scheduler: &dyn Scheduler) {
        tracing::info!("Coffee machine went offline, switching to slower polling");
        self.online = false;
        self.uptime_started_at = None;
        self.uptime_notified = false;
        self.rearm(scheduler, self.intervals.offline);
    }

    /// Replace the poll timer with a new one firing every `interval`
    pub fn rearm(&mut self, scheduler: &dyn Scheduler, interval: Duration) {
        self.disarm();
        self.poll_timer = Some(scheduler.every(interval, TimerKind::Poll));
        tracing::debug!("Polling interval set to {:?}", interval);
    }

    /// Cancel the poll timer, if any
    pub fn disarm(&mut self) {
        if let Some(timer) = self.poll_timer.take() {
            timer.cancel();
        }
    }

    /// Back to the initial state of a fresh session
    pub fn reset_session(&mut self) {
        self.disarm();
        self.online = false;
        self.temperature_notified = false;
        self.uptime_notified = false;
        self.uptime_started_at = None;
    }

    /// Interval matching the current reachability
    pub fn current_interval(&self) -> Duration {
        if self.online {
            self.intervals.online
        } else {
            self.intervals.offline
        }
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn temperature_notified(&self) -> bool {
        self.temperature_notified
    }

    pub fn uptime_notified(&self) -> bool {
        self.uptime_notified
    }

    pub fn mark_temperature_notified(&mut self) {
        self.temperature_notified = true;
    }

    pub fn mark_uptime_notified(&mut self) {
        self.uptime_notified = true;
    }

    pub fn uptime_started_at(&self) -> Option<Instant> {
        self.uptime_started_at
    }

    pub fn poll_timer(&self) -> Option<&TimerHandle> {
        self.poll_timer.as_ref()
    }

    pub fn has_active_timer(&self) -> bool {
        self.poll_timer.is_some()
    }

    /// True if `id` belongs to the armed poll timer
    pub fn is_current_timer(&self, id: TimerId) -> bool {
        self.poll_timer.as_ref().is_some_and(|t| t.id() == id)
    }
}
