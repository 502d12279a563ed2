//! Cancellable timers that feed events into the monitor's queue
//!
//! Timers never touch monitor state. They only post [`TimerEvent`]s, tagged
//! with the id of the timer that produced them, into an mpsc queue that the
//! monitor drains one event at a time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Identifies one scheduled timer
pub type TimerId = u64;

/// What a timer asks the monitor to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Run one probe tick
    Poll,
    /// Start a fresh monitoring session
    Restart,
}

/// Event delivered to the monitor when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub timer: TimerId,
    pub kind: TimerKind,
}

/// Handle to a scheduled timer
#[derive(Debug, Clone)]
pub struct TimerHandle {
    id: TimerId,
    period: Duration,
    cancel: CancellationToken,
}

impl TimerHandle {
    pub fn new(id: TimerId, period: Duration, cancel: CancellationToken) -> Self {
        Self { id, period, cancel }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Repeat interval, or the delay for a one-shot timer
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Schedules repeating and one-shot timers
pub trait Scheduler: Send + Sync {
    /// Fire `kind` every `period`, first after one full period
    fn every(&self, period: Duration, kind: TimerKind) -> TimerHandle;

    /// Fire `kind` once after `delay`
    fn once(&self, delay: Duration, kind: TimerKind) -> TimerHandle;
}

/// Scheduler backed by tokio tasks
#[derive(Debug)]
pub struct TokioScheduler {
    events: mpsc::UnboundedSender<TimerEvent>,
    next_id: AtomicU64,
}

impl TokioScheduler {
    pub fn new(events: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            events,
            next_id: AtomicU64::new(1),
        }
    }

    fn handle(&self, period: Duration) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        TimerHandle::new(id, period, CancellationToken::new())
    }
}

impl Scheduler for TokioScheduler {
    fn every(&self, period: Duration, kind: TimerKind) -> TimerHandle {
        let handle = self.handle(period);
        let cancel = handle.cancel.clone();
        let events = self.events.clone();
        let event = TimerEvent {
            timer: handle.id,
            kind,
        };

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if events.send(event).is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::trace!("Timer {} stopped", event.timer);
        });

        handle
    }

    fn once(&self, delay: Duration, kind: TimerKind) -> TimerHandle {
        let handle = self.handle(delay);
        let cancel = handle.cancel.clone();
        let events = self.events.clone();
        let event = TimerEvent {
            timer: handle.id,
            kind,
        };

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = events.send(event);
                }
            }
        });

        handle
    }
}
