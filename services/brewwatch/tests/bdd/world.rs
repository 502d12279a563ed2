//! BDD test world for brewwatch service

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cucumber::World;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use brewwatch::conditions::TemperatureCheck;
use brewwatch::monitor::{Monitor, MonitorSettings};
use brewwatch::notifier::{AlertDispatcher, Notifier};
use brewwatch::probe::{ProbeFailure, StatusProbe};
use brewwatch::state::PollIntervals;
use brewwatch::timer::{Scheduler, TimerEvent, TimerHandle, TimerKind};

/// Probe that answers every fetch with whatever the scenario last set
#[derive(Debug)]
pub struct StubProbe {
    response: Mutex<Result<Value, ProbeFailure>>,
    calls: AtomicUsize,
}

impl Default for StubProbe {
    fn default() -> Self {
        Self {
            response: Mutex::new(Err(unreachable())),
            calls: AtomicUsize::new(0),
        }
    }
}

impl StubProbe {
    pub fn respond_with(&self, response: Result<Value, ProbeFailure>) {
        *self.response.lock().unwrap() = response;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StatusProbe for StubProbe {
    async fn fetch(&self) -> Result<Value, ProbeFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.lock().unwrap().clone()
    }
}

/// Scheduler that records timers instead of running them
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    next_id: AtomicU64,
    timers: Mutex<Vec<(TimerKind, TimerHandle)>>,
}

impl RecordingScheduler {
    fn record(&self, period: Duration, kind: TimerKind) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let handle = TimerHandle::new(id, period, CancellationToken::new());
        self.timers.lock().unwrap().push((kind, handle.clone()));
        handle
    }

    pub fn active(&self, kind: TimerKind) -> Vec<TimerHandle> {
        self.timers
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, h)| *k == kind && !h.is_cancelled())
            .map(|(_, h)| h.clone())
            .collect()
    }
}

impl Scheduler for RecordingScheduler {
    fn every(&self, period: Duration, kind: TimerKind) -> TimerHandle {
        self.record(period, kind)
    }

    fn once(&self, delay: Duration, kind: TimerKind) -> TimerHandle {
        self.record(delay, kind)
    }
}

/// Notifier that records every message it is asked to send
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: RwLock<Vec<String>>,
}

impl RecordingNotifier {
    pub async fn messages(&self) -> Vec<String> {
        self.messages.read().await.clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    fn type_name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, message: &str) -> brewwatch::Result<()> {
        self.messages.write().await.push(message.to_string());
        Ok(())
    }
}

pub fn reading(temperature: f64, target: f64, uptime_seconds: u64) -> Result<Value, ProbeFailure> {
    Ok(json!([{
        "temperature": temperature,
        "targetTemperature": target,
        "upTime": uptime_seconds,
    }]))
}

pub fn unreachable() -> ProbeFailure {
    ProbeFailure::Offline("connection refused".to_string())
}

pub fn default_settings() -> MonitorSettings {
    MonitorSettings {
        intervals: PollIntervals {
            online: Duration::from_secs(5),
            offline: Duration::from_secs(30),
        },
        restart_delay: Duration::from_secs(30 * 60),
        startup_delay: Duration::from_millis(120_000),
        temperature_variance_c: 0.5,
        max_uptime_minutes: 45.0,
        uptime_alert_enabled: true,
    }
}

#[derive(Debug, Default, World)]
pub struct BrewwatchWorld {
    // Condition testing
    pub startup_delay_ms: Option<u64>,
    pub variance_c: Option<f64>,
    pub temperature_check: Option<TemperatureCheck>,
    pub uptime_alert_fires: Option<bool>,

    // Monitor testing
    pub settings: Option<MonitorSettings>,
    pub probe: Arc<StubProbe>,
    pub scheduler: Arc<RecordingScheduler>,
    pub notifier: Arc<RecordingNotifier>,
    pub monitor: Option<Monitor>,
}

impl BrewwatchWorld {
    pub fn settings_mut(&mut self) -> &mut MonitorSettings {
        self.settings.get_or_insert_with(default_settings)
    }

    pub fn build_monitor(&mut self) -> &mut Monitor {
        let settings = self.settings.clone().unwrap_or_else(default_settings);
        let alerts = AlertDispatcher::new(vec![self.notifier.clone() as Arc<dyn Notifier>]);
        let monitor = Monitor::new(
            settings,
            self.probe.clone(),
            alerts,
            self.scheduler.clone(),
        );
        self.monitor.insert(monitor)
    }

    pub fn monitor(&mut self) -> &mut Monitor {
        self.monitor.as_mut().expect("monitor not started")
    }

    /// Deliver a tick from the currently armed poll timer
    pub async fn fire_poll_timer(&mut self) {
        let monitor = self.monitor();
        let timer = monitor
            .state()
            .poll_timer()
            .expect("no poll timer armed")
            .id();
        monitor
            .handle_event(TimerEvent {
                timer,
                kind: TimerKind::Poll,
            })
            .await;
    }

    pub async fn fire_restart_timer(&mut self) {
        let monitor = self.monitor();
        let timer = monitor
            .restart_timer()
            .expect("no restart timer scheduled")
            .id();
        monitor
            .handle_event(TimerEvent {
                timer,
                kind: TimerKind::Restart,
            })
            .await;
    }

    pub fn poll_period(&self) -> Duration {
        let active = self.scheduler.active(TimerKind::Poll);
        assert_eq!(active.len(), 1, "expected exactly one active poll timer");
        active[0].period()
    }
}
