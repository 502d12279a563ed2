//! Monitor: the per-tick state machine and the session lifecycle

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::conditions;
use crate::config::MonitoringConfig;
use crate::notifier::AlertDispatcher;
use crate::probe::{ProbeFailure, StatusProbe, Telemetry};
use crate::state::{MonitorState, PollIntervals};
use crate::timer::{Scheduler, TimerEvent, TimerHandle, TimerKind};

/// Alert sent once the boiler is within the target band
pub const TEMPERATURE_ALERT: &str = "Hey! Your machine is at the target temp.";

/// Alert sent once the machine has been on for too long
pub fn uptime_alert(uptime_minutes: u64) -> String {
    format!(
        "⚠️ Your coffee machine has been running for {} minutes. Consider turning it off to save energy.",
        uptime_minutes
    )
}

/// Where the monitor is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    OfflinePolling,
    OnlinePolling,
    PausedAfterCompletion,
}

/// Thresholds and cadences the monitor runs with
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    pub intervals: PollIntervals,
    pub restart_delay: Duration,
    pub startup_delay: Duration,
    pub temperature_variance_c: f64,
    pub max_uptime_minutes: f64,
    pub uptime_alert_enabled: bool,
}

impl From<&MonitoringConfig> for MonitorSettings {
    fn from(config: &MonitoringConfig) -> Self {
        Self {
            intervals: PollIntervals {
                online: config.online_interval(),
                offline: config.offline_interval(),
            },
            restart_delay: config.restart_delay(),
            startup_delay: config.startup_delay(),
            temperature_variance_c: config.temperature_variance_c,
            max_uptime_minutes: config.max_uptime_minutes(),
            uptime_alert_enabled: config.uptime_alert_enabled,
        }
    }
}

enum TickOutcome {
    Continue,
    CycleComplete,
}

/// Watches one appliance and alerts on its operating conditions
pub struct Monitor {
    settings: MonitorSettings,
    probe: Arc<dyn StatusProbe>,
    alerts: AlertDispatcher,
    scheduler: Arc<dyn Scheduler>,
    state: MonitorState,
    phase: Phase,
    restart_timer: Option<TimerHandle>,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("phase", &self.phase)
            .field("state", &self.state)
            .finish()
    }
}

impl Monitor {
    pub fn new(
        settings: MonitorSettings,
        probe: Arc<dyn StatusProbe>,
        alerts: AlertDispatcher,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let state = MonitorState::new(settings.intervals);
        Self {
            settings,
            probe,
            alerts,
            scheduler,
            state,
            phase: Phase::OfflinePolling,
            restart_timer: None,
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Pending restart after a completed cycle, if any
    pub fn restart_timer(&self) -> Option<&TimerHandle> {
        self.restart_timer.as_ref()
    }

    /// Begin a fresh session: assume offline, arm slow polling, probe once
    pub async fn start(&mut self) {
        tracing::info!("Starting coffee machine monitoring");
        tracing::debug!(
            "Initial polling interval: {:?} (machine assumed offline)",
            self.settings.intervals.offline
        );

        self.state.reset_session();
        self.phase = Phase::OfflinePolling;
        self.state
            .rearm(self.scheduler.as_ref(), self.settings.intervals.offline);

        self.poll().await;
    }

    /// React to one timer firing
    pub async fn handle_event(&mut self, event: TimerEvent) {
        match event.kind {
            TimerKind::Poll => {
                if self.state.is_current_timer(event.timer) {
                    self.poll().await;
                } else {
                    tracing::trace!("Dropping tick from cancelled timer {}", event.timer);
                }
            }
            TimerKind::Restart => {
                let expected = self
                    .restart_timer
                    .as_ref()
                    .is_some_and(|t| t.id() == event.timer);
                if expected {
                    self.restart_timer = None;
                    tracing::info!(
                        "{:?} have passed, restarting monitoring",
                        self.settings.restart_delay
                    );
                    self.start().await;
                }
            }
        }
    }

    /// Run one probe tick. Errors stop here; the next tick tries again.
    pub async fn poll(&mut self) {
        if self.phase == Phase::PausedAfterCompletion {
            tracing::debug!("Monitoring paused, skipping poll");
            return;
        }

        match self.check_status().await {
            Ok(TickOutcome::Continue) => {}
            Ok(TickOutcome::CycleComplete) => self.complete_cycle(),
            Err(e) => {
                tracing::error!("Unexpected error while checking coffee machine status: {}", e)
            }
        }
    }

    /// Drive the monitor from `events` until `cancel` fires
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<TimerEvent>,
        cancel: CancellationToken,
    ) {
        self.start().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Monitor cancelled");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
            }
        }

        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.state.disarm();
        if let Some(restart) = self.restart_timer.take() {
            restart.cancel();
        }
    }

    async fn check_status(&mut self) -> crate::Result<TickOutcome> {
        let payload = match self.probe.fetch().await {
            Ok(payload) => payload,
            Err(failure) => {
                self.handle_probe_failure(failure);
                return Ok(TickOutcome::Continue);
            }
        };

        if !self.state.is_online() {
            self.state
                .enter_online(self.scheduler.as_ref(), Instant::now());
            self.phase = Phase::OnlinePolling;
        }

        let Some(telemetry) = Telemetry::from_payload(&payload)? else {
            tracing::debug!("Status payload carried no telemetry");
            return Ok(TickOutcome::Continue);
        };

        self.evaluate(telemetry).await;

        if self.cycle_complete() {
            Ok(TickOutcome::CycleComplete)
        } else {
            Ok(TickOutcome::Continue)
        }
    }

    fn handle_probe_failure(&mut self, failure: ProbeFailure) {
        match failure {
            ProbeFailure::Offline(reason) => {
                if self.state.is_online() {
                    self.state.enter_offline(self.scheduler.as_ref());
                    self.phase = Phase::OfflinePolling;
                } else {
                    if !self.state.has_active_timer() {
                        self.state
                            .rearm(self.scheduler.as_ref(), self.settings.intervals.offline);
                    }
                    tracing::debug!("Coffee machine API is currently offline ({}), retrying", reason);
                }
            }
            ProbeFailure::Other(reason) => {
                tracing::error!("Error fetching coffee machine status: {}", reason);
            }
        }
    }

    /// Uptime first, then temperature, on one snapshot
    async fn evaluate(&mut self, telemetry: Telemetry) {
        let settings = &self.settings;
        let minutes = conditions::uptime_minutes(telemetry.uptime_seconds);

        if conditions::uptime_exceeded(
            minutes,
            self.state.uptime_notified(),
            settings.uptime_alert_enabled,
            settings.max_uptime_minutes,
        ) {
            tracing::info!(
                "Machine has been running for {} minutes (max: {} minutes)",
                minutes,
                settings.max_uptime_minutes
            );
            self.alerts.notify(&uptime_alert(minutes)).await;
            self.state.mark_uptime_notified();
        }

        tracing::debug!(
            "Current Temp: {}°C, Target Temp: {}°C, Uptime: {} minutes ({} seconds)",
            telemetry.temperature_c,
            telemetry.target_temperature_c,
            minutes,
            telemetry.uptime_seconds
        );

        let check = conditions::temperature_reached(
            telemetry.temperature_c,
            telemetry.target_temperature_c,
            telemetry.uptime_seconds,
            self.settings.startup_delay,
            self.state.temperature_notified(),
            self.settings.temperature_variance_c,
        );

        if check.startup_remaining_secs > 0 {
            tracing::debug!(
                "Startup delay active: {} seconds remaining before temperature monitoring begins",
                check.startup_remaining_secs
            );
        } else if check.reached {
            tracing::info!("Coffee machine is within target temperature range");
            self.alerts.notify(TEMPERATURE_ALERT).await;
            self.state.mark_temperature_notified();
        }
    }

    /// A disabled uptime alert counts as done
    fn cycle_complete(&self) -> bool {
        let uptime_done = self.state.uptime_notified() || !self.settings.uptime_alert_enabled;
        let temperature_done = self.state.temperature_notified();

        if uptime_done && !temperature_done {
            tracing::debug!("Uptime alert handled, still monitoring temperature");
        } else if temperature_done && !uptime_done {
            tracing::debug!("Temperature alert sent, still monitoring uptime");
        }

        temperature_done && uptime_done
    }

    fn complete_cycle(&mut self) {
        self.state.disarm();
        self.phase = Phase::PausedAfterCompletion;
        tracing::info!(
            "Monitoring complete, restarting in {:?}",
            self.settings.restart_delay
        );

        let restart = self
            .scheduler
            .once(self.settings.restart_delay, TimerKind::Restart);
        if let Some(previous) = self.restart_timer.replace(restart) {
            previous.cancel();
        }
    }
}
