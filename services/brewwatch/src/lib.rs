//! Brewwatch - Espresso machine monitoring and notification service
//!
//! Polls the machine's status endpoint, adapts the poll rate to whether the
//! machine is reachable, and alerts once the boiler reaches its target
//! temperature or the machine has been on for too long.

pub mod conditions;
pub mod config;
pub mod discord;
pub mod error;
pub mod io;
pub mod monitor;
pub mod notifier;
pub mod probe;
pub mod state;
pub mod timer;
pub mod twilio;

pub use config::{load_config, Config};
pub use error::{BrewwatchError, Result};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::discord::DiscordNotifier;
use crate::io::{HttpClient, ReqwestHttpClient};
use crate::monitor::{Monitor, MonitorSettings};
use crate::notifier::{AlertDispatcher, DispatchReport, Notifier};
use crate::probe::HttpStatusProbe;
use crate::timer::TokioScheduler;
use crate::twilio::TwilioNotifier;

/// Upper bound for a single alert delivery
const ALERT_TIMEOUT: Duration = Duration::from_secs(30);

/// Log level after applying the `debug` toggle, which never lowers `TRACE`
pub fn effective_log_level(requested: tracing::Level, debug: bool) -> tracing::Level {
    if debug && requested != tracing::Level::TRACE {
        tracing::Level::DEBUG
    } else {
        requested
    }
}

/// Build the dispatcher from whichever channels are enabled and configured
pub fn build_dispatcher(config: &Config, http: Arc<dyn HttpClient>) -> AlertDispatcher {
    let mut notifiers: Vec<Arc<dyn Notifier>> = Vec::new();

    if let Some(discord) = DiscordNotifier::from_config(&config.discord, Arc::clone(&http)) {
        notifiers.push(Arc::new(discord));
    }
    if let Some(twilio) = TwilioNotifier::from_config(&config.twilio, http) {
        notifiers.push(Arc::new(twilio));
    }

    if notifiers.is_empty() {
        tracing::warn!("No alert channels enabled, alerts will only be logged");
    }
    AlertDispatcher::new(notifiers)
}

/// Send one alert through the configured channels
pub async fn send_test_alert(config: &Config, message: &str) -> Result<DispatchReport> {
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(ALERT_TIMEOUT)?);
    let dispatcher = build_dispatcher(config, http);
    tracing::info!(
        "Sending test alert through {} channel(s)",
        dispatcher.channel_count()
    );
    Ok(dispatcher.notify(message).await)
}

/// Run the brewwatch service with the given configuration
pub async fn run(config: Config) -> Result<()> {
    config.validate()?;

    let probe_http: Arc<dyn HttpClient> =
        Arc::new(ReqwestHttpClient::new(config.appliance.request_timeout())?);
    let alert_http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(ALERT_TIMEOUT)?);

    let probe = Arc::new(HttpStatusProbe::new(
        config.appliance.status_url.clone(),
        probe_http,
    ));
    let alerts = build_dispatcher(&config, alert_http);

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let scheduler = Arc::new(TokioScheduler::new(events_tx));
    let monitor = Monitor::new(
        MonitorSettings::from(&config.monitoring),
        probe,
        alerts,
        scheduler,
    );

    let cancel = CancellationToken::new();

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    tracing::info!(
        "Watching {} (online every {:?}, offline every {:?})",
        config.appliance.status_url,
        config.monitoring.online_interval(),
        config.monitoring.offline_interval()
    );

    // Run the monitor (blocks until cancelled)
    monitor.run(events_rx, cancel).await;
    tracing::info!("Brewwatch stopped");

    Ok(())
}
