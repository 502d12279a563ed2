//! Configuration types for the brewwatch service
//!
//! Configuration comes either from a JSON file (`--config`) or from
//! environment variables. Every field has a default, so an empty file or an
//! empty environment yields a runnable (if silent) configuration.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub appliance: ApplianceConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub twilio: TwilioConfig,
    /// Verbose logging toggle; no behavioural effect
    #[serde(default)]
    pub debug: bool,
}

/// Where and how to reach the appliance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplianceConfig {
    #[serde(default = "default_status_url")]
    pub status_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ApplianceConfig {
    fn default() -> Self {
        Self {
            status_url: default_status_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ApplianceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Thresholds and cadences for the monitoring state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_temperature_variance")]
    pub temperature_variance_c: f64,
    #[serde(default = "default_online_polling_interval_ms")]
    pub online_polling_interval_ms: u64,
    #[serde(default = "default_offline_polling_interval_ms")]
    pub offline_polling_interval_ms: u64,
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,
    #[serde(default = "default_max_uptime_ms")]
    pub max_uptime_ms: u64,
    #[serde(default)]
    pub uptime_alert_enabled: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            temperature_variance_c: default_temperature_variance(),
            online_polling_interval_ms: default_online_polling_interval_ms(),
            offline_polling_interval_ms: default_offline_polling_interval_ms(),
            restart_delay_ms: default_restart_delay_ms(),
            startup_delay_ms: default_startup_delay_ms(),
            max_uptime_ms: default_max_uptime_ms(),
            uptime_alert_enabled: false,
        }
    }
}

impl MonitoringConfig {
    pub fn online_interval(&self) -> Duration {
        Duration::from_millis(self.online_polling_interval_ms)
    }

    pub fn offline_interval(&self) -> Duration {
        Duration::from_millis(self.offline_polling_interval_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    /// Uptime threshold in (possibly fractional) minutes
    pub fn max_uptime_minutes(&self) -> f64 {
        self.max_uptime_ms as f64 / 60_000.0
    }
}

/// Chat webhook channel settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// User id mentioned in every alert
    #[serde(default)]
    pub user_id: Option<String>,
}

/// SMS gateway channel settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwilioConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub account_sid: Option<String>,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub from_number: Option<String>,
    #[serde(default)]
    pub to_number: Option<String>,
}

fn default_status_url() -> String {
    "http://gaggiuino.local/api/system/status".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_temperature_variance() -> f64 {
    0.5
}

fn default_online_polling_interval_ms() -> u64 {
    5_000
}

fn default_offline_polling_interval_ms() -> u64 {
    30_000
}

fn default_restart_delay_ms() -> u64 {
    30 * 60 * 1000
}

fn default_startup_delay_ms() -> u64 {
    2 * 60 * 1000
}

fn default_max_uptime_ms() -> u64 {
    45 * 60 * 1000
}

impl Config {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Whether `DEBUG` is set in the process environment
    pub fn debug_from_env() -> bool {
        Self::debug_from_lookup(|key| std::env::var(key).ok())
    }

    /// Whether the lookup enables verbose logging; readable before logging is set up
    pub fn debug_from_lookup<F>(lookup: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        flag(&lookup, "DEBUG")
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Flags are enabled only by the literal value `true`. Numeric values
    /// that are missing, unparsable or zero fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let appliance = ApplianceConfig {
            status_url: text(&lookup, "COFFEE_MACHINE_API_URL").unwrap_or_else(default_status_url),
            request_timeout_ms: number(&lookup, "REQUEST_TIMEOUT_MS", default_request_timeout_ms()),
        };

        let monitoring = MonitoringConfig {
            temperature_variance_c: number(
                &lookup,
                "TEMPERATURE_VARIANCE",
                default_temperature_variance(),
            ),
            online_polling_interval_ms: number(
                &lookup,
                "ONLINE_POLLING_INTERVAL_MS",
                default_online_polling_interval_ms(),
            ),
            offline_polling_interval_ms: number(
                &lookup,
                "OFFLINE_POLLING_INTERVAL_MS",
                default_offline_polling_interval_ms(),
            ),
            restart_delay_ms: number(&lookup, "RESTART_DELAY_MS", default_restart_delay_ms()),
            startup_delay_ms: number(&lookup, "STARTUP_DELAY_MS", default_startup_delay_ms()),
            max_uptime_ms: number(&lookup, "MAX_UPTIME_MS", default_max_uptime_ms()),
            uptime_alert_enabled: flag(&lookup, "UPTIME_EXCEEDED_ENABLED"),
        };

        let discord = DiscordConfig {
            enabled: flag(&lookup, "DISCORD_ENABLED"),
            webhook_url: text(&lookup, "DISCORD_WEBHOOK_URL"),
            user_id: text(&lookup, "DISCORD_USER_ID"),
        };

        let twilio = TwilioConfig {
            enabled: flag(&lookup, "TWILIO_ENABLED"),
            account_sid: text(&lookup, "TWILIO_ACCOUNT_SID"),
            auth_token: text(&lookup, "TWILIO_AUTH_TOKEN"),
            from_number: text(&lookup, "TWILIO_PHONE_NUMBER"),
            to_number: text(&lookup, "YOUR_PHONE_NUMBER"),
        };

        Self {
            appliance,
            monitoring,
            discord,
            twilio,
            debug: Self::debug_from_lookup(&lookup),
        }
    }

    /// Reject values the monitor cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.appliance.status_url.trim().is_empty() {
            return Err(crate::BrewwatchError::Config(
                "status URL must not be empty".to_string(),
            ));
        }
        if self.appliance.request_timeout_ms == 0 {
            return Err(crate::BrewwatchError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        let monitoring = &self.monitoring;
        if monitoring.online_polling_interval_ms == 0 || monitoring.offline_polling_interval_ms == 0
        {
            return Err(crate::BrewwatchError::Config(
                "polling intervals must be greater than zero".to_string(),
            ));
        }
        if !monitoring.temperature_variance_c.is_finite() || monitoring.temperature_variance_c < 0.0
        {
            return Err(crate::BrewwatchError::Config(format!(
                "temperature variance must be a non-negative number, got {}",
                monitoring.temperature_variance_c
            )));
        }
        Ok(())
    }
}

fn text<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn flag<F>(lookup: &F, key: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).is_some_and(|value| value.trim() == "true")
}

fn number<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialEq + Default + Copy + std::fmt::Display,
{
    let Some(raw) = text(lookup, key) else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) if value != T::default() => value,
        Ok(_) => default,
        Err(_) => {
            tracing::warn!("Ignoring invalid value {:?} for {}, using {}", raw, key, default);
            default
        }
    }
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::BrewwatchError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
