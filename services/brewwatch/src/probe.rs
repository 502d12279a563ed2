//! Appliance status probe and telemetry parsing

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::io::HttpClient;
use crate::BrewwatchError;

/// Why a status fetch failed, classified once right after the call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The appliance could not be reached at all
    Offline(String),
    /// The appliance answered, but not with something usable
    Other(String),
}

impl ProbeFailure {
    pub fn is_offline(&self) -> bool {
        matches!(self, ProbeFailure::Offline(_))
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::Offline(msg) => write!(f, "offline: {}", msg),
            ProbeFailure::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<BrewwatchError> for ProbeFailure {
    fn from(error: BrewwatchError) -> Self {
        match error {
            BrewwatchError::Unreachable(msg) => ProbeFailure::Offline(msg),
            other => ProbeFailure::Other(other.to_string()),
        }
    }
}

/// Trait for fetching the appliance's status payload
#[async_trait]
pub trait StatusProbe: Send + Sync {
    /// Fetch the raw status payload once
    async fn fetch(&self) -> Result<Value, ProbeFailure>;
}

/// Status probe that GETs a JSON endpoint
pub struct HttpStatusProbe {
    url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for HttpStatusProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStatusProbe")
            .field("url", &self.url)
            .finish()
    }
}

impl HttpStatusProbe {
    pub fn new(url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }
}

#[async_trait]
impl StatusProbe for HttpStatusProbe {
    async fn fetch(&self) -> Result<Value, ProbeFailure> {
        let response = self.http.get(&self.url).await?;

        if !response.is_success() {
            return Err(ProbeFailure::Other(format!(
                "status endpoint returned {}: {}",
                response.status, response.body
            )));
        }

        serde_json::from_str(&response.body)
            .map_err(|e| ProbeFailure::Other(format!("status payload is not JSON: {}", e)))
    }
}

/// One reading of the appliance's operating values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    pub temperature_c: f64,
    pub target_temperature_c: f64,
    pub uptime_seconds: u64,
}

impl Telemetry {
    /// Extract telemetry from the first record of a status payload.
    ///
    /// Returns `Ok(None)` when the payload is not a non-empty array.
    pub fn from_payload(payload: &Value) -> crate::Result<Option<Self>> {
        let Some(record) = payload.as_array().and_then(|records| records.first()) else {
            return Ok(None);
        };

        let temperature_c = number_field(record, "temperature")?;
        let target_temperature_c = number_field(record, "targetTemperature")?;
        let uptime = number_field(record, "upTime")?;
        if uptime < 0.0 {
            return Err(BrewwatchError::Telemetry(format!(
                "upTime must not be negative, got {}",
                uptime
            )));
        }

        Ok(Some(Self {
            temperature_c,
            target_temperature_c,
            uptime_seconds: uptime.trunc() as u64,
        }))
    }
}

/// Read a field that may be a JSON number or a numeric string
fn number_field(record: &Value, name: &str) -> crate::Result<f64> {
    let value = record
        .get(name)
        .ok_or_else(|| BrewwatchError::Telemetry(format!("missing field '{}'", name)))?;

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|n| n.is_finite()).ok_or_else(|| {
        BrewwatchError::Telemetry(format!("field '{}' is not numeric: {}", name, value))
    })
}
