//! Error types for the brewwatch service

/// Errors that can occur in the brewwatch service
#[derive(Debug, thiserror::Error)]
pub enum BrewwatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure that means the appliance cannot be reached
    /// (refused, DNS, timeout, reset, host unreachable).
    #[error("Appliance unreachable: {0}")]
    Unreachable(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid telemetry: {0}")]
    Telemetry(String),

    #[error("Notifier error: {0}")]
    Notifier(String),
}

/// Result type alias for brewwatch operations
pub type Result<T> = std::result::Result<T, BrewwatchError>;
