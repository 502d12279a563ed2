//! Alert channels and the dispatcher that fans out to them

use std::sync::Arc;

use async_trait::async_trait;

/// Trait for sending an alert through one channel
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Get the channel name (e.g. "discord")
    fn type_name(&self) -> &str;

    /// Send a plain-text alert
    async fn notify(&self, message: &str) -> crate::Result<()>;
}

/// Per-dispatch outcome, for logging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Sends every alert through all configured channels at once
#[derive(Debug, Clone, Default)]
pub struct AlertDispatcher {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl AlertDispatcher {
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    pub fn channel_count(&self) -> usize {
        self.notifiers.len()
    }

    /// Deliver `message` on every channel concurrently.
    ///
    /// Failures are logged per channel and never returned; one failing
    /// channel does not stop the others.
    pub async fn notify(&self, message: &str) -> DispatchReport {
        if self.notifiers.is_empty() {
            tracing::debug!("No alert channels configured, dropping: {}", message);
            return DispatchReport::default();
        }

        let sends = self.notifiers.iter().map(|notifier| async move {
            let result = notifier.notify(message).await;
            (notifier.type_name(), result)
        });

        let mut report = DispatchReport::default();
        for (channel, result) in futures::future::join_all(sends).await {
            match result {
                Ok(()) => {
                    tracing::info!("Alert sent via {}: \"{}\"", channel, message);
                    report.delivered += 1;
                }
                Err(e) => {
                    tracing::warn!("Alert via {} failed: {}", channel, e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}
