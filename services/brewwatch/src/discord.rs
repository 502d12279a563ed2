//! Discord webhook notification client

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::DiscordConfig;
use crate::io::HttpClient;
use crate::notifier::Notifier;

const BOT_USERNAME: &str = "Coffee Machine Bot";
const BOT_AVATAR_URL: &str = "https://cdn-icons-png.flaticon.com/512/3137/3137064.png";

/// Webhook payload
#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    content: String,
    username: &'a str,
    avatar_url: &'a str,
}

/// Discord webhook alert sender
pub struct DiscordNotifier {
    webhook_url: String,
    user_id: Option<String>,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for DiscordNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordNotifier")
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl DiscordNotifier {
    pub fn new(
        webhook_url: impl Into<String>,
        user_id: Option<String>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            user_id,
            http,
        }
    }

    /// Build the channel if it is enabled and has a webhook URL
    pub fn from_config(config: &DiscordConfig, http: Arc<dyn HttpClient>) -> Option<Self> {
        if !config.enabled {
            tracing::debug!("Discord notifications disabled");
            return None;
        }
        let Some(webhook_url) = &config.webhook_url else {
            tracing::warn!("Discord notifications enabled but no webhook URL configured");
            return None;
        };
        tracing::debug!("Created DiscordNotifier");
        Some(Self::new(webhook_url.clone(), config.user_id.clone(), http))
    }

    fn content(&self, message: &str) -> String {
        match &self.user_id {
            Some(user_id) => format!("☕ **Coffee Machine Alert** ☕\n<@{}> {}", user_id, message),
            None => format!("☕ **Coffee Machine Alert** ☕\n{}", message),
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn type_name(&self) -> &str {
        "discord"
    }

    async fn notify(&self, message: &str) -> crate::Result<()> {
        let payload = serde_json::to_value(WebhookMessage {
            content: self.content(message),
            username: BOT_USERNAME,
            avatar_url: BOT_AVATAR_URL,
        })?;

        let response = self.http.post_json(&self.webhook_url, &payload).await?;

        if !response.is_success() {
            return Err(crate::BrewwatchError::Notifier(format!(
                "Discord webhook returned status {}: {}",
                response.status, response.body
            )));
        }

        tracing::debug!("Discord notification sent");
        Ok(())
    }
}
