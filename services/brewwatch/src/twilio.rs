//! Twilio SMS notification client

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::TwilioConfig;
use crate::io::HttpClient;
use crate::notifier::Notifier;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Twilio SMS sender
pub struct TwilioNotifier {
    account_sid: String,
    auth_token: String,
    from_number: String,
    to_number: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for TwilioNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioNotifier")
            .field("from_number", &self.from_number)
            .field("to_number", &self.to_number)
            .finish()
    }
}

impl TwilioNotifier {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
        to_number: impl Into<String>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
            to_number: to_number.into(),
            http,
        }
    }

    /// Build the channel if it is enabled and fully configured
    pub fn from_config(config: &TwilioConfig, http: Arc<dyn HttpClient>) -> Option<Self> {
        if !config.enabled {
            tracing::debug!("Twilio SMS notifications disabled");
            return None;
        }
        match (
            &config.account_sid,
            &config.auth_token,
            &config.from_number,
            &config.to_number,
        ) {
            (Some(sid), Some(token), Some(from), Some(to)) => {
                tracing::debug!("Created TwilioNotifier sending to {}", to);
                Some(Self::new(sid, token, from, to, http))
            }
            _ => {
                tracing::warn!("Twilio SMS notifications enabled but credentials or numbers are missing");
                None
            }
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", TWILIO_API_BASE, self.account_sid)
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    fn type_name(&self) -> &str {
        "twilio"
    }

    async fn notify(&self, message: &str) -> crate::Result<()> {
        let params = [
            ("To", self.to_number.as_str()),
            ("From", self.from_number.as_str()),
            ("Body", message),
        ];

        let response = self
            .http
            .post_form_with_basic_auth(
                &self.messages_url(),
                &self.account_sid,
                &self.auth_token,
                &params,
            )
            .await?;

        if !response.is_success() {
            return Err(crate::BrewwatchError::Notifier(format!(
                "Twilio API returned status {}: {}",
                response.status, response.body
            )));
        }

        tracing::debug!("SMS sent to {}", self.to_number);
        Ok(())
    }
}
