//! HTTP client abstraction for testability

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;

use crate::BrewwatchError;

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstraction over HTTP client for dependency injection
///
/// Implementations report transport failures that mean "the host cannot be
/// reached" as [`BrewwatchError::Unreachable`] and every other failure as
/// [`BrewwatchError::Http`].
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Send a GET request to the given URL
    async fn get(&self, url: &str) -> crate::Result<HttpResponse>;

    /// Send a POST request with a JSON body
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> crate::Result<HttpResponse>;

    /// Send a POST request with a form-encoded body and HTTP basic auth
    async fn post_form_with_basic_auth(
        &self,
        url: &str,
        username: &str,
        password: &str,
        params: &[(&str, &str)],
    ) -> crate::Result<HttpResponse>;
}

/// Production HTTP client using reqwest
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Build a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BrewwatchError::Http(format!("Building HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn into_response(
        method: &str,
        url: &str,
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> crate::Result<HttpResponse> {
        let response = result.map_err(|e| classify_transport_error(method, url, &e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(method, url, &e))?;

        tracing::debug!("{} {} -> {} ({} bytes)", method, url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> crate::Result<HttpResponse> {
        tracing::debug!("GET {}", url);
        let result = self.client.get(url).send().await;
        Self::into_response("GET", url, result).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> crate::Result<HttpResponse> {
        tracing::debug!("POST {}", url);
        let result = self.client.post(url).json(body).send().await;
        Self::into_response("POST", url, result).await
    }

    async fn post_form_with_basic_auth(
        &self,
        url: &str,
        username: &str,
        password: &str,
        params: &[(&str, &str)],
    ) -> crate::Result<HttpResponse> {
        tracing::debug!("POST {}", url);
        let result = self
            .client
            .post(url)
            .basic_auth(username, Some(password))
            .form(params)
            .send()
            .await;
        Self::into_response("POST", url, result).await
    }
}

/// Map a reqwest failure onto `Unreachable` or `Http`
fn classify_transport_error(method: &str, url: &str, error: &reqwest::Error) -> BrewwatchError {
    let message = format!("{} {} failed: {}", method, url, error);
    if error.is_connect() || error.is_timeout() || has_offline_source(error) {
        BrewwatchError::Unreachable(message)
    } else {
        BrewwatchError::Http(message)
    }
}

/// Walk the source chain looking for a cause that means the host is gone.
///
/// Only the causes are inspected; the top-level message embeds the URL.
fn has_offline_source(error: &reqwest::Error) -> bool {
    let mut source = error.source();
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if is_offline_io_kind(io.kind()) {
                return true;
            }
        }
        if is_offline_message(&err.to_string()) {
            return true;
        }
        source = err.source();
    }
    false
}

pub(crate) fn is_offline_io_kind(kind: std::io::ErrorKind) -> bool {
    use std::io::ErrorKind;
    matches!(
        kind,
        ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::TimedOut
            | ErrorKind::HostUnreachable
            | ErrorKind::NetworkUnreachable
    )
}

pub(crate) fn is_offline_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("timeout") || lower.contains("timed out")
}
