//! Single-call request executor.
//!
//! Builds the URL against a fixed base endpoint, merges in the static
//! credential, sends the request, and hands status and body to the
//! provider's [`ResponsePolicy`]. Transport failures are retried a bounded
//! number of times; anything the provider said on purpose is not.

use std::sync::Arc;

use log::{debug, warn};
use reqwest::{Client, Response, Url};
use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::config::{ClientConfig, RetryPolicy};
use crate::errors::{ApiError, Result, RetryClass};

use super::policy::ResponsePolicy;
use super::request::ApiRequest;

/// How the static credential travels with each request.
#[derive(Clone)]
pub enum Credential {
    /// No credential.
    None,
    /// Secret already embedded in the base URL (e.g. `/bot<token>`). Only
    /// used for log redaction.
    Embedded(String),
    /// Query-string parameter, e.g. `apikey=...`.
    QueryParam { name: &'static str, value: String },
    /// `Authorization: Bearer ...` header.
    Bearer(String),
}

impl Credential {
    fn secret(&self) -> Option<&str> {
        match self {
            Credential::None => None,
            Credential::Embedded(secret) => Some(secret),
            Credential::QueryParam { value, .. } => Some(value),
            Credential::Bearer(token) => Some(token),
        }
    }
}

/// Executes [`ApiRequest`]s for one provider.
pub struct RequestExecutor<P> {
    client: Client,
    base_url: String,
    credential: Credential,
    policy: P,
    config: ClientConfig,
    clock: Arc<dyn Clock>,
}

impl<P: ResponsePolicy> RequestExecutor<P> {
    pub fn new(base_url: impl Into<String>, credential: Credential, policy: P) -> Self {
        Self::with_config(base_url, credential, policy, ClientConfig::default())
    }

    pub fn with_config(
        base_url: impl Into<String>,
        credential: Credential,
        policy: P,
        config: ClientConfig,
    ) -> Self {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: base_url.into(),
            credential,
            policy,
            config,
            clock: Arc::new(SystemClock::new()),
        }
    }

    /// Replace the clock used for retry backoff.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Point the executor at another endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    fn retry(&self) -> &RetryPolicy {
        &self.config.retry
    }

    /// Send the request and return the decoded JSON body.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Value> {
        let max_attempts = self.retry().max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.execute_once(request).await {
                Err(err) if err.retry_class() == RetryClass::WithBackoff && attempt < max_attempts => {
                    let delay = self.retry().backoff(attempt);
                    warn!(
                        "{} request to {} failed (attempt {}/{}): {}; retrying in {:?}",
                        self.policy.provider(),
                        request.path,
                        attempt,
                        max_attempts,
                        err,
                        delay
                    );
                    self.clock.sleep(delay).await?;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn execute_once(&self, request: &ApiRequest) -> Result<Value> {
        let response = self.dispatch(request, true).await?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        self.policy
            .classify_response(status, &body)
            .into_result(self.policy.provider())
    }

    /// Send the request and return the live response for incremental reading.
    ///
    /// No overall timeout applies, since streams stay open indefinitely.
    /// Non-2xx statuses are still rejected.
    pub async fn open_stream(&self, request: &ApiRequest) -> Result<Response> {
        let response = self.dispatch(request, false).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Transport {
            provider: self.policy.provider().to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn dispatch(&self, request: &ApiRequest, bounded: bool) -> Result<Response> {
        let url = self.build_url(request)?;
        debug!(
            "{} request: {} {}",
            self.policy.provider(),
            request.method,
            self.redact(url.as_str())
        );

        let mut builder = self.client.request(request.method.clone(), url);
        if bounded {
            builder = builder.timeout(request.timeout.unwrap_or(self.config.timeout));
        }
        if let Credential::Bearer(token) = &self.credential {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(|e| self.map_send_error(e))
    }

    /// Full URL for a request, credential included.
    pub fn build_url(&self, request: &ApiRequest) -> Result<Url> {
        let mut params: Vec<(&str, &str)> = request
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if let Credential::QueryParam { name, value } = &self.credential {
            params.push((*name, value.as_str()));
        }

        let raw = format!("{}{}", self.base_url.trim_end_matches('/'), request.path);
        let url = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, &params)
        };

        url.map_err(|e| ApiError::InvalidRequest(format!("Failed to build URL {}: {}", raw, e)))
    }

    fn map_send_error(&self, e: reqwest::Error) -> ApiError {
        let provider = self.policy.provider().to_string();
        if e.is_timeout() {
            ApiError::Timeout { provider }
        } else if e.is_decode() {
            ApiError::Decode {
                provider,
                message: e.to_string(),
            }
        } else {
            ApiError::Network {
                provider,
                message: self.redact(&e.to_string()),
            }
        }
    }

    /// Mask the credential wherever it appears in `text`.
    pub fn redact(&self, text: &str) -> String {
        match self.credential.secret() {
            Some(secret) if !secret.is_empty() => text.replace(secret, "***"),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusOnly;

    fn executor(credential: Credential) -> RequestExecutor<StatusOnly> {
        RequestExecutor::new(
            "https://example.com/api/",
            credential,
            StatusOnly::new("TEST"),
        )
    }

    #[test]
    fn test_build_url_merges_query_credential() {
        let executor = executor(Credential::QueryParam {
            name: "apikey",
            value: "secret".to_string(),
        });
        let request = ApiRequest::get("/query")
            .param("function", "OVERVIEW")
            .param("symbol", "IBM");

        let url = executor.build_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/api/query?function=OVERVIEW&symbol=IBM&apikey=secret"
        );
    }

    #[test]
    fn test_build_url_without_params() {
        let executor = executor(Credential::Bearer("token".to_string()));
        let url = executor.build_url(&ApiRequest::get("/users/me")).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/users/me");
    }

    #[test]
    fn test_build_url_encodes_values() {
        let executor = executor(Credential::None);
        let request = ApiRequest::get("/users/by").param("user.fields", "created_at,public_metrics");
        let url = executor.build_url(&request).unwrap();
        assert_eq!(
            url.query(),
            Some("user.fields=created_at%2Cpublic_metrics")
        );
    }

    #[test]
    fn test_build_url_rejects_garbage_base() {
        let executor = executor(Credential::None).with_base_url("not a url");
        let err = executor.build_url(&ApiRequest::get("")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[test]
    fn test_embedded_secret_is_redacted_but_not_added() {
        let executor = RequestExecutor::new(
            "https://api.telegram.org/bot123:abc",
            Credential::Embedded("123:abc".to_string()),
            StatusOnly::new("TEST"),
        );
        let url = executor.build_url(&ApiRequest::get("/getMe")).unwrap();
        assert_eq!(url.as_str(), "https://api.telegram.org/bot123:abc/getMe");
        assert_eq!(
            executor.redact(url.as_str()),
            "https://api.telegram.org/bot***/getMe"
        );
    }

    #[test]
    fn test_redact_hides_secret() {
        let executor = executor(Credential::QueryParam {
            name: "apikey",
            value: "secret".to_string(),
        });
        assert_eq!(
            executor.redact("https://example.com/api/query?apikey=secret"),
            "https://example.com/api/query?apikey=***"
        );
    }
}
