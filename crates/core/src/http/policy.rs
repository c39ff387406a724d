//! Per-provider response classification.
//!
//! Providers disagree on how they report failure: some only use the HTTP
//! status, some return `200 OK` with an error field in the body, some do
//! both. Each client owns one [`ResponsePolicy`] describing its provider's
//! rules; the executor never guesses.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ApiError;

/// Result of classifying a raw HTTP response.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Usable JSON body.
    Success(Value),
    /// Non-2xx status; carries the raw body text.
    Transport { status: u16, body: String },
    /// 2xx status whose body carries a provider error indicator.
    Provider { message: String },
    /// 2xx status whose body says the call quota is exhausted.
    RateLimited { message: String },
    /// 2xx status whose body is not valid JSON.
    Undecodable { message: String },
}

impl Outcome {
    /// Convert into a result, tagging errors with the provider id.
    pub fn into_result(self, provider: &str) -> Result<Value, ApiError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Transport { status, body } => Err(ApiError::Transport {
                provider: provider.to_string(),
                status,
                body,
            }),
            Outcome::Provider { message } => Err(ApiError::Provider {
                provider: provider.to_string(),
                message,
            }),
            Outcome::RateLimited { message } => Err(ApiError::RateLimited {
                provider: provider.to_string(),
                message,
            }),
            Outcome::Undecodable { message } => Err(ApiError::Decode {
                provider: provider.to_string(),
                message,
            }),
        }
    }
}

/// A provider's rules for telling success from failure.
pub trait ResponsePolicy: Send + Sync {
    /// Provider identifier used in logs and errors (e.g. "ALPHA_VANTAGE").
    fn provider(&self) -> &'static str;

    /// Classify a response from its status and raw body.
    fn classify_response(&self, status: StatusCode, body: &str) -> Outcome;
}

/// Shared first step of every policy: reject non-2xx statuses, then decode JSON.
pub fn classify_status(status: StatusCode, body: &str) -> Outcome {
    if !status.is_success() {
        return Outcome::Transport {
            status: status.as_u16(),
            body: body.to_string(),
        };
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => Outcome::Success(value),
        Err(e) => Outcome::Undecodable {
            message: e.to_string(),
        },
    }
}

/// Deserialize a successful body into a typed model.
pub fn decode_value<T: DeserializeOwned>(provider: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

/// Policy for providers that only signal failure through the HTTP status.
#[derive(Clone, Copy, Debug)]
pub struct StatusOnly {
    provider: &'static str,
}

impl StatusOnly {
    pub const fn new(provider: &'static str) -> Self {
        Self { provider }
    }
}

impl ResponsePolicy for StatusOnly {
    fn provider(&self) -> &'static str {
        self.provider
    }

    fn classify_response(&self, status: StatusCode, body: &str) -> Outcome {
        classify_status(status, body)
    }
}
