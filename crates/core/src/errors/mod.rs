//! Error types and retry classification shared by every dipzy client.
//!
//! This module provides:
//! - [`ApiError`]: The error enum for request execution, batching and shaping
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Convenience alias used across the dipzy crates.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur while talking to a provider or shaping its data.
///
/// Transport failures and provider-semantic failures are kept apart: the
/// former carry the HTTP status and raw body, the latter carry the message the
/// provider put inside an otherwise successful response.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The provider answered with a non-2xx status.
    #[error("Request returned an error: {provider} {status} {body}")]
    Transport {
        /// The provider that returned the status
        provider: String,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The provider answered successfully but the body carries an error indicator.
    #[error("Provider error: {provider} - {message}")]
    Provider {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider reported, inside the body, that the call quota is exhausted.
    #[error("Rate limited: {provider} - {message}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
        /// The notice returned by the provider
        message: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("Network error: {provider} - {message}")]
    Network {
        /// The provider being contacted
        provider: String,
        /// Underlying transport error
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("Failed to decode response from {provider}: {message}")]
    Decode {
        /// The provider that sent the body
        provider: String,
        /// Description of the decode failure
        message: String,
    },

    /// A raw response could not be turned into a table.
    #[error("Failed to shape response: {0}")]
    Shape(String),

    /// The request could not be built (bad URL, bad argument).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A credential needed by a client was not configured.
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// A wait was cancelled before it elapsed.
    #[error("Operation cancelled")]
    Cancelled,
}

impl ApiError {
    /// Returns the retry classification for this error.
    ///
    /// Only transport-level failures are retryable. Anything the provider
    /// said on purpose (an error field, a quota notice, a 4xx status) is
    /// terminal for the current call.
    ///
    /// # Examples
    ///
    /// ```
    /// use dipzy_core::errors::{ApiError, RetryClass};
    ///
    /// let error = ApiError::Timeout { provider: "ALPHA_VANTAGE".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = ApiError::Provider {
    ///     provider: "ALPHA_VANTAGE".to_string(),
    ///     message: "invalid API key".to_string(),
    /// };
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => RetryClass::WithBackoff,

            Self::Transport { status, .. } if *status == 429 || *status >= 500 => {
                RetryClass::WithBackoff
            }

            Self::Transport { .. }
            | Self::Provider { .. }
            | Self::RateLimited { .. }
            | Self::Decode { .. }
            | Self::Shape(_)
            | Self::InvalidRequest(_)
            | Self::MissingCredential(_)
            | Self::Cancelled => RetryClass::Never,
        }
    }

    /// Whether the provider itself flagged the failure inside a 2xx body.
    pub fn is_semantic(&self) -> bool {
        matches!(self, Self::Provider { .. } | Self::RateLimited { .. })
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_never_retries() {
        let error = ApiError::Provider {
            provider: "ALPHA_VANTAGE".to_string(),
            message: "invalid API key".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
        assert!(error.is_semantic());
    }

    #[test]
    fn test_rate_limited_notice_never_retries() {
        let error = ApiError::RateLimited {
            provider: "ALPHA_VANTAGE".to_string(),
            message: "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
        assert!(error.is_semantic());
    }

    #[test]
    fn test_timeout_retries_with_backoff() {
        let error = ApiError::Timeout {
            provider: "COINGECKO".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
        assert!(!error.is_semantic());
    }

    #[test]
    fn test_network_retries_with_backoff() {
        let error = ApiError::Network {
            provider: "TWITTER".to_string(),
            message: "connection reset".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_transport_status_classification() {
        let too_many = ApiError::Transport {
            provider: "COINGECKO".to_string(),
            status: 429,
            body: String::new(),
        };
        assert_eq!(too_many.retry_class(), RetryClass::WithBackoff);

        let unavailable = ApiError::Transport {
            provider: "COINGECKO".to_string(),
            status: 503,
            body: String::new(),
        };
        assert_eq!(unavailable.retry_class(), RetryClass::WithBackoff);

        let unauthorized = ApiError::Transport {
            provider: "TWITTER".to_string(),
            status: 401,
            body: "Unauthorized".to_string(),
        };
        assert_eq!(unauthorized.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_error_display() {
        let error = ApiError::Transport {
            provider: "TWITTER".to_string(),
            status: 401,
            body: "Unauthorized".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Request returned an error: TWITTER 401 Unauthorized"
        );

        let error = ApiError::Provider {
            provider: "ALPHA_VANTAGE".to_string(),
            message: "invalid API key".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Provider error: ALPHA_VANTAGE - invalid API key"
        );

        assert_eq!(format!("{}", ApiError::Cancelled), "Operation cancelled");
    }
}
