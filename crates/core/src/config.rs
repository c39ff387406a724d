//! Client configuration and credential loading.
//!
//! Credentials are static tokens read from the environment (optionally via a
//! `.env` file). Nothing here is validated against the providers; a missing
//! credential only surfaces when a client that needs it is built.

use std::fmt;
use std::time::Duration;

use crate::errors::{ApiError, Result};

/// Environment variable holding the Alpha Vantage API key.
pub const ALPHAVANTAGE_KEY_VAR: &str = "ALPHAVANTAGE_KEY";
/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the Twitter v2 bearer token.
pub const TWITTER_BEARER_VAR: &str = "TWITTER_BEARER";
/// Environment variable holding the Ethereum JSON-RPC endpoint.
pub const ETH_RPC_URL_VAR: &str = "ETH_RPC_URL";

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of requests per batch.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default pause between batches (free-tier quota is 5 calls per minute).
pub const DEFAULT_BATCH_PAUSE: Duration = Duration::from_secs(60);

/// Bounded retry for transport-level failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. `1` disables retries.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for every further attempt.
    pub base_delay: Duration,
    /// Upper bound for a single backoff delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Backoff to wait after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

/// Tunables shared by every HTTP client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry policy for transport failures.
    pub retry: RetryPolicy,
    /// Maximum number of requests per batch.
    pub batch_size: usize,
    /// Pause between two consecutive batches.
    pub batch_pause: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_pause: DEFAULT_BATCH_PAUSE,
        }
    }
}

/// Static credentials for the supported providers.
#[derive(Clone, Default)]
pub struct Credentials {
    pub alphavantage_key: Option<String>,
    pub telegram_token: Option<String>,
    pub twitter_bearer: Option<String>,
    pub eth_rpc_url: Option<String>,
}

impl Credentials {
    /// Load credentials from the process environment, reading `.env` first if present.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            alphavantage_key: read(ALPHAVANTAGE_KEY_VAR),
            telegram_token: read(TELEGRAM_TOKEN_VAR),
            twitter_bearer: read(TWITTER_BEARER_VAR),
            eth_rpc_url: read(ETH_RPC_URL_VAR),
        }
    }

    pub fn require_alphavantage_key(&self) -> Result<&str> {
        require(&self.alphavantage_key, ALPHAVANTAGE_KEY_VAR)
    }

    pub fn require_telegram_token(&self) -> Result<&str> {
        require(&self.telegram_token, TELEGRAM_TOKEN_VAR)
    }

    pub fn require_twitter_bearer(&self) -> Result<&str> {
        require(&self.twitter_bearer, TWITTER_BEARER_VAR)
    }

    pub fn require_eth_rpc_url(&self) -> Result<&str> {
        require(&self.eth_rpc_url, ETH_RPC_URL_VAR)
    }
}

fn require<'a>(value: &'a Option<String>, var: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| ApiError::MissingCredential(var.to_string()))
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("Credentials")
            .field("alphavantage_key", &mask(&self.alphavantage_key))
            .field("telegram_token", &mask(&self.telegram_token))
            .field("twitter_bearer", &mask(&self.twitter_bearer))
            .field("eth_rpc_url", &mask(&self.eth_rpc_url))
            .finish()
    }
}
