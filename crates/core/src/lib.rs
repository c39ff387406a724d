//! dipzy core
//!
//! Shared plumbing for the dipzy API clients. Each provider client is thin
//! glue; the pieces they have in common live here.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |     Shaper       |  (provider JSON -> TabularResult)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  BatchScheduler  |  (groups of 5, pause between groups)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! | RequestExecutor  | --> |  ResponsePolicy  |  (per-provider error rules)
//! +------------------+     +------------------+
//!          |
//!          v
//!       network
//! ```
//!
//! # Core Types
//!
//! - [`ApiRequest`] - One provider call
//! - [`RequestExecutor`] - Sends requests, classifies responses, retries transport failures
//! - [`ResponsePolicy`] / [`Outcome`] - Per-provider success/failure rules
//! - [`BatchScheduler`] / [`Symbols`] - Rate-limit-aware batching
//! - [`Clock`] / [`CancelToken`] - Injectable, cancellable waits
//! - [`TabularResult`] / [`Cell`] - Shaped output
//! - [`Credentials`] / [`ClientConfig`] - Configuration

pub mod batch;
pub mod clock;
pub mod config;
pub mod errors;
pub mod http;
pub mod logging;
pub mod table;

pub use batch::{BatchScheduler, Symbols};
pub use clock::{CancelToken, Clock, RecordingClock, SystemClock};
pub use config::{ClientConfig, Credentials, RetryPolicy};
pub use errors::{ApiError, Result, RetryClass};
pub use http::{
    classify_status, decode_value, ApiRequest, Credential, Outcome, RequestExecutor,
    ResponsePolicy, StatusOnly,
};
pub use table::{parse_number, Cell, Row, TabularResult, DEFAULT_SENTINELS};
