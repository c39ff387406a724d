//! Tracing subscriber setup for binaries and live tests.
//!
//! Library code logs through the `log` facade; the subscriber installed here
//! bridges those records, so callers see them in the same stream.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable selecting `text` (default) or `json` output.
pub const LOG_FORMAT_VAR: &str = "DIPZY_LOG_FORMAT";

/// Install the global subscriber. Later calls are no-ops.
pub fn init_tracing() {
    let log_format = std::env::var(LOG_FORMAT_VAR).unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .try_init()
    };

    if result.is_err() {
        log::debug!("Tracing subscriber already installed");
    }
}
