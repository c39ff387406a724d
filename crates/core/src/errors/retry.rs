/// Classification for retry policy.
///
/// Used by the request executor to decide whether a failed call is worth
/// another attempt.
///
/// # Behavior Summary
///
/// | Class | Retried? | Typical cause |
/// |-------|----------|---------------|
/// | `Never` | No | Provider error in the body, bad request, decode failure |
/// | `WithBackoff` | Yes, bounded | Connect error, timeout, HTTP 429 or 5xx |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry.
    /// The provider understood the request and rejected it, or the response
    /// could not be used. Retrying won't help.
    Never,

    /// Retry with exponential backoff.
    ///
    /// Used for transport-level failures only. The executor stops after the
    /// configured number of attempts and surfaces the last error.
    WithBackoff,
}
