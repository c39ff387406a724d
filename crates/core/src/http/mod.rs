//! HTTP plumbing shared by the provider clients.
//!
//! - [`ApiRequest`]: method, path, query parameters and optional JSON body
//! - [`ResponsePolicy`]: per-provider success/failure classification
//! - [`RequestExecutor`]: sends requests, applies the policy, retries transport failures

mod executor;
mod policy;
mod request;

pub use executor::{Credential, RequestExecutor};
pub use policy::{classify_status, decode_value, Outcome, ResponsePolicy, StatusOnly};
pub use request::ApiRequest;

pub use reqwest::{Method, StatusCode};
