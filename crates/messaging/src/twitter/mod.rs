//! Twitter API v2 client (app-only bearer token).

mod models;
mod stream;

pub use models::{NewRule, Page, PublicMetrics, Rule, Tweet, User, UserLookup};
pub use stream::TweetStream;

use std::sync::Arc;

use dipzy_core::{
    decode_value, ApiRequest, ClientConfig, Clock, Credential, Credentials, RequestExecutor,
    Result, StatusOnly,
};
use log::info;
use serde::Deserialize;
use serde_json::{json, Value};

pub const BASE_URL: &str = "https://api.twitter.com/2";
pub const PROVIDER_ID: &str = "TWITTER";

const RULES_ENDPOINT: &str = "/tweets/search/stream/rules";
const STREAM_ENDPOINT: &str = "/tweets/search/stream";

/// Query used by [`TwitterClient::get_stream`] when none is given.
pub const DEFAULT_STREAM_PARAMS: &[(&str, &str)] =
    &[("tweet.fields", "created_at"), ("expansions", "author_id")];

/// `{"data": ...}` envelope.
#[derive(Deserialize)]
struct Data<T> {
    data: T,
}

/// Twitter v2 client. Failures are signalled by HTTP status only.
pub struct TwitterClient {
    executor: RequestExecutor<StatusOnly>,
}

impl TwitterClient {
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self::with_config(bearer_token, ClientConfig::default())
    }

    pub fn with_config(bearer_token: impl Into<String>, config: ClientConfig) -> Self {
        Self {
            executor: RequestExecutor::with_config(
                BASE_URL,
                Credential::Bearer(bearer_token.into()),
                StatusOnly::new(PROVIDER_ID),
                config,
            ),
        }
    }

    /// Create a client from `TWITTER_BEARER`.
    pub fn from_credentials(credentials: &Credentials) -> Result<Self> {
        Ok(Self::new(credentials.require_twitter_bearer()?))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.executor = self.executor.with_base_url(base_url);
        self
    }

    /// Replace the clock used for retry backoff.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.executor = self.executor.with_clock(clock);
        self
    }

    /// Single call; `body` is sent as JSON when present.
    pub async fn request(&self, request: &ApiRequest) -> Result<Value> {
        self.executor.execute(request).await
    }

    /// Look up users by id or username.
    ///
    /// `user_fields` is a comma-separated list such as `public_metrics` or
    /// `created_at,description`.
    pub async fn get_users(&self, lookup: &UserLookup, user_fields: &str) -> Result<Vec<User>> {
        let (key, value) = lookup.param();
        let request = ApiRequest::get(lookup.endpoint())
            .param(key, value)
            .param("user.fields", user_fields);
        let response: Data<Vec<User>> = decode_value(PROVIDER_ID, self.request(&request).await?)?;
        Ok(response.data)
    }

    /// Most recent tweets of a user. `extra` carries paging or filter
    /// parameters such as `max_results` or `pagination_token`.
    pub async fn get_user_tweets(
        &self,
        user_id: &str,
        tweet_fields: &str,
        extra: &[(&str, &str)],
    ) -> Result<Page<Tweet>> {
        let request = ApiRequest::get(format!("/users/{}/tweets", user_id))
            .param("tweet.fields", tweet_fields)
            .params(extra.iter().copied());
        decode_value(PROVIDER_ID, self.request(&request).await?)
    }

    pub async fn get_list_members(&self, list_id: &str, user_fields: &str) -> Result<Page<User>> {
        let request = ApiRequest::get(format!("/lists/{}/members", list_id))
            .param("user.fields", user_fields);
        decode_value(PROVIDER_ID, self.request(&request).await?)
    }

    /// Current filtered stream rules. An account without rules gets an empty list.
    pub async fn get_rules(&self) -> Result<Vec<Rule>> {
        let page: Page<Rule> =
            decode_value(PROVIDER_ID, self.request(&ApiRequest::get(RULES_ENDPOINT)).await?)?;
        Ok(page.data)
    }

    /// Delete every rule in `rules`. Returns `None` without calling the API
    /// when there is nothing to delete.
    pub async fn delete_all_rules(&self, rules: &[Rule]) -> Result<Option<Value>> {
        if rules.is_empty() {
            return Ok(None);
        }

        let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        let request = ApiRequest::post(RULES_ENDPOINT).json(json!({"delete": {"ids": ids}}));
        let response = self.request(&request).await?;
        info!("Deleted stream rules: {}", response);
        Ok(Some(response))
    }

    pub async fn set_rules(&self, rules: &[NewRule]) -> Result<Value> {
        let request = ApiRequest::post(RULES_ENDPOINT).json(json!({ "add": rules }));
        let response = self.request(&request).await?;
        info!("Added stream rules: {}", response);
        Ok(response)
    }

    /// Connect to the filtered stream.
    ///
    /// The connection has no overall timeout.
    pub async fn get_stream(&self, params: &[(&str, &str)]) -> Result<TweetStream> {
        let request = ApiRequest::get(STREAM_ENDPOINT).params(params.iter().copied());
        let response = self.executor.open_stream(&request).await?;
        Ok(TweetStream::new(response))
    }
}
