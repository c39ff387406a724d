//! Alpha Vantage client.
//!
//! Covers company fundamentals, income statements, quotes, daily OHLCV,
//! market hours, commodities and US economic indicators.
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute, so
//! every per-symbol operation goes through the [`BatchScheduler`].

mod models;
pub mod shapers;

pub use models::{
    Commodity, EconomicIndicator, Interval, MarketStatus, OutputSize, ReportPeriod,
};

use std::sync::Arc;

use dipzy_core::http::{Method, StatusCode};
use dipzy_core::{
    classify_status, decode_value, ApiRequest, BatchScheduler, ClientConfig, Clock, Credential,
    Credentials, Outcome, RequestExecutor, ResponsePolicy, Result, Symbols, SystemClock,
    TabularResult,
};
use log::{debug, warn};
use serde_json::Value;

use models::MarketStatusResponse;

pub const BASE_URL: &str = "https://www.alphavantage.co/query";
pub const PROVIDER_ID: &str = "ALPHA_VANTAGE";

const API_KEY_PARAM: &str = "apikey";

/// Alpha Vantage reports failures inside `200 OK` bodies.
///
/// - `"Error Message"`: bad symbol, bad function or bad key.
/// - `"Note"` / `"Information"` mentioning the call frequency or rate limit:
///   quota exhausted.
///
/// Any other `"Information"` is logged and the body passes through.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlphaVantagePolicy;

impl AlphaVantagePolicy {
    fn is_quota_notice(message: &str) -> bool {
        let lower = message.to_ascii_lowercase();
        lower.contains("call frequency") || lower.contains("rate limit")
    }
}

impl ResponsePolicy for AlphaVantagePolicy {
    fn provider(&self) -> &'static str {
        PROVIDER_ID
    }

    fn classify_response(&self, status: StatusCode, body: &str) -> Outcome {
        let value = match classify_status(status, body) {
            Outcome::Success(value) => value,
            other => return other,
        };

        let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);

        if let Some(message) = field("Error Message") {
            return Outcome::Provider { message };
        }

        for key in ["Note", "Information"] {
            if let Some(message) = field(key) {
                if Self::is_quota_notice(&message) {
                    return Outcome::RateLimited { message };
                }
                warn!("Alpha Vantage {}: {}", key.to_lowercase(), message);
            }
        }

        Outcome::Success(value)
    }
}

/// Alpha Vantage API client.
pub struct AlphaVantageClient {
    executor: RequestExecutor<AlphaVantagePolicy>,
    scheduler: BatchScheduler,
}

impl AlphaVantageClient {
    /// Create a client with the default timeout, retry and batching settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(api_key, ClientConfig::default())
    }

    pub fn with_config(api_key: impl Into<String>, config: ClientConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let scheduler = BatchScheduler::from_config(&config, Arc::clone(&clock));
        let executor = RequestExecutor::with_config(
            BASE_URL,
            Credential::QueryParam {
                name: API_KEY_PARAM,
                value: api_key.into(),
            },
            AlphaVantagePolicy,
            config,
        )
        .with_clock(clock);

        Self {
            executor,
            scheduler,
        }
    }

    /// Create a client from `ALPHAVANTAGE_KEY`.
    pub fn from_credentials(credentials: &Credentials) -> Result<Self> {
        Ok(Self::new(credentials.require_alphavantage_key()?))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.executor = self.executor.with_base_url(base_url);
        self
    }

    /// Replace the clock used for batch pauses and retry backoff.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.scheduler = BatchScheduler::from_config(self.executor.config(), Arc::clone(&clock));
        self.executor = self.executor.with_clock(clock);
        self
    }

    pub fn scheduler(&self) -> &BatchScheduler {
        &self.scheduler
    }

    /// Single `GET` call for `function` and `symbol`.
    pub async fn request(
        &self,
        function: &str,
        symbol: &str,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        self.request_with(Method::GET, function, symbol, extra).await
    }

    /// Single call with an explicit HTTP method.
    pub async fn request_with(
        &self,
        method: Method,
        function: &str,
        symbol: &str,
        extra: &[(&str, &str)],
    ) -> Result<Value> {
        let request = ApiRequest::new(method, "")
            .param("function", function)
            .param("symbol", symbol)
            .params(extra.iter().copied());
        self.executor.execute(&request).await
    }

    /// One call per symbol, batched. Results come back in input order.
    pub async fn batch_request(
        &self,
        function: &str,
        symbols: impl Into<Symbols>,
        extra: &[(&str, &str)],
    ) -> Result<Vec<Value>> {
        let symbols = symbols.into();
        debug!("{} {} for {} symbols", PROVIDER_ID, function, symbols.len());
        self.scheduler
            .run(&symbols, |symbol| async move {
                self.request(function, &symbol, extra).await
            })
            .await
    }

    /// Call without a symbol (market status, commodities, indicators).
    async fn query(&self, function: &str, extra: &[(&str, &str)]) -> Result<Value> {
        let request = ApiRequest::get("")
            .param("function", function)
            .params(extra.iter().copied());
        self.executor.execute(&request).await
    }

    /// Company overview, one row per symbol indexed by `Symbol`.
    pub async fn get_fundamentals(&self, symbols: impl Into<Symbols>) -> Result<TabularResult> {
        let responses = self.batch_request("OVERVIEW", symbols, &[]).await?;
        shapers::fundamentals(&responses)
    }

    /// Income statements, one `fiscalDateEnding`-indexed table per symbol.
    pub async fn get_income_statement(
        &self,
        symbols: impl Into<Symbols>,
        period: ReportPeriod,
    ) -> Result<Vec<(String, TabularResult)>> {
        let symbols = symbols.into();
        let responses = self
            .batch_request("INCOME_STATEMENT", symbols.clone(), &[])
            .await?;
        shapers::income_statements(symbols.as_slice(), &responses, period)
    }

    /// Latest price per symbol, indexed by `Symbol` with a `Price` column.
    pub async fn get_price(&self, symbols: impl Into<Symbols>) -> Result<TabularResult> {
        let responses = self.batch_request("GLOBAL_QUOTE", symbols, &[]).await?;
        shapers::prices(&responses)
    }

    /// Daily OHLCV, one date-indexed table per symbol.
    pub async fn get_daily_ohlcv(
        &self,
        symbols: impl Into<Symbols>,
        output_size: OutputSize,
    ) -> Result<Vec<(String, TabularResult)>> {
        let symbols = symbols.into();
        let responses = self
            .batch_request(
                "TIME_SERIES_DAILY",
                symbols.clone(),
                &[("outputsize", output_size.as_str())],
            )
            .await?;
        shapers::daily_ohlcv(symbols.as_slice(), &responses)
    }

    /// Open/closed status of the major trading venues.
    pub async fn get_market_status(&self) -> Result<Vec<MarketStatus>> {
        let value = self.query("MARKET_STATUS", &[]).await?;
        let response: MarketStatusResponse = decode_value(PROVIDER_ID, value)?;
        Ok(response.markets)
    }

    /// Commodity price series.
    pub async fn price_commodities(
        &self,
        commodity: Commodity,
        interval: Interval,
    ) -> Result<TabularResult> {
        let value = self
            .query(commodity.function(), &[("interval", interval.as_str())])
            .await?;
        shapers::indicator_series(&value)
    }

    /// US economic indicator series.
    pub async fn economic_indicator(
        &self,
        indicator: EconomicIndicator,
        interval: Interval,
    ) -> Result<TabularResult> {
        let value = self
            .query(indicator.function(), &[("interval", interval.as_str())])
            .await?;
        shapers::indicator_series(&value)
    }

    /// Effective federal funds rate.
    pub async fn ffr(&self, interval: Interval) -> Result<TabularResult> {
        self.economic_indicator(EconomicIndicator::FederalFundsRate, interval)
            .await
    }

    /// Consumer price index.
    pub async fn cpi(&self, interval: Interval) -> Result<TabularResult> {
        self.economic_indicator(EconomicIndicator::Cpi, interval).await
    }
}
