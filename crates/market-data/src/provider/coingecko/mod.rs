//! CoinGecko client (public API, no key).

mod models;

pub use models::{CoinListing, MarketsQuery, SymbolMatch};

use std::collections::HashMap;
use std::sync::Arc;

use dipzy_core::{
    decode_value, ApiError, ApiRequest, ClientConfig, Clock, Credential, RequestExecutor, Result,
    StatusOnly, Symbols, TabularResult, DEFAULT_SENTINELS,
};
use log::info;
use serde_json::{Map, Value};

pub const BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const PROVIDER_ID: &str = "COINGECKO";

/// CoinGecko API client.
pub struct CoinGeckoClient {
    executor: RequestExecutor<StatusOnly>,
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinGeckoClient {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            executor: RequestExecutor::with_config(
                BASE_URL,
                Credential::None,
                StatusOnly::new(PROVIDER_ID),
                config,
            ),
        }
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

    /// Single call against `endpoint` (e.g. `/coins/list`).
    pub async fn request(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value> {
        let request = ApiRequest::get(endpoint).params(params.iter().copied());
        self.executor.execute(&request).await
    }

    /// Every coin CoinGecko knows about.
    pub async fn coins_list(&self) -> Result<Vec<CoinListing>> {
        let value = self.request("/coins/list", &[]).await?;
        decode_value(PROVIDER_ID, value)
    }

    /// Map ticker symbols to CoinGecko ids.
    ///
    /// With `None`, every listing is returned.
    pub async fn convert_symbols(&self, symbols: Option<Symbols>) -> Result<SymbolMatch> {
        let listings = self.coins_list().await?;
        let result = match symbols {
            Some(symbols) => match_symbols(&listings, symbols.as_slice()),
            None => SymbolMatch {
                ids: listings
                    .iter()
                    .map(|l| (l.symbol.to_uppercase(), l.id.clone()))
                    .collect(),
                ..SymbolMatch::default()
            },
        };

        if !result.missing.is_empty() {
            info!("Symbols missing from CoinGecko: {:?}", result.missing);
        }
        if !result.ambiguous.is_empty() {
            info!("Following symbols are ambiguous: {:?}", result.ambiguous);
        }

        Ok(result)
    }

    /// Market data per coin, indexed by `id`.
    ///
    /// Columns are `query.select` followed by one column per timepoint,
    /// named after the timepoint (`24h`, `7d`, ...).
    pub async fn get_coins_markets(&self, query: &MarketsQuery) -> Result<TabularResult> {
        let timepoints = query.timepoints.join(",");
        let ids = query.ids.as_ref().map(|list| list.join(","));

        let mut params: Vec<(&str, &str)> = vec![("vs_currency", "usd")];
        match &ids {
            Some(ids) => {
                params.push(("ids", ids.as_str()));
                params.push(("order", query.order.as_str()));
            }
            None => params.push(("order", "volume_desc")),
        }
        params.push(("price_change_percentage", timepoints.as_str()));

        let value = self.request("/coins/markets", &params).await?;
        markets_table(&value, query)
    }
}

/// Match lowercase symbols against the listing.
pub fn match_symbols(listings: &[CoinListing], symbols: &[String]) -> SymbolMatch {
    let mut by_symbol: HashMap<&str, Vec<&str>> = HashMap::new();
    for listing in listings {
        by_symbol
            .entry(listing.symbol.as_str())
            .or_default()
            .push(listing.id.as_str());
    }

    let mut result = SymbolMatch::default();
    for symbol in symbols {
        let lower = symbol.to_lowercase();
        match by_symbol.get(lower.as_str()) {
            None => result.missing.push(symbol.clone()),
            Some(ids) => {
                if ids.len() > 1 && !result.ambiguous.contains(&lower) {
                    result.ambiguous.push(lower.clone());
                }
                let upper = lower.to_uppercase();
                result
                    .ids
                    .extend(ids.iter().map(|id| (upper.clone(), id.to_string())));
            }
        }
    }
    result
}

/// Shape a `/coins/markets` response.
pub fn markets_table(response: &Value, query: &MarketsQuery) -> Result<TabularResult> {
    let records = response
        .as_array()
        .ok_or_else(|| ApiError::Shape("markets response is not a list".to_string()))?
        .iter()
        .map(|r| {
            r.as_object()
                .ok_or_else(|| ApiError::Shape("market entry is not an object".to_string()))
        })
        .collect::<Result<Vec<&Map<String, Value>>>>()?;

    let change_fields: Vec<String> = query
        .timepoints
        .iter()
        .map(|tp| MarketsQuery::change_field(tp))
        .collect();
    // `id` is the row index, never a column.
    let select: Vec<String> = query
        .select
        .iter()
        .filter(|field| field.as_str() != "id")
        .cloned()
        .collect();
    let mut table = TabularResult::from_records("id", records)?;

    // An empty response has no columns to select from.
    if table.is_empty() {
        let mut columns = select;
        columns.extend(query.timepoints.iter().cloned());
        return Ok(TabularResult::new("id", columns));
    }

    let wanted: Vec<&str> = select
        .iter()
        .chain(change_fields.iter())
        .map(String::as_str)
        .collect();
    table = table.select(&wanted)?;

    let mut names = select;
    names.extend(query.timepoints.iter().cloned());
    table.set_columns(names)?;

    Ok(table.normalize(DEFAULT_SENTINELS))
}
