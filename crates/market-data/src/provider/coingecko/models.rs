//! CoinGecko request options and response types.

use serde::{Deserialize, Serialize};

/// One entry of `/coins/list`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinListing {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

/// Result of mapping ticker symbols to CoinGecko ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolMatch {
    /// `(UPPERCASE symbol, id)` pairs in input order. An ambiguous symbol
    /// contributes one pair per id.
    pub ids: Vec<(String, String)>,
    /// Requested symbols CoinGecko does not list.
    pub missing: Vec<String>,
    /// Requested symbols shared by several coins.
    pub ambiguous: Vec<String>,
}

impl SymbolMatch {
    /// Just the ids, in order.
    pub fn id_list(&self) -> Vec<String> {
        self.ids.iter().map(|(_, id)| id.clone()).collect()
    }
}

/// Parameters for `/coins/markets`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketsQuery {
    /// Coins to fetch. Without ids the top coins by volume are returned.
    pub ids: Option<Vec<String>>,
    /// Response fields to keep, in output order.
    pub select: Vec<String>,
    /// Sort order used when ids are given.
    pub order: String,
    /// Price change windows, e.g. `24h`, `7d`, `1y`.
    pub timepoints: Vec<String>,
}

impl Default for MarketsQuery {
    fn default() -> Self {
        Self {
            ids: None,
            select: ["symbol", "name", "current_price", "total_volume"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            order: "market_cap".to_string(),
            timepoints: vec!["24h".to_string()],
        }
    }
}

impl MarketsQuery {
    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_select(mut self, select: &[&str]) -> Self {
        self.select = select.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }

    pub fn with_timepoints(mut self, timepoints: &[&str]) -> Self {
        self.timepoints = timepoints.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Response field carrying the price change for `timepoint`.
    pub(crate) fn change_field(timepoint: &str) -> String {
        format!("price_change_percentage_{}_in_currency", timepoint)
    }
}
