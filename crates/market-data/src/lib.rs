//! dipzy market data
//!
//! Clients for equity, commodity and macro data from Alpha Vantage and for
//! crypto market data from CoinGecko.
//!
//! # Architecture
//!
//! ```text
//! +------------------------+
//! |  AlphaVantageClient    |  get_fundamentals / get_price / get_daily_ohlcv ...
//! +------------------------+
//!        |          |
//!        v          v
//! +-------------+  +-----------------+
//! |   shapers   |  | BatchScheduler  |  (5 calls, 60s pause)
//! +-------------+  +-----------------+
//!                           |
//!                           v
//!                  +-----------------+
//!                  | RequestExecutor |  (AlphaVantagePolicy)
//!                  +-----------------+
//! ```
//!
//! # Core Types
//!
//! - [`AlphaVantageClient`] - Alpha Vantage operations returning [`TabularResult`]s
//! - [`CoinGeckoClient`] - Symbol lookup and `/coins/markets`
//! - [`MarketsQuery`] - Options for market snapshots
//!
//! [`TabularResult`]: dipzy_core::TabularResult

pub mod provider;

pub use provider::alpha_vantage::{
    AlphaVantageClient, AlphaVantagePolicy, Commodity, EconomicIndicator, Interval, MarketStatus,
    OutputSize, ReportPeriod,
};
pub use provider::coingecko::{CoinGeckoClient, CoinListing, MarketsQuery, SymbolMatch};
