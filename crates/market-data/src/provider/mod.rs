//! Market data provider clients.
//!
//! Each provider owns a [`ResponsePolicy`](dipzy_core::ResponsePolicy) and a
//! [`RequestExecutor`](dipzy_core::RequestExecutor); shaping into tables lives
//! next to the client that produces the raw JSON.

pub mod alpha_vantage;
pub mod coingecko;

pub use alpha_vantage::{AlphaVantageClient, AlphaVantagePolicy};
pub use coingecko::CoinGeckoClient;
