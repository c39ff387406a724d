//! Request options and typed responses for the Alpha Vantage API.

use serde::{Deserialize, Serialize};

/// `outputsize` for time series endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputSize {
    /// Latest 100 data points.
    #[default]
    Compact,
    /// Full history.
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

/// Which report list to read from an `INCOME_STATEMENT` response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportPeriod {
    #[default]
    Annual,
    Quarterly,
}

impl ReportPeriod {
    pub(crate) fn reports_key(&self) -> &'static str {
        match self {
            ReportPeriod::Annual => "annualReports",
            ReportPeriod::Quarterly => "quarterlyReports",
        }
    }
}

/// Sampling interval for commodity and economic series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "daily",
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
            Interval::Quarterly => "quarterly",
            Interval::Semiannual => "semiannual",
            Interval::Annual => "annual",
        }
    }
}

/// Commodity price series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Commodity {
    Wti,
    Brent,
    NaturalGas,
    Copper,
    Aluminum,
    Wheat,
    Corn,
    Cotton,
    Sugar,
    Coffee,
    /// Global price index of all commodities.
    All,
}

impl Commodity {
    pub fn function(&self) -> &'static str {
        match self {
            Commodity::Wti => "WTI",
            Commodity::Brent => "BRENT",
            Commodity::NaturalGas => "NATURAL_GAS",
            Commodity::Copper => "COPPER",
            Commodity::Aluminum => "ALUMINUM",
            Commodity::Wheat => "WHEAT",
            Commodity::Corn => "CORN",
            Commodity::Cotton => "COTTON",
            Commodity::Sugar => "SUGAR",
            Commodity::Coffee => "COFFEE",
            Commodity::All => "ALL_COMMODITIES",
        }
    }
}

/// US economic indicator series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EconomicIndicator {
    RealGdp,
    RealGdpPerCapita,
    TreasuryYield,
    FederalFundsRate,
    Cpi,
    Inflation,
    RetailSales,
    DurableGoods,
    Unemployment,
    NonfarmPayroll,
}

impl EconomicIndicator {
    pub fn function(&self) -> &'static str {
        match self {
            EconomicIndicator::RealGdp => "REAL_GDP",
            EconomicIndicator::RealGdpPerCapita => "REAL_GDP_PER_CAPITA",
            EconomicIndicator::TreasuryYield => "TREASURY_YIELD",
            EconomicIndicator::FederalFundsRate => "FEDERAL_FUNDS_RATE",
            EconomicIndicator::Cpi => "CPI",
            EconomicIndicator::Inflation => "INFLATION",
            EconomicIndicator::RetailSales => "RETAIL_SALES",
            EconomicIndicator::DurableGoods => "DURABLES",
            EconomicIndicator::Unemployment => "UNEMPLOYMENT",
            EconomicIndicator::NonfarmPayroll => "NONFARM_PAYROLL",
        }
    }
}

/// One entry of the `MARKET_STATUS` response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketStatus {
    pub market_type: String,
    pub region: String,
    pub primary_exchanges: String,
    pub local_open: String,
    pub local_close: String,
    pub current_status: String,
    #[serde(default)]
    pub notes: String,
}

impl MarketStatus {
    pub fn is_open(&self) -> bool {
        self.current_status.eq_ignore_ascii_case("open")
    }
}

/// `MARKET_STATUS` envelope
#[derive(Debug, Deserialize)]
pub(crate) struct MarketStatusResponse {
    #[serde(default)]
    pub markets: Vec<MarketStatus>,
}
