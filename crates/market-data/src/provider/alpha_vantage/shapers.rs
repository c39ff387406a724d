//! Pure transforms from Alpha Vantage JSON to tables.
//!
//! Nothing here touches the network; every function takes raw responses and
//! returns a [`TabularResult`].

use dipzy_core::{ApiError, Cell, Result, TabularResult, DEFAULT_SENTINELS};
use serde_json::{Map, Value};

use super::models::ReportPeriod;

/// Placeholders Alpha Vantage uses in company data.
pub const FUNDAMENTAL_SENTINELS: &[&str] = &["-", ".", "None"];

const GLOBAL_QUOTE_KEY: &str = "Global Quote";
const QUOTE_SYMBOL_KEY: &str = "01. symbol";
const QUOTE_PRICE_KEY: &str = "05. price";
const TIME_SERIES_PREFIX: &str = "Time Series";

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ApiError::Shape(format!("{} is not a JSON object", what)))
}

/// `OVERVIEW` responses → one row per symbol.
pub fn fundamentals(responses: &[Value]) -> Result<TabularResult> {
    let records = responses
        .iter()
        .map(|r| as_object(r, "OVERVIEW response"))
        .collect::<Result<Vec<_>>>()?;

    Ok(TabularResult::from_records("Symbol", records)?.normalize(FUNDAMENTAL_SENTINELS))
}

/// `GLOBAL_QUOTE` responses → `Symbol` / `Price` table.
pub fn prices(responses: &[Value]) -> Result<TabularResult> {
    let mut table = TabularResult::new("Symbol", vec!["Price".to_string()]);

    for response in responses {
        let quote = response
            .get(GLOBAL_QUOTE_KEY)
            .ok_or_else(|| ApiError::Shape(format!("response has no '{}'", GLOBAL_QUOTE_KEY)))?;
        let field = |key: &str| {
            quote
                .get(key)
                .and_then(Value::as_str)
                .ok_or_else(|| ApiError::Shape(format!("quote has no '{}'", key)))
        };
        let symbol = field(QUOTE_SYMBOL_KEY)?;
        let price = field(QUOTE_PRICE_KEY)?;
        table.push_row(symbol, vec![Cell::Text(price.to_string())])?;
    }

    Ok(table.normalize(DEFAULT_SENTINELS))
}

/// `INCOME_STATEMENT` responses → one `fiscalDateEnding` table per symbol.
///
/// The symbol comes from the response when present, otherwise from the
/// request at the same position.
pub fn income_statements(
    symbols: &[String],
    responses: &[Value],
    period: ReportPeriod,
) -> Result<Vec<(String, TabularResult)>> {
    responses
        .iter()
        .enumerate()
        .map(|(i, response)| {
            let object = as_object(response, "INCOME_STATEMENT response")?;
            let symbol = object
                .get("symbol")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| symbols.get(i).cloned())
                .ok_or_else(|| ApiError::Shape("income statement without symbol".to_string()))?;

            let reports = object
                .get(period.reports_key())
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    ApiError::Shape(format!("{} has no '{}'", symbol, period.reports_key()))
                })?
                .iter()
                .map(|r| as_object(r, "report"))
                .collect::<Result<Vec<_>>>()?;

            let mut table = TabularResult::from_records("fiscalDateEnding", reports)?
                .normalize(FUNDAMENTAL_SENTINELS);
            table.sort_by_key();
            Ok((symbol, table))
        })
        .collect()
}

/// Strip the numeric ordering prefix from an Alpha Vantage key.
///
/// `"1. open"` → `"open"`, `"5. volume"` → `"volume"`; keys without such a
/// prefix are returned unchanged.
pub fn strip_key_prefix(key: &str) -> &str {
    match key.split_once(". ") {
        Some((prefix, rest))
            if !prefix.is_empty()
                && prefix.starts_with(|c: char| c.is_ascii_digit())
                && prefix.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            rest
        }
        _ => key,
    }
}

fn time_series(response: &Value) -> Result<&Map<String, Value>> {
    let object = as_object(response, "time series response")?;
    object
        .iter()
        .find(|(key, _)| key.starts_with(TIME_SERIES_PREFIX))
        .and_then(|(_, series)| series.as_object())
        .ok_or_else(|| ApiError::Shape("response has no time series".to_string()))
}

/// Daily time series responses → one date-indexed table per symbol.
///
/// Column names are taken from the first response with their prefixes
/// stripped and applied positionally to every table. All responses are
/// expected to come from the same endpoint and share one key layout; a
/// table with a different column count is a shaping error.
pub fn daily_ohlcv(symbols: &[String], responses: &[Value]) -> Result<Vec<(String, TabularResult)>> {
    if symbols.len() != responses.len() {
        return Err(ApiError::Shape(format!(
            "{} symbols but {} responses",
            symbols.len(),
            responses.len()
        )));
    }

    let tables = responses
        .iter()
        .map(|r| TabularResult::from_keyed("date", time_series(r)?))
        .collect::<Result<Vec<_>>>()?;

    let Some(first) = tables.first() else {
        return Ok(Vec::new());
    };
    let names: Vec<String> = first
        .columns()
        .iter()
        .map(|c| strip_key_prefix(c).to_string())
        .collect();

    symbols
        .iter()
        .cloned()
        .zip(tables)
        .map(|(symbol, mut table)| {
            table.set_columns(names.clone())?;
            Ok((symbol, table.normalize(DEFAULT_SENTINELS)))
        })
        .collect()
}

/// Commodity / economic indicator response → date-indexed `value` table.
pub fn indicator_series(response: &Value) -> Result<TabularResult> {
    let object = as_object(response, "indicator response")?;
    let data = object
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::Shape("indicator response has no 'data'".to_string()))?
        .iter()
        .map(|d| as_object(d, "data point"))
        .collect::<Result<Vec<_>>>()?;

    let mut table = TabularResult::from_records("date", data)?.normalize(DEFAULT_SENTINELS);
    table.sort_by_key();
    Ok(table)
}
