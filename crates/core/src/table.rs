//! Row-per-key tables produced by the response shapers.
//!
//! Shaping follows a fixed order: pick the index column, replace sentinel
//! placeholders with [`Cell::Missing`], then coerce columns to numbers on a
//! best-effort basis. A column is converted only when every non-missing cell
//! parses; otherwise it stays as text and no row fails. Every step is
//! idempotent, so shaping an already-shaped table changes nothing.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{ApiError, Result};

/// Placeholders providers use for "no data".
pub const DEFAULT_SENTINELS: &[&str] = &["-", "."];

/// A single table value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Missing,
    Number(Decimal),
    Text(String),
}

impl Cell {
    /// Convert a raw JSON value without any coercion of strings.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Missing,
            Value::String(s) => Cell::Text(s.clone()),
            Value::Number(n) => number_from_json(n)
                .map(Cell::Number)
                .unwrap_or_else(|| Cell::Text(n.to_string())),
            Value::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Cell::Number(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn number_from_json(n: &serde_json::Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    n.as_f64().and_then(Decimal::from_f64)
}

/// Parse a provider string as a number, accepting plain and scientific notation.
///
/// Digit separators such as `1_000` are not numbers.
pub fn parse_number(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.contains('_') {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// One row: its index key and one cell per column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Row {
    pub key: String,
    pub cells: Vec<Cell>,
}

/// A table keyed by symbol or date.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TabularResult {
    index_name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TabularResult {
    pub fn new(index_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            index_name: index_name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from flat JSON records, taking `index` as the row key.
    ///
    /// Columns are the union of record keys in first-seen order; a record
    /// lacking a column gets [`Cell::Missing`]. A record without the index
    /// field is a shaping error.
    pub fn from_records<'a, I>(index: &str, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Map<String, Value>>,
    {
        let records: Vec<&Map<String, Value>> = records.into_iter().collect();

        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if key != index && !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = Self::new(index, columns);
        for record in records {
            let key = record
                .get(index)
                .and_then(index_key)
                .ok_or_else(|| ApiError::shape(format!("record is missing index column '{}'", index)))?;
            let cells = table
                .columns
                .iter()
                .map(|column| record.get(column).map(Cell::from_json).unwrap_or(Cell::Missing))
                .collect();
            table.rows.push(Row { key, cells });
        }

        Ok(table)
    }

    /// Build a table from an object of objects (`{"2024-01-02": {"1. open": ...}}`).
    ///
    /// Rows are sorted by key; with ISO dates that is chronological order.
    pub fn from_keyed(index_name: &str, object: &Map<String, Value>) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        for (key, value) in object {
            let fields = value
                .as_object()
                .ok_or_else(|| ApiError::shape(format!("entry '{}' is not an object", key)))?;
            for field in fields.keys() {
                if !columns.contains(field) {
                    columns.push(field.clone());
                }
            }
        }

        let mut table = Self::new(index_name, columns);
        for (key, value) in object {
            // Checked above
            let Some(fields) = value.as_object() else {
                continue;
            };
            let cells = table
                .columns
                .iter()
                .map(|column| fields.get(column).map(Cell::from_json).unwrap_or(Cell::Missing))
                .collect();
            table.rows.push(Row {
                key: key.clone(),
                cells,
            });
        }
        table.sort_by_key();

        Ok(table)
    }

    pub fn push_row(&mut self, key: impl Into<String>, cells: Vec<Cell>) -> Result<()> {
        if cells.len() != self.columns.len() {
            return Err(ApiError::shape(format!(
                "row has {} cells but table has {} columns",
                cells.len(),
                self.columns.len()
            )));
        }
        self.rows.push(Row {
            key: key.into(),
            cells,
        });
        Ok(())
    }

    /// Replace text cells equal to any sentinel with [`Cell::Missing`].
    pub fn replace_sentinels(&mut self, sentinels: &[&str]) -> &mut Self {
        for row in &mut self.rows {
            for cell in &mut row.cells {
                if let Cell::Text(s) = cell {
                    if sentinels.contains(&s.as_str()) {
                        *cell = Cell::Missing;
                    }
                }
            }
        }
        self
    }

    /// Convert every column whose non-missing cells all parse as numbers.
    ///
    /// Blank strings count as missing in a converted column. Columns with any
    /// non-numeric text are left untouched.
    pub fn coerce_numeric(&mut self) -> &mut Self {
        for col in 0..self.columns.len() {
            let convertible = self.rows.iter().all(|row| match &row.cells[col] {
                Cell::Missing | Cell::Number(_) => true,
                Cell::Text(s) => s.trim().is_empty() || parse_number(s).is_some(),
            });
            if !convertible {
                continue;
            }
            for row in &mut self.rows {
                let cell = &mut row.cells[col];
                if let Cell::Text(s) = cell {
                    *cell = parse_number(s).map(Cell::Number).unwrap_or(Cell::Missing);
                }
            }
        }
        self
    }

    /// Sentinel replacement followed by numeric coercion.
    pub fn normalize(mut self, sentinels: &[&str]) -> Self {
        self.replace_sentinels(sentinels).coerce_numeric();
        self
    }

    /// Rename columns positionally. The number of names must match.
    pub fn set_columns(&mut self, names: Vec<String>) -> Result<()> {
        if names.len() != self.columns.len() {
            return Err(ApiError::shape(format!(
                "expected {} column names, got {}",
                self.columns.len(),
                names.len()
            )));
        }
        self.columns = names;
        Ok(())
    }

    /// Keep only the named columns, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<Self> {
        let positions = columns
            .iter()
            .map(|name| {
                self.column_position(name)
                    .ok_or_else(|| ApiError::shape(format!("unknown column '{}'", name)))
            })
            .collect::<Result<Vec<usize>>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| Row {
                key: row.key.clone(),
                cells: positions.iter().map(|&p| row.cells[p].clone()).collect(),
            })
            .collect();

        Ok(Self {
            index_name: self.index_name.clone(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }

    pub fn sort_by_key(&mut self) {
        self.rows.sort_by(|a, b| a.key.cmp(&b.key));
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.key.as_str())
    }

    pub fn row(&self, key: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.key == key)
    }

    pub fn get(&self, key: &str, column: &str) -> Option<&Cell> {
        let position = self.column_position(column)?;
        self.row(key).map(|r| &r.cells[position])
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let position = self.column_position(name)?;
        Some(self.rows.iter().map(|r| &r.cells[position]).collect())
    }

    fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

fn index_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn records(value: Value) -> Vec<Map<String, Value>> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_from_records_uses_index_and_union_of_columns() {
        let data = records(json!([
            {"Symbol": "IBM", "PERatio": "22.5", "Sector": "TECHNOLOGY"},
            {"Symbol": "AAPL", "PERatio": "-", "Beta": "1.2"}
        ]));

        let table = TabularResult::from_records("Symbol", &data).unwrap();
        assert_eq!(table.index_name(), "Symbol");
        assert_eq!(table.columns(), &["PERatio", "Sector", "Beta"]);
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["IBM", "AAPL"]);
        assert_eq!(table.get("IBM", "Beta"), Some(&Cell::Missing));
    }

    #[test]
    fn test_from_records_requires_index() {
        let data = records(json!([{"Name": "no symbol"}]));
        let err = TabularResult::from_records("Symbol", &data).unwrap_err();
        assert!(matches!(err, ApiError::Shape(_)));
    }

    #[test]
    fn test_sentinels_become_missing_before_coercion() {
        let data = records(json!([
            {"Symbol": "IBM", "PERatio": "22.5", "EPS": "."},
            {"Symbol": "AAPL", "PERatio": "-", "EPS": "6.1"}
        ]));

        let table = TabularResult::from_records("Symbol", &data)
            .unwrap()
            .normalize(DEFAULT_SENTINELS);

        assert_eq!(table.get("IBM", "PERatio"), Some(&Cell::Number(dec!(22.5))));
        assert_eq!(table.get("AAPL", "PERatio"), Some(&Cell::Missing));
        assert_eq!(table.get("IBM", "EPS"), Some(&Cell::Missing));
        assert_eq!(table.get("AAPL", "EPS"), Some(&Cell::Number(dec!(6.1))));
    }

    #[test]
    fn test_non_numeric_column_left_as_text() {
        let data = records(json!([
            {"Symbol": "IBM", "Sector": "TECHNOLOGY", "Beta": "0.7"},
            {"Symbol": "AAPL", "Sector": "12", "Beta": "1.2"}
        ]));

        let table = TabularResult::from_records("Symbol", &data)
            .unwrap()
            .normalize(DEFAULT_SENTINELS);

        assert_eq!(
            table.get("AAPL", "Sector"),
            Some(&Cell::Text("12".to_string()))
        );
        assert_eq!(table.get("AAPL", "Beta"), Some(&Cell::Number(dec!(1.2))));
    }

    #[test]
    fn test_without_replacement_sentinel_blocks_coercion() {
        let data = records(json!([
            {"Symbol": "IBM", "PERatio": "22.5"},
            {"Symbol": "AAPL", "PERatio": "-"}
        ]));

        let mut table = TabularResult::from_records("Symbol", &data).unwrap();
        table.coerce_numeric();
        assert_eq!(
            table.get("IBM", "PERatio"),
            Some(&Cell::Text("22.5".to_string()))
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let data = records(json!([
            {"Symbol": "IBM", "PERatio": "22.5", "Sector": "TECH", "EPS": "-"},
            {"Symbol": "AAPL", "PERatio": "30", "Sector": "TECH", "EPS": "1e2"}
        ]));

        let once = TabularResult::from_records("Symbol", &data)
            .unwrap()
            .normalize(DEFAULT_SENTINELS);
        let twice = once.clone().normalize(DEFAULT_SENTINELS);
        assert_eq!(once, twice);
        assert_eq!(once.get("AAPL", "EPS"), Some(&Cell::Number(dec!(100))));
    }

    #[test]
    fn test_from_keyed_sorts_rows() {
        let series = json!({
            "2024-01-03": {"1. open": "10", "2. close": "11"},
            "2024-01-02": {"1. open": "9", "2. close": "10"}
        });

        let table = TabularResult::from_keyed("date", series.as_object().unwrap()).unwrap();
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["2024-01-02", "2024-01-03"]);
        assert_eq!(table.columns(), &["1. open", "2. close"]);
    }

    #[test]
    fn test_set_columns_checks_length() {
        let mut table = TabularResult::new("date", vec!["a".to_string(), "b".to_string()]);
        assert!(table.set_columns(vec!["x".to_string()]).is_err());
        table
            .set_columns(vec!["x".to_string(), "y".to_string()])
            .unwrap();
        assert_eq!(table.columns(), &["x", "y"]);
    }

    #[test]
    fn test_select_reorders_and_rejects_unknown() {
        let data = records(json!([{"id": "bitcoin", "symbol": "btc", "current_price": 1}]));
        let table = TabularResult::from_records("id", &data).unwrap();

        let selected = table.select(&["current_price", "symbol"]).unwrap();
        assert_eq!(selected.columns(), &["current_price", "symbol"]);
        assert_eq!(
            selected.get("bitcoin", "current_price"),
            Some(&Cell::Number(dec!(1)))
        );
        assert!(table.select(&["market_cap"]).is_err());
    }

    #[test]
    fn test_json_numbers_and_nulls() {
        assert_eq!(Cell::from_json(&json!(null)), Cell::Missing);
        assert_eq!(Cell::from_json(&json!(42)), Cell::Number(dec!(42)));
        assert_eq!(Cell::from_json(&json!(true)), Cell::Text("true".to_string()));
        assert!(Cell::from_json(&json!(0.25)).as_decimal().is_some());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("150.25"), Some(dec!(150.25)));
        assert_eq!(parse_number(" -3 "), Some(dec!(-3)));
        assert_eq!(parse_number("1.5e3"), Some(dec!(1500)));
        assert_eq!(parse_number("None"), None);
        assert_eq!(parse_number("1_000"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_push_row_checks_width() {
        let mut table = TabularResult::new("Symbol", vec!["Price".to_string()]);
        table
            .push_row("IBM", vec![Cell::Number(dec!(150))])
            .unwrap();
        assert!(table.push_row("AAPL", vec![]).is_err());
        assert_eq!(table.len(), 1);
    }
}
