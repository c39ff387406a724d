//! Alpha Vantage client against a mock server.

use std::sync::Arc;
use std::time::Duration;

use dipzy_core::{ApiError, Cell, RecordingClock};
use dipzy_market_data::{AlphaVantageClient, Interval, OutputSize, ReportPeriod};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> (AlphaVantageClient, Arc<RecordingClock>) {
    let clock = Arc::new(RecordingClock::new());
    let client = AlphaVantageClient::new("demo")
        .with_base_url(format!("{}/query", server.uri()))
        .with_clock(clock.clone());
    (client, clock)
}

fn quote(symbol: &str, price: &str) -> serde_json::Value {
    json!({"Global Quote": {"01. symbol": symbol, "02. open": "1.0", "05. price": price}})
}

#[tokio::test]
async fn error_message_in_ok_body_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("function", "OVERVIEW"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"Error Message": "invalid API key"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, clock) = client(&server).await;
    let err = client.request("OVERVIEW", "IBM", &[]).await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Provider { ref provider, ref message }
            if provider == "ALPHA_VANTAGE" && message == "invalid API key"
    ));
    assert_eq!(clock.sleep_count(), 0);
}

#[tokio::test]
async fn quota_note_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute and 500 calls per day."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client(&server).await;
    let err = client.get_price("IBM").await.unwrap_err();
    assert!(matches!(err, ApiError::RateLimited { .. }));
}

#[tokio::test]
async fn seven_symbols_pause_once() {
    let server = MockServer::start().await;
    let symbols = ["AAPL", "IBM", "MSFT", "TSLA", "AMZN", "META", "NFLX"];
    for (i, symbol) in symbols.iter().enumerate() {
        Mock::given(method("GET"))
            .and(query_param("function", "GLOBAL_QUOTE"))
            .and(query_param("symbol", *symbol))
            .and(query_param("apikey", "demo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(quote(symbol, &format!("{}.5", i + 1))))
            .expect(1)
            .mount(&server)
            .await;
    }

    let (client, clock) = client(&server).await;
    let table = client.get_price(symbols).await.unwrap();

    assert_eq!(table.keys().collect::<Vec<_>>(), symbols.to_vec());
    assert_eq!(table.get("NFLX", "Price"), Some(&Cell::Number(dec!(7.5))));
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(60)]);
}

#[tokio::test]
async fn scalar_symbol_takes_batch_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("symbol", "IBM"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote("IBM", "150.25")))
        .expect(1)
        .mount(&server)
        .await;

    let (client, clock) = client(&server).await;
    let table = client.get_price("IBM").await.unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.get("IBM", "Price"), Some(&Cell::Number(dec!(150.25))));
    assert_eq!(clock.sleep_count(), 0);
}

#[tokio::test]
async fn failure_in_second_batch_aborts_without_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("symbol", "BAD"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"Error Message": "Invalid API call."})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote("X", "1")))
        .mount(&server)
        .await;

    let (client, clock) = client(&server).await;
    let symbols = vec!["A", "B", "C", "D", "E", "BAD", "G"];
    let err = client.get_price(symbols).await.unwrap_err();

    assert!(matches!(err, ApiError::Provider { .. }));
    assert_eq!(clock.sleep_count(), 1);
    // The seventh symbol is never requested
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 6);
}

#[tokio::test]
async fn daily_ohlcv_strips_prefixes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("function", "TIME_SERIES_DAILY"))
        .and(query_param("outputsize", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Meta Data": {"2. Symbol": "IBM"},
            "Time Series (Daily)": {
                "2024-01-03": {"1. open": "161.0", "2. high": "162.0", "3. low": "160.1", "4. close": "161.5", "5. volume": "4000000"},
                "2024-01-02": {"1. open": "160.0", "2. high": "161.2", "3. low": "159.0", "4. close": "160.9", "5. volume": "3500000"}
            }
        })))
        .mount(&server)
        .await;

    let (client, _) = client(&server).await;
    let tables = client
        .get_daily_ohlcv(vec!["IBM", "IBM"], OutputSize::Full)
        .await
        .unwrap();

    assert_eq!(tables.len(), 2);
    let (symbol, table) = &tables[0];
    assert_eq!(symbol, "IBM");
    assert_eq!(table.columns(), &["open", "high", "low", "close", "volume"]);
    assert_eq!(table.keys().next(), Some("2024-01-02"));
    assert_eq!(table.get("2024-01-03", "volume"), Some(&Cell::Number(dec!(4000000))));
}

#[tokio::test]
async fn fundamentals_replace_none_sentinel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("function", "OVERVIEW"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Symbol": "IBM", "AssetType": "Common Stock", "MarketCapitalization": "140000000000",
            "PEGRatio": "None", "Beta": "-"
        })))
        .mount(&server)
        .await;

    let (client, _) = client(&server).await;
    let table = client.get_fundamentals("IBM").await.unwrap();

    assert_eq!(table.index_name(), "Symbol");
    assert_eq!(table.get("IBM", "PEGRatio"), Some(&Cell::Missing));
    assert_eq!(table.get("IBM", "Beta"), Some(&Cell::Missing));
    assert_eq!(
        table.get("IBM", "MarketCapitalization"),
        Some(&Cell::Number(dec!(140000000000)))
    );
}

#[tokio::test]
async fn income_statement_quarterly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("function", "INCOME_STATEMENT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symbol": "IBM",
            "annualReports": [],
            "quarterlyReports": [
                {"fiscalDateEnding": "2024-03-31", "grossProfit": "7000000000"},
                {"fiscalDateEnding": "2023-12-31", "grossProfit": "10000000000"}
            ]
        })))
        .mount(&server)
        .await;

    let (client, _) = client(&server).await;
    let tables = client
        .get_income_statement("IBM", ReportPeriod::Quarterly)
        .await
        .unwrap();

    let (_, table) = &tables[0];
    assert_eq!(table.index_name(), "fiscalDateEnding");
    assert_eq!(table.keys().collect::<Vec<_>>(), vec!["2023-12-31", "2024-03-31"]);
}

#[tokio::test]
async fn ffr_series() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("function", "FEDERAL_FUNDS_RATE"))
        .and(query_param("interval", "monthly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Effective Federal Funds Rate",
            "data": [
                {"date": "2024-02-01", "value": "5.33"},
                {"date": "2024-01-01", "value": "."}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client(&server).await;
    let table = client.ffr(Interval::Monthly).await.unwrap();

    assert_eq!(table.get("2024-01-01", "value"), Some(&Cell::Missing));
    assert_eq!(table.get("2024-02-01", "value"), Some(&Cell::Number(dec!(5.33))));
}

#[tokio::test]
async fn market_status_is_typed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("function", "MARKET_STATUS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "endpoint": "Global Market Open & Close Status",
            "markets": [{
                "market_type": "Equity",
                "region": "United States",
                "primary_exchanges": "NASDAQ, NYSE",
                "local_open": "09:30",
                "local_close": "16:15",
                "current_status": "open",
                "notes": ""
            }]
        })))
        .mount(&server)
        .await;

    let (client, _) = client(&server).await;
    let markets = client.get_market_status().await.unwrap();

    assert_eq!(markets.len(), 1);
    assert_eq!(markets[0].region, "United States");
    assert!(markets[0].is_open());
}

#[tokio::test]
#[ignore = "requires ALPHAVANTAGE_KEY and network access"]
async fn live_price() {
    dipzy_core::logging::init_tracing();
    let credentials = dipzy_core::Credentials::from_env();
    let client = AlphaVantageClient::from_credentials(&credentials).unwrap();
    let table = client.get_price("IBM").await.unwrap();
    assert_eq!(table.len(), 1);
}
