//! Binance futures REST client against a mocked exchange

use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;
use signalwatch::models::Cycle;
use signalwatch::services::binance::BinanceFuturesClient;
use signalwatch::services::market_data::{MarketDataError, MarketDataProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> BinanceFuturesClient {
    BinanceFuturesClient::new(format!("{}/", server.uri()), Duration::from_secs(5))
        .expect("client builds")
}

fn kline_row(open_time: i64, close: &str) -> serde_json::Value {
    json!([
        open_time,
        "100.0",
        "110.0",
        "90.0",
        close,
        "10.5",
        open_time + 3_599_999,
        "1050.0",
        42,
        "6.3",
        "630.0",
        "0"
    ])
}

#[tokio::test]
async fn klines_are_parsed_into_candles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "1h"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kline_row(1_792_281_600_000, "105.0"),
            kline_row(1_792_285_200_000, "107.5"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let candles = client(&server)
        .get_candles("BTCUSDT", Cycle::OneHour, 2)
        .await
        .unwrap();

    assert_eq!(candles.len(), 2);
    let first = &candles[0];
    assert_eq!(first.open_time, Utc.timestamp_millis_opt(1_792_281_600_000).unwrap());
    assert_eq!(first.close_time, Utc.timestamp_millis_opt(1_792_285_199_999).unwrap());
    assert_eq!(first.open, 100.0);
    assert_eq!(first.high, 110.0);
    assert_eq!(first.low, 90.0);
    assert_eq!(first.close, 105.0);
    assert_eq!(first.volume, 10.5);
    assert_eq!(first.quote_volume, 1050.0);
    assert_eq!(first.trade_count, 42);
    assert_eq!(first.taker_buy_volume, 6.3);
    assert_eq!(first.taker_buy_quote_volume, 630.0);
    assert!((first.taker_buy_ratio() - 60.0).abs() < 1e-9);
    assert_eq!(candles[1].close, 107.5);
}

#[tokio::test]
async fn month_cycle_uses_exchange_label() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/klines"))
        .and(query_param("interval", "1M"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let candles = client(&server)
        .get_candles("BTCUSDT", Cycle::OneMonth, 250)
        .await
        .unwrap();
    assert!(candles.is_empty());
}

#[tokio::test]
async fn bad_request_means_symbol_not_supported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/klines"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"code": -1121, "msg": "Invalid symbol."})),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .get_candles("FOOUSDT", Cycle::OneHour, 250)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::SymbolNotSupported(ref s) if s == "FOOUSDT"));
}

#[tokio::test]
async fn server_error_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/klines"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_candles("BTCUSDT", Cycle::OneHour, 250)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Api(_)));
}

#[tokio::test]
async fn malformed_klines_are_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/klines"))
        .and(query_param("symbol", "ETHUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[1_792_281_600_000_i64, "1.0", "2.0"]])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/klines"))
        .and(query_param("symbol", "SOLUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([kline_row(1_792_281_600_000, "n/a")])))
        .mount(&server)
        .await;

    let client = client(&server);
    for symbol in ["BTCUSDT", "ETHUSDT", "SOLUSDT"] {
        let err = client.get_candles(symbol, Cycle::OneHour, 250).await.unwrap_err();
        assert!(matches!(err, MarketDataError::Malformed(_)), "{} should be malformed", symbol);
    }
}

#[tokio::test]
async fn funding_quote_from_premium_index() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/premiumIndex"))
        .and(query_param("symbol", "BTCUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symbol": "BTCUSDT",
            "markPrice": "65000.10000000",
            "indexPrice": "64990.00000000",
            "lastFundingRate": "0.00010000",
            "interestRate": "0.00010000",
            "nextFundingTime": 1_792_310_400_000_i64,
            "time": 1_792_281_600_000_i64
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/premiumIndex"))
        .and(query_param("symbol", "ETHUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symbol": "ETHUSDT",
            "lastFundingRate": "-0.00025000",
            "nextFundingTime": 0
        })))
        .mount(&server)
        .await;

    let client = client(&server);

    let btc = client.get_funding_quote("BTCUSDT").await.unwrap();
    assert!((btc.rate - 0.0001).abs() < 1e-12);
    assert_eq!(btc.next_funding_time, Utc.timestamp_millis_opt(1_792_310_400_000).single());

    let eth = client.get_funding_quote("ETHUSDT").await.unwrap();
    assert!((eth.rate + 0.00025).abs() < 1e-12);
    assert!(eth.next_funding_time.is_none());
}

#[tokio::test]
async fn funding_intervals_are_listed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/fundingInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "symbol": "BTCUSDT",
                "adjustedFundingRateCap": "0.02000000",
                "adjustedFundingRateFloor": "-0.02000000",
                "fundingIntervalHours": 8,
                "disclaimer": false
            },
            {
                "symbol": "BLZUSDT",
                "adjustedFundingRateCap": "0.03000000",
                "adjustedFundingRateFloor": "-0.03000000",
                "fundingIntervalHours": 4,
                "disclaimer": false
            }
        ])))
        .mount(&server)
        .await;

    let intervals = client(&server).get_funding_intervals().await.unwrap();
    assert_eq!(intervals.len(), 2);
    assert_eq!(intervals[0].symbol, "BTCUSDT");
    assert_eq!(intervals[0].interval_hours, 8);
    assert_eq!(intervals[1].symbol, "BLZUSDT");
    assert_eq!(intervals[1].interval_hours, 4);
}

#[tokio::test]
async fn ticker_listing_skips_invalid_prices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/ticker/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "symbol": "BTCUSDT", "price": "65000.10", "time": 1_792_281_600_000_i64 },
            { "symbol": "BROKEN", "price": "abc", "time": 1_792_281_600_000_i64 },
            { "symbol": "ETHUSDT", "price": "3200.5", "time": 1_792_281_600_000_i64 }
        ])))
        .mount(&server)
        .await;

    let listing = client(&server).list_symbols().await.unwrap();
    assert_eq!(
        listing,
        vec![("BTCUSDT".to_string(), 65000.10), ("ETHUSDT".to_string(), 3200.5)]
    );
}

#[tokio::test]
async fn base_url_is_normalized() {
    let client = BinanceFuturesClient::new("http://localhost:9000///", Duration::from_secs(1)).unwrap();
    assert_eq!(client.base_url(), "http://localhost:9000");
}
