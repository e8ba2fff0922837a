use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use api::{app, AppState};
use common::{now_ts, Tick, TickStore};
use store::MemoryTickStore;

async fn test_app() -> Router {
    app_with_prices(&[("100.0", 50), ("101.5", 40), ("102.25", 30)]).await
}

/// Router over a store holding BTC-USD ticks given as `(price, age_secs)`.
async fn app_with_prices(prices: &[(&str, i64)]) -> Router {
    let store = Arc::new(MemoryTickStore::new());
    let now = now_ts();
    for &(exact, age) in prices {
        store
            .insert_tick(&Tick {
                instrument: "BTC-USD".to_string(),
                price_exact: exact.to_string(),
                price_value: Decimal::from_str(exact).unwrap(),
                currency: "USD".to_string(),
                observed_at: now - age,
                ingested_at: now - age,
            })
            .await
            .unwrap();
    }
    app(AppState {
        store,
        instruments: Arc::new(vec!["BTC-USD".to_string(), "ETH-USD".to_string()]),
        app_user: "admin".to_string(),
        app_pass: "hunter2".to_string(),
    })
}

fn get(uri: &str, credentials: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(c) = credentials {
        builder = builder.header(header::AUTHORIZATION, format!("Basic {}", STANDARD.encode(c)));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

const AUTH: Option<&str> = Some("admin:hunter2");

#[tokio::test]
async fn healthz_needs_no_credentials() {
    let (status, json) = send(test_app().await, get("/healthz", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["instruments"][1], "ETH-USD");
}

#[tokio::test]
async fn data_routes_require_basic_auth() {
    let app = test_app().await;
    for creds in [None, Some("admin:wrong"), Some("root:hunter2")] {
        let resp = app.clone().oneshot(get("/api/table", creds)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers()[header::WWW_AUTHENTICATE], "Basic");
    }
}

#[tokio::test]
async fn table_lists_every_configured_instrument() {
    let (status, json) = send(test_app().await, get("/api/table", AUTH)).await;
    assert_eq!(status, StatusCode::OK);

    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["instrument"], "BTC-USD");
    assert_eq!(rows[0]["last_price"], "102.25");
    assert_eq!(rows[0]["high_1h"], "102.25");
    assert_eq!(rows[0]["low_1h"], "100.0");
    assert_eq!(rows[0]["pct_change_24h"], "2.25");
    assert_eq!(rows[0]["signal"], "-");

    // No data at all: every figure is null, signal neutral.
    assert_eq!(rows[1]["last_price"], Value::Null);
    assert_eq!(rows[1]["avg_1h"], Value::Null);
    assert_eq!(rows[1]["signal"], "-");
}

#[tokio::test]
async fn arrays_accepts_any_case() {
    let (status, json) = send(test_app().await, get("/api/arrays/SECOND/btc-usd", AUTH)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["crypto"], "BTC-USD");
    assert_eq!(json["resolution"], "second");

    let prices: Vec<&str> = json["points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["price"].as_str().unwrap())
        .collect();
    assert_eq!(prices, vec!["100.0", "101.5", "102.25"]);
}

#[tokio::test]
async fn ohlc_returns_candles() {
    let (status, json) = send(test_app().await, get("/api/ohlc/day/BTC-USD", AUTH)).await;
    assert_eq!(status, StatusCode::OK);
    let candles = json["candles"].as_array().unwrap();
    assert!(!candles.is_empty());
    let last = candles.last().unwrap();
    assert_eq!(last["close"], "102.25");
}

#[tokio::test]
async fn unknown_resolution_is_400() {
    let (status, json) = send(test_app().await, get("/api/arrays/week/BTC-USD", AUTH)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("week"));
}

#[tokio::test]
async fn second_candles_are_400() {
    let (status, _) = send(test_app().await, get("/api/ohlc/second/BTC-USD", AUTH)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn prices_past_decimal_range_are_422_not_a_crash() {
    let max = Decimal::MAX.to_string();
    let app = app_with_prices(&[(&max, 40), (&max, 40)]).await;

    let (status, json) = send(app.clone(), get("/api/table", AUTH)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("overflow"));

    let (status, _) = send(app, get("/api/arrays/hour/BTC-USD", AUTH)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
