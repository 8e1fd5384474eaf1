//! HTTP tests for the candle service router

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use candle_api::{app, AppState};
use market_data::{CandleSeries, CandleSource, GenerateError, RandomWalkGenerator, Timeframe};
use serde_json::Value;
use tower::ServiceExt;

/// Helper: router over a fresh seeded state
fn test_app() -> (Router, AppState) {
    let state = AppState::new(Arc::new(RandomWalkGenerator::seeded(1)));
    (app(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_candles(app: &Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/candles")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get_status(app: &Router) -> Value {
    let request = Request::builder()
        .uri("/api/status")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    body
}

fn candle_times(body: &Value) -> Vec<i64> {
    body["candles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["time"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_status_after_startup() {
    let (app, _) = test_app();
    let body = get_status(&app).await;

    assert_eq!(body["status"], "ready");
    assert_eq!(body["cache_size"], 0);
    assert!(body["note"].is_string());
}

#[tokio::test]
async fn test_fetch_eurusd_5m() {
    let (app, _) = test_app();
    let (status, body) =
        post_candles(&app, r#"{"asset": "EURUSD", "timeframe": "5m", "count": 10}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let times = candle_times(&body);
    assert_eq!(times.len(), 10);
    assert!(times.windows(2).all(|w| w[1] - w[0] == 300_000));

    for candle in body["candles"].as_array().unwrap() {
        let open = candle["open"].as_f64().unwrap();
        let close = candle["close"].as_f64().unwrap();
        assert!(candle["high"].as_f64().unwrap() >= open.max(close));
        assert!(candle["low"].as_f64().unwrap() <= open.min(close));
        assert!(candle["volume"].as_f64().unwrap() >= 0.0);
    }
}

#[tokio::test]
async fn test_defaults_are_fifty_one_minute_candles() {
    let (app, _) = test_app();
    let (status, body) = post_candles(&app, r#"{"asset": "BTCUSD"}"#).await;

    assert_eq!(status, StatusCode::OK);
    let times = candle_times(&body);
    assert_eq!(times.len(), 50);
    assert!(times.windows(2).all(|w| w[1] - w[0] == 60_000));
}

#[tokio::test]
async fn test_unknown_timeframe_uses_one_minute_step() {
    let (app, _) = test_app();
    let (_, body) = post_candles(&app, r#"{"asset": "BTCUSD", "timeframe": "4h", "count": 3}"#).await;

    let times = candle_times(&body);
    assert_eq!(times, vec![times[0], times[0] + 60_000, times[0] + 120_000]);
}

#[tokio::test]
async fn test_missing_asset_is_client_error() {
    let (app, state) = test_app();

    for body in ["{}", r#"{"asset": ""}"#, r#"{"timeframe": "1m", "count": 5}"#] {
        let (status, response) = post_candles(&app, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["error"].as_str().unwrap().contains("asset"));
    }

    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_server_error() {
    let (app, state) = test_app();

    for body in ["", "{not json", "[1, 2]", r#"{"asset": "EURUSD", "count": "ten"}"#] {
        let (status, response) = post_candles(&app, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response["error"].as_str().unwrap().contains("invalid request body"));
    }

    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn test_body_without_content_type() {
    let (app, _) = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/candles")
        .body(Body::from(r#"{"asset": "EURUSD", "count": 2}"#))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(candle_times(&body).len(), 2);
}

#[tokio::test]
async fn test_zero_and_negative_count() {
    let (app, _) = test_app();

    let (_, zero) = post_candles(&app, r#"{"asset": "A", "count": 0}"#).await;
    assert_eq!(zero["success"], true);
    assert!(zero["candles"].as_array().unwrap().is_empty());

    let (_, negative) = post_candles(&app, r#"{"asset": "B", "count": -3}"#).await;
    assert!(negative["candles"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unallocatable_count_is_json_error() {
    let (app, _) = test_app();

    let (status, body) =
        post_candles(&app, r#"{"asset": "X", "count": 1000000000000000}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("cannot allocate"));

    // the failed key is not cached and the service keeps serving
    assert_eq!(get_status(&app).await["cache_size"], 0);
    let (status, body) = post_candles(&app, r#"{"asset": "X", "count": 3}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(candle_times(&body).len(), 3);
}

#[tokio::test]
async fn test_cache_hit_is_identical_and_ignores_count() {
    let (app, _) = test_app();

    let (_, first) = post_candles(&app, r#"{"asset": "EURUSD", "timeframe": "15m", "count": 7}"#).await;
    let (_, second) = post_candles(&app, r#"{"asset": "EURUSD", "timeframe": "15m", "count": 7}"#).await;
    let (_, third) = post_candles(&app, r#"{"asset": "EURUSD", "timeframe": "15m", "count": 100}"#).await;

    assert_eq!(first, second);
    assert_eq!(first, third);
    assert_eq!(candle_times(&third).len(), 7);
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_cache_hit_with_other_count_logs_warning() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let (app, _) = test_app();
    post_candles(&app, r#"{"asset": "EURUSD", "count": 3}"#).await;
    post_candles(&app, r#"{"asset": "EURUSD", "count": 3}"#).await;
    assert!(!String::from_utf8_lossy(&logs.0.lock().unwrap()).contains("request asked for"));

    post_candles(&app, r#"{"asset": "EURUSD", "count": 5}"#).await;
    let output = String::from_utf8_lossy(&logs.0.lock().unwrap()).to_string();
    assert!(output.contains("WARN"));
    assert!(output.contains("Cached series for EURUSD/1m has 3 candles, request asked for 5"));
}

#[tokio::test]
async fn test_cache_size_tracks_distinct_keys() {
    let (app, _) = test_app();

    post_candles(&app, r#"{"asset": "EURUSD", "count": 3}"#).await;
    assert_eq!(get_status(&app).await["cache_size"], 1);

    post_candles(&app, r#"{"asset": "EURUSD", "count": 3}"#).await;
    assert_eq!(get_status(&app).await["cache_size"], 1);

    post_candles(&app, r#"{"asset": "EURUSD", "timeframe": "5m", "count": 3}"#).await;
    assert_eq!(get_status(&app).await["cache_size"], 2);

    post_candles(&app, r#"{"asset": "GBPUSD", "count": 3}"#).await;
    assert_eq!(get_status(&app).await["cache_size"], 3);
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = test_app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

/// Panics for `BOOM`, stalls for `SLOW`, delegates to a seeded generator otherwise.
struct ScriptedSource {
    inner: RandomWalkGenerator,
}

impl CandleSource for ScriptedSource {
    fn generate(
        &self,
        asset: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<CandleSeries, GenerateError> {
        match asset {
            "BOOM" => panic!("generator fault for {asset}"),
            "SLOW" => std::thread::sleep(Duration::from_millis(1500)),
            _ => {}
        }
        self.inner.generate(asset, timeframe, count)
    }
}

fn scripted_app() -> (Router, AppState) {
    let state = AppState::new(Arc::new(ScriptedSource {
        inner: RandomWalkGenerator::seeded(3),
    }));
    (app(state.clone()), state)
}

#[tokio::test]
async fn test_internal_fault_is_isolated() {
    let (app, state) = scripted_app();

    let (status, body) = post_candles(&app, r#"{"asset": "BOOM"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("generator fault for BOOM"));
    assert!(state.cache.is_empty());

    let (status, body) = post_candles(&app, r#"{"asset": "EURUSD", "count": 4}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(candle_times(&body).len(), 4);
    assert_eq!(get_status(&app).await["cache_size"], 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_generation_does_not_delay_other_requests() {
    let (app, _) = scripted_app();

    let slow = {
        let app = app.clone();
        tokio::spawn(async move { post_candles(&app, r#"{"asset": "SLOW", "count": 2}"#).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let status = tokio::time::timeout(Duration::from_millis(500), get_status(&app))
        .await
        .expect("status waited on a generation for another key");
    assert_eq!(status["cache_size"], 0);

    let (code, body) = tokio::time::timeout(
        Duration::from_millis(500),
        post_candles(&app, r#"{"asset": "FAST", "count": 2}"#),
    )
    .await
    .expect("fetch waited on a generation for another key");
    assert_eq!(code, StatusCode::OK);
    assert_eq!(candle_times(&body).len(), 2);

    let (code, _) = slow.await.unwrap();
    assert_eq!(code, StatusCode::OK);
    assert_eq!(get_status(&app).await["cache_size"], 2);
}
