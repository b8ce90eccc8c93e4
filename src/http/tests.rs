//! Tests for the HTTP executor

use super::*;
use crate::config::{ClientOptions, HttpVersion};
use crate::error::Error;
use chrono::Utc;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use test_case::test_case;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(server: &MockServer) -> ClientOptions {
    ClientOptions::builder("TestApp", "1.0")
        .base_url(server.uri())
        .build()
}

fn client(server: &MockServer) -> HttpClient {
    HttpClient::with_options(options(server)).unwrap()
}

fn rate_limited(reset_in_secs: i64) -> ResponseTemplate {
    ResponseTemplate::new(429)
        .insert_header("Rate-Limit-Total", "10")
        .insert_header("Rate-Limit-Remaining", "0")
        .insert_header(
            "Rate-Limit-Reset",
            (Utc::now().timestamp() + reset_in_secs).to_string(),
        )
}

fn recording_sink() -> (ProgressSink, Arc<Mutex<Vec<f64>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let seen = seen.clone();
        ProgressSink::new(move |value| seen.lock().unwrap().push(value))
    };
    (sink, seen)
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[tokio::test]
async fn test_execute_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/maps/latest/0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "docs": [],
            "totalDocs": 0
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let response = tokio_test::assert_ok!(client.get("maps/latest/0").await);

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["totalDocs"], 0);
}

#[tokio::test]
async fn test_user_agent_cannot_be_overridden() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/users/find/abc"))
        .and(header("user-agent", client.user_agent()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = Request::get("users/find/abc").header("User-Agent", "Spoofed/9.9");
    let response = client.execute(&request).await.unwrap();

    assert_eq!(response.status(), 200);
    assert!(client.user_agent().starts_with("TestApp/1.0 beatsaver-client/"));
}

#[tokio::test]
async fn test_request_headers_forwarded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/maps/hot/0"))
        .and(header("X-Request-Id", "req-456"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let response = client
        .execute(&Request::get("/maps/hot/0").header("X-Request-Id", "req-456"))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_non_success_status_is_returned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/maps/detail/zzz"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let response = client.get("maps/detail/zzz").await.unwrap();
    assert_eq!(response.status(), 404);
    assert!(!response.is_success());

    let err = response.error_for_status().unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 404, ref body } if body == "Not Found"));
}

#[tokio::test]
async fn test_rate_limit_retry() {
    let mock_server = MockServer::start().await;

    // First call is throttled with a reset that has already arrived
    Mock::given(method("GET"))
        .and(path("/api/maps/latest/0"))
        .respond_with(rate_limited(0))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/maps/latest/0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let request = Request::get("maps/latest/0").header("X-Custom", "same");
    let response = client.execute(&request).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text(), "ok");

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].url, received[1].url);
    for req in &received {
        assert_eq!(req.headers.get("x-custom").unwrap(), "same");
        assert_eq!(req.headers.get("user-agent").unwrap(), client.user_agent());
    }
}

#[tokio::test]
async fn test_rate_limit_waits_for_reset() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/maps/hot/0"))
        .respond_with(rate_limited(2))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/maps/hot/0"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let started = Instant::now();
    let response = client.get("maps/hot/0").await.unwrap();

    assert_eq!(response.status(), 200);
    // Reset is whole seconds, so at least one full second remained
    assert!(started.elapsed() >= Duration::from_millis(900));
}

#[tokio::test]
async fn test_rate_limit_disabled_fails_fast() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/maps/latest/0"))
        .respond_with(rate_limited(60))
        .mount(&mock_server)
        .await;

    let options = ClientOptions::builder("TestApp", "1.0")
        .base_url(mock_server.uri())
        .handle_rate_limits(false)
        .build();
    let client = HttpClient::with_options(options).unwrap();

    let started = Instant::now();
    let err = tokio_test::assert_err!(client.get("maps/latest/0").await);

    assert!(started.elapsed() < Duration::from_secs(5));
    let info = err.rate_limit().expect("rate limit info");
    assert_eq!(info.limit, 10);
    assert_eq!(info.remaining, 0);
    assert!(info.reset > Utc::now());
    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_rate_limit_retry_bound() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/maps/latest/0"))
        .respond_with(rate_limited(0))
        .mount(&mock_server)
        .await;

    let options = ClientOptions::builder("TestApp", "1.0")
        .base_url(mock_server.uri())
        .max_rate_limit_retries(Some(2))
        .build();
    let client = HttpClient::with_options(options).unwrap();

    let err = client.get("maps/latest/0").await.unwrap_err();

    assert!(matches!(err, Error::RateLimitExceeded { .. }));
    // One initial attempt plus two retries
    assert_eq!(request_count(&mock_server).await, 3);
}

#[tokio::test]
async fn test_cancelled_before_send() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let token = CancellationToken::new();
    token.cancel();

    let err = client
        .execute(&Request::get("maps/latest/0").cancel_token(token))
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(request_count(&mock_server).await, 0);
}

#[tokio::test]
async fn test_cancelled_during_rate_limit_sleep() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/maps/latest/0"))
        .respond_with(rate_limited(60))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let err = client
        .execute(&Request::get("maps/latest/0").cancel_token(token))
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_cancelled_during_body_transfer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/download/big"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 100_000]))
        .mount(&mock_server)
        .await;

    let token = CancellationToken::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let seen = seen.clone();
        let token = token.clone();
        ProgressSink::new(move |value| {
            seen.lock().unwrap().push(value);
            if value > 0.0 && value < 1.0 {
                token.cancel();
            }
        })
    };

    let client = client(&mock_server);
    let err = client
        .execute(
            &Request::get("download/big")
                .cancel_token(token)
                .progress(sink),
        )
        .await
        .unwrap_err();

    assert!(err.is_cancelled());

    // Cancelled after the first partial report, so completion is never reported
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen[0], 0.0);
    assert!(seen.len() >= 2);
    assert!(seen.iter().all(|&v| v < 1.0));
}

#[tokio::test]
async fn test_progress_reports_per_chunk() {
    let mock_server = MockServer::start().await;
    let body = vec![b'x'; 20_000];

    Mock::given(method("GET"))
        .and(path("/api/download/big"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let (sink, seen) = recording_sink();
    let response = client
        .execute(&Request::get("download/big").progress(sink))
        .await
        .unwrap();

    assert_eq!(response.body().len(), body.len());

    // 20_000 bytes is three 8 KiB chunks: 0, three fractions, then 1
    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            0.0,
            8192.0 / 20_000.0,
            16_384.0 / 20_000.0,
            1.0,
            1.0
        ]
    );
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_progress_empty_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let (sink, seen) = recording_sink();
    client
        .execute(&Request::get("maps/latest/0").progress(sink))
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![0.0, 1.0]);
}

#[tokio::test]
async fn test_progress_watch_channel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 10_000]))
        .mount(&mock_server)
        .await;

    let (tx, rx) = tokio::sync::watch::channel(0.0);
    let client = client(&mock_server);
    client
        .execute(&Request::get("maps/latest/0").progress(ProgressSink::watch(tx)))
        .await
        .unwrap();

    assert_eq!(*rx.borrow(), 1.0);
}

#[tokio::test]
async fn test_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let response = client.get("maps/latest/0").await.unwrap();
    let err = response.json::<serde_json::Value>().unwrap_err();

    assert!(matches!(err, Error::JsonParse(_)));
}

#[tokio::test]
async fn test_http1_only_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = ClientOptions::builder("TestApp", "1.0")
        .base_url(mock_server.uri())
        .http_version(HttpVersion::Http1)
        .build();
    let client = HttpClient::with_options(options).unwrap();

    assert_eq!(client.get("maps/latest/0").await.unwrap().status(), 200);
}

#[tokio::test]
async fn test_transport_error_propagates() {
    let options = ClientOptions::builder("TestApp", "1.0")
        .base_url("http://127.0.0.1:1")
        .timeout(Duration::from_secs(5))
        .build();
    let client = HttpClient::with_options(options).unwrap();

    let err = client.get("maps/latest/0").await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}

#[test]
fn test_invalid_options_rejected() {
    let err = HttpClient::with_options(ClientOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[test_case("maps/latest/0", "https://beatsaver.com/api/maps/latest/0" ; "relative path")]
#[test_case("/maps/hot/1", "https://beatsaver.com/api/maps/hot/1" ; "leading slash")]
#[test_case("https://cdn.example.com/cover.jpg", "https://cdn.example.com/cover.jpg" ; "absolute url")]
fn test_build_url(input: &str, expected: &str) {
    let client = HttpClient::with_options(ClientOptions::new("TestApp", "1.0")).unwrap();
    assert_eq!(client.build_url(input), expected);
}

#[test]
fn test_http_client_debug() {
    let client = HttpClient::with_options(ClientOptions::new("TestApp", "1.0")).unwrap();
    let debug_str = format!("{client:?}");
    assert!(debug_str.contains("HttpClient"));
    assert!(debug_str.contains("TestApp"));
}
