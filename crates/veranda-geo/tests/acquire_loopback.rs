//! Aggregator tests against loopback HTTP providers.
//!
//! A tiny axum app plays the IP-geolocation providers so the fan-out,
//! timeout, and failure-isolation behavior is exercised over real sockets.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;

use veranda_geo::{BridgeOutcome, FakeBridge, ProviderSpec, UnsupportedBridge, acquire};
use veranda_types::{Coordinates, FixStatus, ProviderReading};

async fn spawn_provider_server() -> SocketAddr {
    let app = Router::new()
        .route("/ok", get(|| async { r#"{"country":"US"}"# }))
        .route(
            "/fail",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/empty", get(|| async { "" }))
        .route("/garbage", get(|| async { "not json at all" }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                r#"{"country":"US"}"#
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
}

fn spec(name: &str, addr: SocketAddr, path: &str, timeout_ms: u64) -> ProviderSpec {
    ProviderSpec::new(name, format!("http://{addr}{path}"))
        .with_timeout(Duration::from_millis(timeout_ms))
}

fn coords() -> Coordinates {
    Coordinates {
        latitude: 38.72,
        longitude: -9.14,
        accuracy_m: Some(12.0),
        altitude: None,
        altitude_accuracy: None,
        heading: None,
        speed: None,
        timestamp_ms: Some(1_700_000_000_000),
    }
}

#[tokio::test]
async fn every_provider_reported_even_when_most_fail() {
    let addr = spawn_provider_server().await;
    let providers = vec![
        spec("good", addr, "/ok", 2_000),
        spec("http-500", addr, "/fail", 2_000),
        spec("empty-body", addr, "/empty", 2_000),
        spec("bad-json", addr, "/garbage", 2_000),
    ];

    let record = acquire(&providers, &UnsupportedBridge, false, Duration::from_secs(1)).await;

    assert_eq!(record.providers.len(), 4);
    assert_eq!(record.failed_providers(), 3);

    match &record.providers["good"] {
        ProviderReading::Payload(value) => assert_eq!(value["country"], "US"),
        other => panic!("expected payload, got {other:?}"),
    }
    match &record.providers["http-500"] {
        ProviderReading::Failed { error } => assert_eq!(error.status, Some(500)),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_provider_times_out_without_delaying_the_rest() {
    let addr = spawn_provider_server().await;
    let providers = vec![
        spec("slow", addr, "/slow", 300),
        spec("fast", addr, "/ok", 2_000),
    ];

    let started = Instant::now();
    let record = acquire(&providers, &UnsupportedBridge, false, Duration::from_secs(1)).await;
    let elapsed = started.elapsed();

    // Bounded by the slowest timeout, not the sum of response times.
    assert!(elapsed < Duration::from_secs(3), "took {elapsed:?}");

    match &record.providers["slow"] {
        ProviderReading::Failed { error } => {
            assert!(error.message.contains("timeout"), "{}", error.message)
        }
        other => panic!("expected timeout failure, got {other:?}"),
    }
    assert!(!record.providers["fast"].is_failed());
}

#[tokio::test]
async fn precise_fix_success_carries_coordinates() {
    let addr = spawn_provider_server().await;
    let providers = vec![spec("good", addr, "/ok", 2_000)];
    let bridge = FakeBridge::new(BridgeOutcome::Position(coords()));

    let record = acquire(&providers, &bridge, true, Duration::from_secs(1)).await;

    let fix = record.browser.expect("browser fix requested");
    assert_eq!(fix.status, FixStatus::Success);
    assert_eq!(fix.coords, Some(coords()));
    assert!(fix.error.is_none());
    // IP side populated regardless of the precise outcome.
    assert!(!record.providers["good"].is_failed());
}

#[tokio::test]
async fn denied_and_unsupported_outcomes_classified() {
    let providers: Vec<ProviderSpec> = vec![];

    let denied = FakeBridge::new(BridgeOutcome::NoPosition);
    let record = acquire(&providers, &denied, true, Duration::from_secs(1)).await;
    assert_eq!(record.browser.unwrap().status, FixStatus::NoDataOrDenied);

    let unsupported = UnsupportedBridge;
    let record = acquire(&providers, &unsupported, true, Duration::from_secs(1)).await;
    assert_eq!(record.browser.unwrap().status, FixStatus::Unsupported);

    let failed = FakeBridge::new(BridgeOutcome::Failed("permission prompt crashed".into()));
    let record = acquire(&providers, &failed, true, Duration::from_secs(1)).await;
    let fix = record.browser.unwrap();
    assert_eq!(fix.status, FixStatus::Error);
    assert_eq!(fix.error.as_deref(), Some("permission prompt crashed"));
}

#[tokio::test]
async fn stalled_bridge_hits_the_backstop_deadline() {
    let addr = spawn_provider_server().await;
    let providers = vec![spec("good", addr, "/ok", 2_000)];
    let bridge = FakeBridge::new(BridgeOutcome::Position(coords()))
        .with_delay(Duration::from_secs(5));

    let record = acquire(&providers, &bridge, true, Duration::from_millis(200)).await;

    let fix = record.browser.expect("browser fix requested");
    assert_eq!(fix.status, FixStatus::Error);
    assert_eq!(fix.error.as_deref(), Some("timeout"));
    // The stalled bridge did not take the IP lookups down with it.
    assert!(!record.providers["good"].is_failed());
}

#[tokio::test]
async fn without_consent_no_precise_attempt_is_made() {
    let addr = spawn_provider_server().await;
    let providers = vec![spec("good", addr, "/ok", 2_000)];
    // A bridge that would succeed if asked; it must not be asked.
    let bridge = FakeBridge::new(BridgeOutcome::Position(coords()));

    let record = acquire(&providers, &bridge, false, Duration::from_secs(1)).await;

    assert!(record.browser.is_none());
    assert_eq!(record.providers.len(), 1);
}

#[tokio::test]
async fn unreachable_provider_recorded_as_failure() {
    // Bind a port, then drop the listener so nothing accepts.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let providers = vec![spec("dead", addr, "/ok", 1_000)];
    let record = acquire(&providers, &UnsupportedBridge, false, Duration::from_secs(1)).await;

    assert_eq!(record.providers.len(), 1);
    assert!(record.providers["dead"].is_failed());
}
