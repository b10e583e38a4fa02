//! Diagnostics surface: statistics composite, in-flight accounting under
//! concurrency, and shutdown semantics.

use std::time::Duration;

use futures_util::future::join_all;
use piiscope::{ClientEvent, HealthState, PiiClient, PoolConfig};
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn analysis_body() -> serde_json::Value {
    serde_json::json!({
        "entities": [],
        "processing_time": 0.05,
        "engine": "hybrid",
        "confidence": 0.0
    })
}

fn drain(rx: &mut broadcast::Receiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn statistics_reflect_configuration_and_state() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/hybrid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis_body()))
        .mount(&mock_server)
        .await;

    let client = PiiClient::builder()
        .service_url(mock_server.uri())
        .pool_config(PoolConfig::new().retry_attempts(7).max_connections(4))
        .health_interval(Duration::from_secs(3600))
        .build()
        .expect("client should build");

    client.analyze_hybrid("some text", None).await.expect("call should succeed");

    let stats = client.statistics();
    assert_eq!(stats.service_url, mock_server.uri());
    assert_eq!(stats.active_requests, 0);
    assert_eq!(stats.cache_size, 1);
    assert_eq!(stats.pool_config.retry_attempts, 7);
    assert_eq!(stats.pool_config.max_connections, 4);
}

#[tokio::test]
async fn in_flight_counter_returns_to_zero_after_mixed_concurrency() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/hybrid"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(analysis_body())
                .set_delay(Duration::from_millis(30)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyze/spacy"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(30)))
        .mount(&mock_server)
        .await;

    let client = PiiClient::builder()
        .service_url(mock_server.uri())
        .pool_config(PoolConfig::new().retry_attempts(0))
        .health_interval(Duration::from_secs(3600))
        .build()
        .expect("client should build");

    let mut calls = Vec::new();
    for i in 0..4 {
        let success_client = client.clone();
        // Distinct texts so the cache cannot short-circuit any of them.
        calls.push(tokio::spawn(async move {
            success_client.analyze_hybrid(&format!("success {i}"), None).await.is_ok()
        }));
        let failure_client = client.clone();
        calls.push(tokio::spawn(async move {
            failure_client
                .analyze_with_engine(piiscope::Engine::Spacy, &format!("failure {i}"), None)
                .await
                .is_ok()
        }));
    }
    let outcomes: Vec<bool> = join_all(calls)
        .await
        .into_iter()
        .map(|r| r.expect("task should not panic"))
        .collect();

    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 4);
    assert_eq!(outcomes.iter().filter(|ok| !**ok).count(), 4);
    assert_eq!(client.statistics().active_requests, 0);
}

#[tokio::test]
async fn shutdown_stops_probes_and_clears_state() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "engines": ["presidio"]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyze/hybrid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis_body()))
        .mount(&mock_server)
        .await;

    let client = PiiClient::builder()
        .service_url(mock_server.uri())
        .health_interval(Duration::from_millis(50))
        .build()
        .expect("client should build");
    let mut rx = client.subscribe();

    client.analyze_hybrid("populate the cache", None).await.expect("call should succeed");
    assert_eq!(client.statistics().cache_size, 1);

    client.shutdown();

    let stats = client.statistics();
    assert_eq!(stats.cache_size, 0);
    assert_eq!(stats.active_requests, 0);
    assert_eq!(stats.health.status, HealthState::Offline);

    // Let any already-started probe settle, then verify silence.
    tokio::time::sleep(Duration::from_millis(120)).await;
    drain(&mut rx);
    tokio::time::sleep(Duration::from_millis(200)).await;
    let events = drain(&mut rx);
    assert!(
        !events.iter().any(|e| {
            matches!(
                e,
                ClientEvent::HealthCheckCompleted(_) | ClientEvent::HealthCheckFailed { .. }
            )
        }),
        "no health events may follow shutdown"
    );
}
