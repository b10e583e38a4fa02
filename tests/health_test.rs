//! Health monitor behaviour: probe classification, snapshot reads, and
//! the stop lifecycle.

use std::time::Duration;

use piiscope::{ClientEvent, HealthState, PiiClient, PoolConfig};
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn health_body() -> serde_json::Value {
    serde_json::json!({
        "status": "healthy",
        "engines": ["presidio", "spacy", "transformers"],
        "version": "1.0.0"
    })
}

fn test_client(url: &str, health_interval: Duration) -> PiiClient {
    PiiClient::builder()
        .service_url(url)
        .pool_config(PoolConfig::new().retry_attempts(0))
        .health_interval(health_interval)
        .build()
        .expect("client should build")
}

fn drain(rx: &mut broadcast::Receiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn fast_probe_reports_healthy_with_engine_list() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(health_body()))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri(), Duration::from_secs(3600));
    let mut rx = client.subscribe();
    let snapshot = client.check_health().await;

    assert_eq!(snapshot.status, HealthState::Healthy);
    assert_eq!(snapshot.available_engines, vec!["presidio", "spacy", "transformers"]);
    assert_eq!(snapshot.version.as_deref(), Some("1.0.0"));
    assert!(snapshot.response_time < Duration::from_secs(1));

    let events = drain(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, ClientEvent::HealthCheckCompleted(s) if s.status == HealthState::Healthy))
    );
}

#[tokio::test]
async fn slow_probe_reports_degraded() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(health_body())
                .set_delay(Duration::from_millis(1200)),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri(), Duration::from_secs(3600));
    let snapshot = client.check_health().await;

    assert_eq!(snapshot.status, HealthState::Degraded);
    assert!(snapshot.response_time >= Duration::from_secs(1));
}

#[tokio::test]
async fn failed_probe_reports_unhealthy_with_no_engines() {
    let client = test_client("http://127.0.0.1:9", Duration::from_secs(3600));
    let mut rx = client.subscribe();
    let snapshot = client.check_health().await;

    assert_eq!(snapshot.status, HealthState::Unhealthy);
    assert!(snapshot.available_engines.is_empty());
    assert!(snapshot.version.is_none());

    let events = drain(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, ClientEvent::HealthCheckFailed { .. }))
    );
}

#[tokio::test]
async fn absent_body_fields_default_to_empty() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "healthy"})))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri(), Duration::from_secs(3600));
    let snapshot = client.check_health().await;

    assert_eq!(snapshot.status, HealthState::Healthy);
    assert!(snapshot.available_engines.is_empty());
    assert!(snapshot.version.is_none());
}

#[tokio::test]
async fn probe_follows_a_short_redirect_chain() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/hop1", mock_server.uri())),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hop1"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/hop2", mock_server.uri())),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hop2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(health_body()))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri(), Duration::from_secs(3600));
    let snapshot = client.check_health().await;

    assert_eq!(snapshot.status, HealthState::Healthy);
    assert_eq!(snapshot.available_engines, vec!["presidio", "spacy", "transformers"]);
}

#[tokio::test]
async fn probe_gives_up_after_three_redirect_hops() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/hop1", mock_server.uri())),
        )
        .mount(&mock_server)
        .await;
    for (from, to) in [("/hop1", "/hop2"), ("/hop2", "/hop3"), ("/hop3", "/hop4")] {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", format!("{}{to}", mock_server.uri())),
            )
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/hop4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(health_body()))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri(), Duration::from_secs(3600));
    let snapshot = client.check_health().await;

    // A fourth hop exceeds the redirect cap, so the probe fails closed.
    assert_eq!(snapshot.status, HealthState::Unhealthy);
    assert!(snapshot.available_engines.is_empty());
}

#[tokio::test]
async fn health_status_reads_snapshot_without_probing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(health_body()))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri(), Duration::from_secs(3600));

    client.check_health().await;
    let snapshot = client.health_status();
    assert_eq!(snapshot.status, HealthState::Healthy);

    // Snapshot reads never hit the network.
    let before = mock_server.received_requests().await.unwrap().len();
    let again = client.health_status();
    assert_eq!(again, snapshot);
    let after = mock_server.received_requests().await.unwrap().len();
    assert_eq!(before, after);
}

#[tokio::test]
async fn monitor_probes_periodically_until_stopped() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(health_body()))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri(), Duration::from_millis(50));
    let mut rx = client.subscribe();

    tokio::time::sleep(Duration::from_millis(180)).await;
    let probes = drain(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, ClientEvent::HealthCheckCompleted(_)))
        .count();
    assert!(probes >= 2, "expected repeated probes, saw {probes}");

    client.stop_health_monitoring();
    tokio::time::sleep(Duration::from_millis(200)).await;
    drain(&mut rx);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let after_stop = drain(&mut rx)
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                ClientEvent::HealthCheckCompleted(_) | ClientEvent::HealthCheckFailed { .. }
            )
        })
        .count();
    assert_eq!(after_stop, 0, "no probes may fire after stop");
}
