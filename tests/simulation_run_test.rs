//! Whole-run behavior of the simulation loops against a mock API.

use petstore_client::auth::CredentialSet;
use petstore_client::PetstoreClient;
use petstore_config::{HttpConfig, SimulationConfig};
use petstore_sim::{Metrics, Simulator};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn simulator_for(
    server_uri: &str,
    config: SimulationConfig,
) -> (Arc<Simulator>, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new());
    let client = PetstoreClient::new(
        server_uri,
        &HttpConfig::default(),
        CredentialSet::with_api_key("test-key"),
    )
    .unwrap()
    .with_observer(metrics.clone());
    (
        Arc::new(Simulator::new(client, metrics.clone(), config)),
        metrics,
    )
}

/// Mock every endpoint the traffic mix can reach.
async fn mount_tolerant_api(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/pet"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 1000, "name": "Duke", "photoUrls": []
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": 200})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/store/order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 600, "petId": 1000, "quantity": 1,
            "shipDate": "2026-09-01T00:00:00Z", "status": "placed", "complete": false
        })))
        .mount(server)
        .await;
    // Lookups, searches, updates and deletes all succeed with no body.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

fn fast_config() -> SimulationConfig {
    SimulationConfig {
        duration: Duration::from_secs(1),
        operations_per_minute: 3000,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_sequential_run_performs_operations_and_reports() {
    let server = MockServer::start().await;
    mount_tolerant_api(&server).await;

    let (sim, metrics) = simulator_for(&server.uri(), fast_config());
    let operations = Arc::clone(&sim).run().await.unwrap();
    assert!(operations > 0, "no operations performed");

    let snapshot = metrics.snapshot();
    assert!(snapshot.total_requests > 0);
    assert_eq!(snapshot.failed_requests, 0);

    let report = sim.final_report().await.unwrap();
    assert!(report.contains("SUMMARY REPORT"));
    assert!(report.contains(&format!("Total Requests: {}", snapshot.total_requests)));
}

#[tokio::test]
async fn test_parallel_run_aggregates_worker_counts() {
    let server = MockServer::start().await;
    mount_tolerant_api(&server).await;

    let config = SimulationConfig {
        parallel: 3,
        maintenance_interval: Duration::from_secs(1),
        ..fast_config()
    };
    let (sim, metrics) = simulator_for(&server.uri(), config);
    let operations = Arc::clone(&sim).run().await.unwrap();
    assert!(operations > 0);
    assert!(metrics.snapshot().total_requests > 0);
}

#[tokio::test]
async fn test_stop_request_ends_run_early() {
    let server = MockServer::start().await;
    mount_tolerant_api(&server).await;

    let config = SimulationConfig {
        duration: Duration::from_secs(600),
        operations_per_minute: 3000,
        ..Default::default()
    };
    let (sim, _metrics) = simulator_for(&server.uri(), config);

    let runner = {
        let sim = Arc::clone(&sim);
        tokio::spawn(async move { sim.run().await })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;
    sim.request_stop();

    let operations = tokio::time::timeout(Duration::from_secs(5), runner)
        .await
        .expect("run did not stop after stop request")
        .unwrap()
        .unwrap();
    assert!(operations > 0);
}

#[tokio::test]
async fn test_run_respects_configured_duration() {
    let server = MockServer::start().await;
    mount_tolerant_api(&server).await;

    let (sim, _metrics) = simulator_for(&server.uri(), fast_config());
    let started = std::time::Instant::now();
    sim.run().await.unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(900), "ended early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(10), "overran: {:?}", elapsed);
}
