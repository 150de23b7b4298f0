//! Lazy reconciliation of the local entity mirror: a 404 on a tracked id
//! removes it, and the next maintenance pass restores the population.

use petstore_client::auth::CredentialSet;
use petstore_client::PetstoreClient;
use petstore_config::{HttpConfig, SimulationConfig};
use petstore_sim::{Metrics, OpKind, Simulator};
use std::sync::Arc;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn simulator_for(server_uri: &str, config: SimulationConfig) -> Arc<Simulator> {
    let metrics = Arc::new(Metrics::new());
    let client = PetstoreClient::new(
        server_uri,
        &HttpConfig::default(),
        CredentialSet::with_api_key("test-key"),
    )
    .unwrap()
    .with_observer(metrics.clone());
    Arc::new(Simulator::new(client, metrics, config))
}

#[tokio::test]
async fn test_stale_pet_forgotten_then_recreated() {
    let server = MockServer::start().await;

    // Every tracked pet has vanished remotely.
    Mock::given(method("GET"))
        .and(path_regex(r"^/pet/\d+$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pet"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 900, "name": "Rocky", "photoUrls": []
        })))
        .mount(&server)
        .await;

    let config = SimulationConfig {
        min_pets: 1,
        min_users: 0,
        min_orders: 0,
        ..Default::default()
    };
    let sim = simulator_for(&server.uri(), config);
    sim.tracker().pet_created(77).await.unwrap();

    sim.execute(OpKind::GetPet).await.unwrap();
    assert_eq!(sim.tracker().counts().await.unwrap().pets, 0);

    // A second lookup on the same stale id must be impossible: nothing
    // is tracked, so the operation falls back to a create.
    sim.execute(OpKind::GetPet).await.unwrap();
    assert_eq!(sim.tracker().counts().await.unwrap().pets, 1);

    // Maintenance sees no remaining shortfall.
    sim.ensure_minimum_entities().await.unwrap();
    assert_eq!(sim.tracker().counts().await.unwrap().pets, 1);
}

#[tokio::test]
async fn test_stale_user_forgotten_on_update_404() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path_regex(r"^/user/.+$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let sim = simulator_for(&server.uri(), SimulationConfig::default());
    sim.tracker()
        .user_created("user_ghosted".to_string())
        .await
        .unwrap();

    sim.execute(OpKind::UpdateUser).await.unwrap();
    assert_eq!(sim.tracker().counts().await.unwrap().users, 0);
}

#[tokio::test]
async fn test_stale_order_forgotten_on_get_404() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/store/order/\d+$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let sim = simulator_for(&server.uri(), SimulationConfig::default());
    sim.tracker().order_created(31).await.unwrap();

    sim.execute(OpKind::GetOrder).await.unwrap();
    assert_eq!(sim.tracker().counts().await.unwrap().orders, 0);
}

#[tokio::test]
async fn test_delete_on_vanished_order_clears_tracking() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path_regex(r"^/store/order/\d+$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    // min_orders 0 so the deletion guard lets every id through.
    let config = SimulationConfig {
        min_orders: 0,
        ..Default::default()
    };
    let sim = simulator_for(&server.uri(), config);
    sim.tracker().order_created(88).await.unwrap();

    sim.execute(OpKind::DeleteOrder).await.unwrap();
    assert_eq!(sim.tracker().counts().await.unwrap().orders, 0);
}

#[tokio::test]
async fn test_server_error_keeps_user_tracked() {
    let server = MockServer::start().await;

    // A 500 is not proof of absence; the user stays tracked.
    Mock::given(method("GET"))
        .and(path_regex(r"^/user/.+$"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sim = simulator_for(&server.uri(), SimulationConfig::default());
    sim.tracker()
        .user_created("user_flaky".to_string())
        .await
        .unwrap();

    sim.execute(OpKind::GetUser).await.unwrap();
    assert_eq!(sim.tracker().counts().await.unwrap().users, 1);
}
