use std::path::Path;
use std::sync::Arc;

use noshow_ai::{Artifact, ArtifactBundle, PersistedBundle, RiskPolicy};
use noshow_api::app::{AppServices, build_app};
use noshow_features::NeighbourhoodVocabulary;
use noshow_infra::ArtifactStore;
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(store: ArtifactStore) -> Self {
        let services = Arc::new(AppServices::new(Arc::new(store), RiskPolicy::default()));
        let app = build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn dual_bundle() -> PersistedBundle {
    PersistedBundle::new(ArtifactBundle::DualHorizon {
        same_day: Some(Artifact::constant("same_day", 0.2)),
        future: Some(Artifact::constant("future", 0.8)),
        vocabulary: NeighbourhoodVocabulary::fit(["CENTRO", "JABOUR"]),
    })
}

fn loaded_store(dir: &Path, bundle: &PersistedBundle) -> ArtifactStore {
    let path = dir.join("no_show_model.json");
    ArtifactStore::persist(&path, bundle).unwrap();
    ArtifactStore::open(&path).unwrap()
}

fn appointment(appointment_day: &str) -> Value {
    json!({
        "gender": "F",
        "age": 30,
        "neighbourhood": "CENTRO",
        "scholarship": 0,
        "hipertension": 0,
        "diabetes": 0,
        "alcoholism": 0,
        "handcap": 0,
        "sms_received": 0,
        "scheduledday": "2025-11-01T09:30:00Z",
        "appointmentday": appointment_day,
    })
}

async fn predict(client: &reqwest::Client, srv: &TestServer, body: &Value) -> (StatusCode, Value) {
    let res = client
        .post(srv.url("/predict/no-show"))
        .json(body)
        .send()
        .await
        .unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn health_reports_loaded_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dual_bundle();
    let srv = TestServer::spawn(loaded_store(dir.path(), &bundle)).await;

    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["models_loaded"]["operations"], true);
    assert_eq!(body["bundle"]["variant"], "dual_horizon");
    assert_eq!(body["bundle"]["version"], bundle.version.to_string());
    assert_eq!(body["risk_threshold"], 0.5);
}

#[tokio::test]
async fn same_day_and_future_requests_hit_their_models() {
    let dir = tempfile::tempdir().unwrap();
    let srv = TestServer::spawn(loaded_store(dir.path(), &dual_bundle())).await;
    let client = reqwest::Client::new();

    let (status, body) = predict(&client, &srv, &appointment("2025-11-01")).await;
    assert_eq!(status, StatusCode::OK);
    assert!((body["no_show_probability"].as_f64().unwrap() - 0.2).abs() < 1e-9);
    assert_eq!(body["risk_level"], "Low");

    let (status, body) = predict(&client, &srv, &appointment("2025-11-21")).await;
    assert_eq!(status, StatusCode::OK);
    assert!((body["no_show_probability"].as_f64().unwrap() - 0.8).abs() < 1e-9);
    assert_eq!(body["risk_level"], "High");

    let metrics: Value = reqwest::get(srv.url("/metrics")).await.unwrap().json().await.unwrap();
    assert_eq!(metrics["counters"]["predictions_same_day"], 1);
    assert_eq!(metrics["counters"]["predictions_future"], 1);
    assert_eq!(metrics["predictions_total"], 2);
}

#[tokio::test]
async fn unknown_neighbourhood_still_predicts() {
    let dir = tempfile::tempdir().unwrap();
    let srv = TestServer::spawn(loaded_store(dir.path(), &dual_bundle())).await;
    let client = reqwest::Client::new();

    let mut body = appointment("2025-11-21");
    body["neighbourhood"] = json!("ILHA DO BOI");
    let (status, _) = predict(&client, &srv, &body).await;
    assert_eq!(status, StatusCode::OK);

    let metrics: Value = reqwest::get(srv.url("/metrics")).await.unwrap().json().await.unwrap();
    assert_eq!(metrics["counters"]["unknown_neighbourhoods"], 1);
}

#[tokio::test]
async fn invalid_field_is_a_client_error_naming_the_field() {
    let dir = tempfile::tempdir().unwrap();
    let srv = TestServer::spawn(loaded_store(dir.path(), &dual_bundle())).await;
    let client = reqwest::Client::new();

    let mut body = appointment("2025-11-01");
    body["appointmentday"] = json!("next tuesday");
    let (status, err) = predict(&client, &srv, &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "validation_error");
    assert_eq!(err["field"], "appointment_day");

    let mut body = appointment("2025-11-01");
    body.as_object_mut().unwrap().remove("gender");
    let (status, err) = predict(&client, &srv, &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["field"], "gender");
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let srv = TestServer::spawn(loaded_store(dir.path(), &dual_bundle())).await;

    let res = reqwest::Client::new()
        .post(srv.url("/predict/no-show"))
        .header("content-type", "application/json")
        .body("{\"gender\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_json");
}

#[tokio::test]
async fn missing_bundle_is_service_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let srv = TestServer::spawn(ArtifactStore::new(dir.path().join("absent.json"))).await;
    let client = reqwest::Client::new();

    let health: Value = reqwest::get(srv.url("/health")).await.unwrap().json().await.unwrap();
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["models_loaded"]["operations"], false);

    let (status, body) = predict(&client, &srv, &appointment("2025-11-01")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "service_unavailable");
}

#[tokio::test]
async fn reload_swaps_bundle_and_failed_reload_keeps_it() {
    let dir = tempfile::tempdir().unwrap();
    let store = loaded_store(dir.path(), &dual_bundle());
    let path = store.source().to_path_buf();
    let srv = TestServer::spawn(store).await;
    let client = reqwest::Client::new();

    let legacy = PersistedBundle::new(ArtifactBundle::Legacy {
        artifact: Artifact::constant("legacy", 0.6),
    });
    ArtifactStore::persist(&path, &legacy).unwrap();
    let res = client.post(srv.url("/admin/reload")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (_, body) = predict(&client, &srv, &appointment("2025-11-01")).await;
    assert!((body["no_show_probability"].as_f64().unwrap() - 0.6).abs() < 1e-9);
    assert_eq!(body["risk_level"], "High");

    std::fs::write(&path, b"\x80\x04garbage").unwrap();
    let res = client.post(srv.url("/admin/reload")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = predict(&client, &srv, &appointment("2025-11-21")).await;
    assert_eq!(status, StatusCode::OK);
    assert!((body["no_show_probability"].as_f64().unwrap() - 0.6).abs() < 1e-9);
}
