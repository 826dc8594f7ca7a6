//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::batch::BatchConfig;
use crate::gateway::{GatewayState, VECGATE_STATUS_HEADER, create_router_with_state};
use crate::vectordb::{ConnectionManager, MockVectorStore, StoreConfig};

fn test_app() -> (Router, MockVectorStore) {
    let store = MockVectorStore::new();
    let manager = ConnectionManager::new(store.clone(), &StoreConfig::default());
    let state = GatewayState::new(manager, BatchConfig::default().chunk_size(2));
    (create_router_with_state(state), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String, Value) {
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let header = response
        .headers()
        .get(VECGATE_STATUS_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("missing")
        .to_string();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, header, json)
}

async fn create_collection(app: &Router, name: &str, dims: u64) {
    let (status, _, _) = send(
        app,
        Method::POST,
        "/collections",
        Some(json!({"name": name, "dimensions": dims, "distance": "cosine"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_health_and_root() {
    let (app, _) = test_app();

    let (status, header, body) = send(&app, Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(header, "ok");
    assert_eq!(body["status"], "ok");

    let (status, _, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().contains("vecgate"));
}

#[tokio::test]
async fn test_ready_reflects_store_health() {
    let (app, store) = test_app();

    let (status, _, _) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);

    store.set_unavailable(true);
    let (status, header, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(header, "connection_error");
    assert_eq!(body["retryable"], true);
}

#[tokio::test]
async fn test_create_collection_echoes_schema() {
    let (app, _) = test_app();

    let (status, header, body) = send(
        &app,
        Method::POST,
        "/collections",
        Some(json!({"name": "docs", "dimensions": "8", "distance": "dot"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(header, "ok");
    assert_eq!(body["success"], true);
    assert_eq!(body["payload"]["dimensions"], 8);
    assert_eq!(body["payload"]["distance"], "dot");
}

#[tokio::test]
async fn test_create_collection_defaults_to_cosine() {
    let (app, _) = test_app();

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/collections",
        Some(json!({"name": "docs", "dimensions": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["payload"]["distance"], "cosine");
}

#[tokio::test]
async fn test_create_collection_error_mapping() {
    let (app, _) = test_app();
    create_collection(&app, "docs", 4).await;

    let (status, header, body) = send(
        &app,
        Method::POST,
        "/collections",
        Some(json!({"name": "docs", "dimensions": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(header, "conflict");
    assert_eq!(body["success"], false);
    assert_eq!(body["error_kind"], "conflict");
    assert!(body.get("payload").is_none());

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/collections",
        Some(json!({"name": "other", "dimensions": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_kind"], "validation_error");

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/collections",
        Some(json!({"name": "other", "dimensions": 4, "distance": "hamming"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let (app, _) = test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/collections")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error_kind"], "validation_error");
    assert!(body["reason"].as_str().unwrap().contains("Invalid request schema"));
}

#[tokio::test]
async fn test_collection_lifecycle_routes() {
    let (app, _) = test_app();

    let (status, _, body) = send(&app, Method::GET, "/collections", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["collections"], json!([]));

    create_collection(&app, "beta", 3).await;
    create_collection(&app, "alpha", 3).await;

    let (_, _, body) = send(&app, Method::GET, "/collections", None).await;
    assert_eq!(body["payload"]["collections"], json!(["alpha", "beta"]));

    let (status, _, body) = send(&app, Method::GET, "/collections/alpha", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["dimensions"], 3);
    assert_eq!(body["payload"]["points_count"], 0);

    let (status, _, _) = send(&app, Method::DELETE, "/collections/alpha", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, header, _) = send(&app, Method::GET, "/collections/alpha", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(header, "not_found");

    let (status, _, _) = send(&app, Method::DELETE, "/collections/alpha", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_document_routes_round_trip() {
    let (app, _) = test_app();
    create_collection(&app, "docs", 3).await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/collections/docs/documents",
        Some(json!({"id": 42, "vector": [0.1, 0.2, 0.3], "metadata": {"lang": "en"}})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["payload"]["id"], 42);

    let (status, _, body) = send(&app, Method::GET, "/collections/docs/documents/42", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["metadata"]["lang"], "en");

    let (status, _, body) = send(
        &app,
        Method::PATCH,
        "/collections/docs/documents/42",
        Some(json!({"metadata": {"lang": "de"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["metadata"]["lang"], "de");
    assert_eq!(body["payload"]["vector"].as_array().unwrap().len(), 3);

    let (status, _, _) = send(
        &app,
        Method::PUT,
        "/collections/docs/documents/42",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = send(&app, Method::DELETE, "/collections/docs/documents/42", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["status"], "completed");

    let (status, _, _) = send(&app, Method::GET, "/collections/docs/documents/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upsert_without_id_assigns_uuid() {
    let (app, _) = test_app();
    create_collection(&app, "docs", 2).await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/collections/docs/documents",
        Some(json!({"vector": [1.0, 0.0]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = body["payload"]["id"].as_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    let (status, _, _) = send(
        &app,
        Method::GET,
        &format!("/collections/docs/documents/{}", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_document_validation_errors() {
    let (app, _) = test_app();
    create_collection(&app, "docs", 3).await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/collections/docs/documents",
        Some(json!({"id": 1, "vector": [0.1, 0.2]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_kind"], "validation_error");

    let (status, _, _) = send(&app, Method::GET, "/collections/docs/documents/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/collections/missing/documents",
        Some(json!({"id": 1, "vector": [0.1, 0.2, 0.3]})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_batch_route_reports_per_document() {
    let (app, _) = test_app();
    create_collection(&app, "docs", 2).await;

    let (status, header, body) = send(
        &app,
        Method::POST,
        "/collections/docs/documents:batch",
        Some(json!({"documents": [
            {"id": 1, "vector": [0.1, 0.2]},
            {"id": 2, "vector": [0.1, 0.2, 0.3]},
            {"id": 3, "vector": [0.3, 0.4]}
        ]})),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(header, "ok");
    let payload = &body["payload"];
    assert_eq!(payload["accepted"], 2);
    assert_eq!(payload["rejected"], 1);
    assert_eq!(payload["status"], "partial");
    assert_eq!(payload["items"][1]["status"], "rejected");
    assert_eq!(payload["items"][1]["error_kind"], "validation_error");
}

#[tokio::test]
async fn test_batch_route_rejects_undecodable_item_in_place() {
    let (app, store) = test_app();
    create_collection(&app, "docs", 2).await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/collections/docs/documents:batch",
        Some(json!({"documents": [
            {"id": 1, "vector": [0.1, 0.2]},
            {"id": "not-a-uuid", "vector": [0.1, 0.2]},
            {"id": 3, "vector": "oops"},
            {"id": 4, "vector": [0.3, 0.4]}
        ]})),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    let payload = &body["payload"];
    assert_eq!(payload["total"], 4);
    assert_eq!(payload["accepted"], 2);
    assert_eq!(payload["items"][1]["status"], "rejected");
    assert_eq!(payload["items"][1]["error_kind"], "validation_error");
    assert!(payload["items"][1].get("id").is_none());
    assert_eq!(payload["items"][2]["id"], 3);
    assert_eq!(payload["items"][2]["error_kind"], "validation_error");
    assert_eq!(store.point_count("docs"), Some(2));
}

#[tokio::test]
async fn test_batch_route_error_statuses() {
    let (app, _) = test_app();
    create_collection(&app, "docs", 2).await;

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/collections/missing/documents:batch",
        Some(json!({"documents": [{"id": 1, "vector": [0.1, 0.2]}]})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/collections/missing/documents:batch",
        Some(json!({"documents": []})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/collections/docs/documents:batch",
        Some(json!({"documents": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, header, body) = send(
        &app,
        Method::POST,
        "/collections/docs/documents:batch",
        Some(json!({"documents": [{"id": 1, "vector": [0.1]}]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(header, "validation_error");
    assert_eq!(body["success"], false);
    assert_eq!(body["payload"]["status"], "failed");
}

#[tokio::test]
async fn test_unavailable_store_maps_to_503() {
    let (app, store) = test_app();
    store.set_unavailable(true);

    let (status, header, body) = send(&app, Method::GET, "/collections", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(header, "connection_error");
    assert_eq!(body["error_kind"], "connection_error");
    assert_eq!(body["retryable"], true);
}
