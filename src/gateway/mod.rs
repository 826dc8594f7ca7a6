//! HTTP gateway (Axum) exposing collection and document operations.
//!
//! Every response body is an [`OperationOutcome`] and every response carries
//! the [`VECGATE_STATUS_HEADER`] with `ok` or the error kind.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::*;
pub use state::GatewayState;

use crate::outcome::OperationOutcome;
use crate::vectordb::{ErrorKind, VectorStore};

pub const VECGATE_STATUS_HEADER: &str = "x-vecgate-status";
pub const VECGATE_STATUS_OK: &str = "ok";

pub fn create_router_with_state<S>(state: GatewayState<S>) -> Router
where
    S: VectorStore + 'static,
{
    Router::new()
        .route("/", get(root_handler))
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route(
            "/collections",
            post(create_collection_handler).get(list_collections_handler),
        )
        .route(
            "/collections/{name}",
            get(describe_collection_handler).delete(delete_collection_handler),
        )
        .route(
            "/collections/{name}/documents",
            post(upsert_document_handler),
        )
        .route(
            "/collections/{name}/documents:batch",
            post(batch_ingest_handler),
        )
        .route(
            "/collections/{name}/documents/{id}",
            get(get_document_handler)
                .put(update_document_handler)
                .patch(update_document_handler)
                .delete(delete_document_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds a CORS layer from configured origins. `None` when no origin is set.
pub fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers(Any),
    )
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub store: String,
}

fn ok_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        VECGATE_STATUS_HEADER,
        HeaderValue::from_static(VECGATE_STATUS_OK),
    );
    headers
}

#[tracing::instrument]
pub async fn root_handler() -> Response {
    (
        StatusCode::OK,
        ok_headers(),
        Json(OperationOutcome::<()>::ack().with_message(concat!(
            "vecgate ",
            env!("CARGO_PKG_VERSION"),
            ": vector collection gateway"
        ))),
    )
        .into_response()
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (
        StatusCode::OK,
        ok_headers(),
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

/// 200 when the store answers a health probe, 503 otherwise.
#[tracing::instrument(skip(state))]
pub async fn ready_handler<S>(State(state): State<GatewayState<S>>) -> Response
where
    S: VectorStore + 'static,
{
    let endpoint = state.connections.endpoint().to_string();

    if state.connections.is_healthy().await {
        return (
            StatusCode::OK,
            ok_headers(),
            Json(OperationOutcome::ok(ReadyResponse {
                status: "ready",
                store: endpoint,
            })),
        )
            .into_response();
    }

    let kind = ErrorKind::ConnectionError;
    let mut headers = HeaderMap::new();
    headers.insert(VECGATE_STATUS_HEADER, HeaderValue::from_static(kind.as_str()));

    (
        StatusCode::SERVICE_UNAVAILABLE,
        headers,
        Json(OperationOutcome::<()>::failure(
            kind,
            format!("vector store at {} is not reachable", endpoint),
        )),
    )
        .into_response()
}
