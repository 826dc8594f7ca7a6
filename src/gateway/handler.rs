use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::gateway::error::GatewayError;
use crate::gateway::payload::{
    BatchRequest, CollectionDeleted, CollectionList, CreateCollectionRequest, DocumentDeleted,
    DocumentRequest, PatchRequest, parse_body,
};
use crate::gateway::state::GatewayState;
use crate::gateway::{VECGATE_STATUS_HEADER, VECGATE_STATUS_OK};
use crate::outcome::OperationOutcome;
use crate::vectordb::{DocumentId, VectorStore};

/// Wraps a successful payload in the outcome envelope with the `ok` header.
pub fn make_response<T: Serialize>(status: StatusCode, outcome: OperationOutcome<T>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        VECGATE_STATUS_HEADER,
        HeaderValue::from_static(VECGATE_STATUS_OK),
    );
    (status, headers, Json(outcome)).into_response()
}

fn parse_id(raw: &str) -> Result<DocumentId, GatewayError> {
    Ok(raw.parse::<DocumentId>()?)
}

#[instrument(skip(state, body))]
pub async fn create_collection_handler<S>(
    State(state): State<GatewayState<S>>,
    body: Bytes,
) -> Result<Response, GatewayError>
where
    S: VectorStore + 'static,
{
    let request: CreateCollectionRequest = parse_body(&body)?;
    let dimensions = request.dimensions.value()?;

    let spec = state
        .registry
        .create(&request.name, dimensions, &request.distance)
        .await?;

    Ok(make_response(
        StatusCode::CREATED,
        OperationOutcome::ok(spec).with_message("collection created"),
    ))
}

#[instrument(skip(state))]
pub async fn list_collections_handler<S>(
    State(state): State<GatewayState<S>>,
) -> Result<Response, GatewayError>
where
    S: VectorStore + 'static,
{
    let collections = state.registry.list().await?;
    Ok(make_response(
        StatusCode::OK,
        OperationOutcome::ok(CollectionList { collections }),
    ))
}

#[instrument(skip(state))]
pub async fn describe_collection_handler<S>(
    State(state): State<GatewayState<S>>,
    Path(name): Path<String>,
) -> Result<Response, GatewayError>
where
    S: VectorStore + 'static,
{
    let info = state.registry.describe(&name).await?;
    Ok(make_response(StatusCode::OK, OperationOutcome::ok(info)))
}

#[instrument(skip(state))]
pub async fn delete_collection_handler<S>(
    State(state): State<GatewayState<S>>,
    Path(name): Path<String>,
) -> Result<Response, GatewayError>
where
    S: VectorStore + 'static,
{
    state.registry.delete(&name).await?;
    Ok(make_response(
        StatusCode::ACCEPTED,
        OperationOutcome::ok(CollectionDeleted { name }).with_message("collection deleted"),
    ))
}

#[instrument(skip(state, body))]
pub async fn upsert_document_handler<S>(
    State(state): State<GatewayState<S>>,
    Path(collection): Path<String>,
    body: Bytes,
) -> Result<Response, GatewayError>
where
    S: VectorStore + 'static,
{
    let request: DocumentRequest = parse_body(&body)?;
    let document = request.into_document();

    let written = state.documents.upsert(&collection, document).await?;
    Ok(make_response(StatusCode::CREATED, OperationOutcome::ok(written)))
}

#[instrument(skip(state))]
pub async fn get_document_handler<S>(
    State(state): State<GatewayState<S>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Response, GatewayError>
where
    S: VectorStore + 'static,
{
    let id = parse_id(&id)?;
    let document = state.documents.get(&collection, &id).await?;
    Ok(make_response(StatusCode::OK, OperationOutcome::ok(document)))
}

#[instrument(skip(state, body))]
pub async fn update_document_handler<S>(
    State(state): State<GatewayState<S>>,
    Path((collection, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response, GatewayError>
where
    S: VectorStore + 'static,
{
    let id = parse_id(&id)?;
    let request: PatchRequest = parse_body(&body)?;

    let updated = state
        .documents
        .update(&collection, &id, request.into())
        .await?;
    Ok(make_response(StatusCode::OK, OperationOutcome::ok(updated)))
}

#[instrument(skip(state))]
pub async fn delete_document_handler<S>(
    State(state): State<GatewayState<S>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Response, GatewayError>
where
    S: VectorStore + 'static,
{
    let id = parse_id(&id)?;
    let ack = state.documents.delete(&collection, &id).await?;
    Ok(make_response(
        StatusCode::OK,
        OperationOutcome::ok(DocumentDeleted { id, ack }),
    ))
}

#[instrument(skip(state, body))]
pub async fn batch_ingest_handler<S>(
    State(state): State<GatewayState<S>>,
    Path(collection): Path<String>,
    body: Bytes,
) -> Result<Response, GatewayError>
where
    S: VectorStore + 'static,
{
    let request: BatchRequest = parse_body(&body)?;
    let result = state
        .batch
        .ingest(&collection, request.into_entries())
        .await?;
    if !result.is_success() {
        return Err(GatewayError::BatchRejected(Box::new(result)));
    }

    debug!(
        accepted = result.accepted,
        rejected = result.rejected,
        "Batch request handled"
    );
    let message = format!("{} of {} documents accepted", result.accepted, result.total);
    Ok(make_response(
        StatusCode::ACCEPTED,
        OperationOutcome::ok(result).with_message(message),
    ))
}
