use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::batch::BatchResult;
use crate::gateway::VECGATE_STATUS_HEADER;
use crate::outcome::OperationOutcome;
use crate::vectordb::{ErrorKind, VectorDbError};

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Body or path could not be decoded into the expected shape.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Operation(#[from] VectorDbError),

    /// Every document of a batch was rejected.
    #[error("all {} documents in the batch were rejected", .0.total)]
    BatchRejected(Box<BatchResult>),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::InvalidRequest(_) => ErrorKind::ValidationError,
            GatewayError::Operation(e) => e.kind(),
            GatewayError::BatchRejected(result) => result
                .first_error_kind()
                .unwrap_or(ErrorKind::ValidationError),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BatchRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => status_for_kind(self.kind()),
        }
    }
}

/// HTTP status for each error kind.
pub fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::ConnectionError => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::StoreError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let kind = self.kind();

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            VECGATE_STATUS_HEADER,
            HeaderValue::from_static(kind.as_str()),
        );

        let reason = self.to_string();
        match self {
            GatewayError::BatchRejected(result) => {
                let outcome = OperationOutcome::failure(kind, reason).with_payload(*result);
                (status, headers, Json(outcome)).into_response()
            }
            _ => {
                let outcome = OperationOutcome::<()>::failure(kind, reason);
                (status, headers, Json(outcome)).into_response()
            }
        }
    }
}
