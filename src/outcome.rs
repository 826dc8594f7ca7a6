//! Uniform result envelope returned by every gateway operation.

use serde::{Deserialize, Serialize};

use crate::vectordb::{ErrorKind, VectorDbError};

/// Success flag, error classification and optional payload.
///
/// On failure `error_kind` and `reason` are always set, and `payload` is only
/// present for a fully rejected batch (its per-document report). On success
/// `error_kind` and `reason` are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOutcome<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Whether repeating the same request could succeed.
    #[serde(default)]
    pub retryable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
}

impl<T> OperationOutcome<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            error_kind: None,
            reason: None,
            retryable: false,
            message: None,
            payload: Some(payload),
        }
    }

    /// Success with nothing to return beyond the acknowledgement.
    pub fn ack() -> Self {
        Self {
            success: true,
            error_kind: None,
            reason: None,
            retryable: false,
            message: None,
            payload: None,
        }
    }

    pub fn failure(kind: ErrorKind, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error_kind: Some(kind),
            reason: Some(reason.into()),
            retryable: kind.is_retryable(),
            message: None,
            payload: None,
        }
    }

    pub fn from_error(error: &VectorDbError) -> Self {
        Self::failure(error.kind(), error.to_string())
    }

    pub fn with_payload(mut self, payload: T) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
