use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sub-reason attached to [`VectorDbError::Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionFailure {
    /// The endpoint actively refused the connection.
    Refused,
    /// The endpoint is unreachable or shutting down.
    Unavailable,
    /// The call did not complete within the configured timeout.
    Timeout,
    /// Credentials were missing or rejected.
    Auth,
    /// Channel setup, TLS, or another transport-level failure.
    Transport,
}

impl ConnectionFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionFailure::Refused => "refused",
            ConnectionFailure::Unavailable => "unavailable",
            ConnectionFailure::Timeout => "timeout",
            ConnectionFailure::Auth => "auth",
            ConnectionFailure::Transport => "transport",
        }
    }
}

impl std::fmt::Display for ConnectionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
/// Errors returned by vector store operations.
///
/// Every layer of the gateway speaks this type; the HTTP layer is the only
/// place it is turned into a status code.
pub enum VectorDbError {
    /// Malformed or out-of-range input, detected before any network call.
    #[error("validation failed: {reason}")]
    Validation {
        /// Human-readable description of the violated rule.
        reason: String,
    },

    /// Referenced collection or document is absent.
    #[error("not found: {resource}")]
    NotFound {
        /// Description of the missing resource.
        resource: String,
    },

    /// Resource already exists.
    #[error("already exists: {resource}")]
    Conflict {
        /// Description of the conflicting resource.
        resource: String,
    },

    /// Transport or authentication failure talking to the store.
    #[error("connection to vector store failed ({reason}): {message}")]
    Connection {
        /// Failure category.
        reason: ConnectionFailure,
        /// Error message.
        message: String,
    },

    /// Store reported a failure not covered by the other variants.
    #[error("vector store error ({status}): {message}")]
    Store {
        /// Raw status reported by the store.
        status: String,
        /// Raw message reported by the store.
        message: String,
    },
}

impl VectorDbError {
    pub fn validation(reason: impl Into<String>) -> Self {
        VectorDbError::Validation {
            reason: reason.into(),
        }
    }

    pub fn collection_not_found(collection: &str) -> Self {
        VectorDbError::NotFound {
            resource: format!("collection '{}'", collection),
        }
    }

    pub fn document_not_found(collection: &str, id: impl std::fmt::Display) -> Self {
        VectorDbError::NotFound {
            resource: format!("document '{}' in collection '{}'", id, collection),
        }
    }

    pub fn collection_exists(collection: &str) -> Self {
        VectorDbError::Conflict {
            resource: format!("collection '{}'", collection),
        }
    }

    pub fn connection(reason: ConnectionFailure, message: impl Into<String>) -> Self {
        VectorDbError::Connection {
            reason,
            message: message.into(),
        }
    }

    pub fn store(status: impl Into<String>, message: impl Into<String>) -> Self {
        VectorDbError::Store {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Returns the externally visible error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VectorDbError::Validation { .. } => ErrorKind::ValidationError,
            VectorDbError::NotFound { .. } => ErrorKind::NotFound,
            VectorDbError::Conflict { .. } => ErrorKind::Conflict,
            VectorDbError::Connection { .. } => ErrorKind::ConnectionError,
            VectorDbError::Store { .. } => ErrorKind::StoreError,
        }
    }
}

/// Error category reported in every failed outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    NotFound,
    Conflict,
    ConnectionError,
    StoreError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::ConnectionError => "connection_error",
            ErrorKind::StoreError => "store_error",
        }
    }

    /// Only transport failures are worth retrying (with backoff); the gateway
    /// itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::ConnectionError)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
