//! Vecgate library crate (used by the server binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Store Integration
//! - [`VectorStore`] - async contract every store adapter implements
//! - [`QdrantStore`] - Qdrant gRPC adapter
//! - [`ConnectionManager`], [`StoreConfig`] - shared client, in-flight limit, per-call timeout
//! - [`VectorDbError`], [`ErrorKind`] - error taxonomy surfaced to callers
//!
//! ## Operations
//! - [`CollectionRegistry`] - create, list, describe, delete collections
//! - [`DocumentGateway`] - upsert, get, update, delete single documents
//! - [`BatchIngestor`], [`BatchResult`] - chunked concurrent ingestion
//! - [`OperationOutcome`] - uniform result envelope
//!
//! ## Server
//! - [`Config`], [`ConfigError`] - environment-backed configuration
//! - [`gateway`] - Axum router and handlers
//!
//! ## Test/Mock Support
//! [`MockVectorStore`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod batch;
pub mod config;
pub mod documents;
pub mod gateway;
pub mod outcome;
pub mod registry;
pub mod vectordb;

pub use batch::{BatchConfig, BatchIngestor, BatchResult, BatchStatus, ItemOutcome, ItemStatus};
pub use config::{Config, ConfigError};
pub use documents::DocumentGateway;
pub use outcome::OperationOutcome;
pub use registry::CollectionRegistry;

#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockVectorStore;
pub use vectordb::{
    CollectionInfo, CollectionSpec, ConnectionManager, Distance, Document, DocumentId,
    DocumentPatch, ErrorKind, Metadata, QdrantStore, StoreConfig, VectorDbError, VectorStore,
    WriteAck,
};
