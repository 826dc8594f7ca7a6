//! Vector store integration: error taxonomy, wire-neutral model, the
//! [`VectorStore`] trait with its Qdrant adapter, and the connection manager.

pub mod client;
pub mod connection;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::{QdrantStore, VectorStore};
pub use connection::{
    ConnectionHandle, ConnectionManager, DEFAULT_MAX_IN_FLIGHT, DEFAULT_STORE_HOST,
    DEFAULT_STORE_PORT, DEFAULT_TIMEOUT_MS, StoreConfig,
};
pub use error::{ConnectionFailure, ErrorKind, VectorDbError};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockVectorStore;
pub use model::{
    CollectionInfo, CollectionSpec, CollectionStatus, Distance, Document, DocumentId,
    DocumentPatch, Metadata, PointStatus, WriteAck, WriteStatus,
};
