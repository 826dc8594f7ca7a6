//! Point-level operations scoped to one collection.

pub mod validate;


use tracing::{debug, instrument};

use crate::vectordb::{
    ConnectionManager, Document, DocumentId, DocumentPatch, PointStatus, VectorDbError,
    VectorStore, WriteAck,
};

pub use validate::{validate_document, validate_patch, validate_vector};

/// Validates and executes upsert/get/update/delete for single documents.
pub struct DocumentGateway<S> {
    connections: ConnectionManager<S>,
}

impl<S: VectorStore> DocumentGateway<S> {
    pub fn new(connections: ConnectionManager<S>) -> Self {
        Self { connections }
    }

    /// Creates or fully replaces a point and returns what was written.
    #[instrument(skip(self, document), fields(id = %document.id))]
    pub async fn upsert(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<Document, VectorDbError> {
        let handle = self.connections.acquire().await?;

        let info = handle.run(|store| store.collection_info(collection)).await?;
        validate_document(&document, info.dimensions)?;

        let statuses = handle
            .run(|store| store.upsert_points(collection, vec![document.clone()]))
            .await?;

        match statuses.into_iter().next() {
            Some(PointStatus::Accepted) => {
                debug!(collection, "Document upserted");
                Ok(document)
            }
            Some(PointStatus::Rejected(e)) => Err(e),
            None => Err(VectorDbError::store(
                "empty_response",
                "store returned no status for the written point",
            )),
        }
    }

    #[instrument(skip(self, id), fields(id = %id))]
    pub async fn get(&self, collection: &str, id: &DocumentId) -> Result<Document, VectorDbError> {
        let handle = self.connections.acquire().await?;
        handle
            .run(|store| store.get_point(collection, id))
            .await?
            .ok_or_else(|| VectorDbError::document_not_found(collection, id))
    }

    /// Applies only the fields present in `patch`; omitted fields keep their
    /// stored values. Returns the resulting document.
    #[instrument(skip(self, id, patch), fields(id = %id))]
    pub async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> Result<Document, VectorDbError> {
        let handle = self.connections.acquire().await?;

        let info = handle.run(|store| store.collection_info(collection)).await?;
        validate_patch(&patch, info.dimensions)?;

        let existing = handle
            .run(|store| store.get_point(collection, id))
            .await?
            .ok_or_else(|| VectorDbError::document_not_found(collection, id))?;

        handle
            .run(|store| store.update_point(collection, id, patch.clone()))
            .await?;

        let DocumentPatch { vector, metadata } = patch;
        debug!(collection, "Document updated");
        Ok(Document {
            id: existing.id,
            vector: vector.unwrap_or(existing.vector),
            metadata: match metadata {
                Some(m) if m.is_empty() => None,
                Some(m) => Some(m),
                None => existing.metadata,
            },
        })
    }

    /// Removes a point; fails with `NotFound` if it is absent.
    #[instrument(skip(self, id), fields(id = %id))]
    pub async fn delete(&self, collection: &str, id: &DocumentId) -> Result<WriteAck, VectorDbError> {
        let handle = self.connections.acquire().await?;

        handle
            .run(|store| store.get_point(collection, id))
            .await?
            .ok_or_else(|| VectorDbError::document_not_found(collection, id))?;

        let ack = handle.run(|store| store.delete_point(collection, id)).await?;
        debug!(collection, "Document deleted");
        Ok(ack)
    }
}
