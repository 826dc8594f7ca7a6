//! Collection-level operations with schema validation.


use tracing::{info, instrument};

use crate::vectordb::{
    CollectionInfo, CollectionSpec, ConnectionManager, Distance, VectorDbError, VectorStore,
};

pub const MAX_COLLECTION_NAME_LEN: usize = 255;

/// Validates and executes create/list/describe/delete against the store.
///
/// Nothing is cached: every call reflects the store's current state.
pub struct CollectionRegistry<S> {
    connections: ConnectionManager<S>,
}

impl<S: VectorStore> CollectionRegistry<S> {
    pub fn new(connections: ConnectionManager<S>) -> Self {
        Self { connections }
    }

    /// Creates a collection and echoes its parameters.
    ///
    /// Not idempotent: a second call with the same name fails with `Conflict`
    /// and leaves the existing collection untouched.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        name: &str,
        dimensions: i64,
        distance: &str,
    ) -> Result<CollectionSpec, VectorDbError> {
        validate_collection_name(name)?;
        let distance: Distance = distance.parse()?;
        if dimensions <= 0 {
            return Err(VectorDbError::validation(format!(
                "dimensions must be a positive integer, got {}",
                dimensions
            )));
        }

        let spec = CollectionSpec {
            name: name.to_string(),
            dimensions: dimensions as u64,
            distance,
        };

        let handle = self.connections.acquire().await?;
        handle.run(|store| store.create_collection(&spec)).await?;

        info!(collection = name, dimensions, distance = %distance, "Collection created");
        Ok(spec)
    }

    /// Returns collection names in ascending order. Empty is a valid result.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<String>, VectorDbError> {
        let handle = self.connections.acquire().await?;
        let mut names = handle.run(|store| store.list_collections()).await?;
        names.sort();
        Ok(names)
    }

    #[instrument(skip(self))]
    pub async fn describe(&self, name: &str) -> Result<CollectionInfo, VectorDbError> {
        let handle = self.connections.acquire().await?;
        handle.run(|store| store.collection_info(name)).await
    }

    /// Drops a collection. Irreversible; completes before returning.
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<(), VectorDbError> {
        let handle = self.connections.acquire().await?;
        handle.run(|store| store.delete_collection(name)).await?;

        info!(collection = name, "Collection deleted");
        Ok(())
    }
}

/// Collection names: 1-255 bytes of ASCII alphanumerics, `-`, `_` or `.`.
pub fn validate_collection_name(name: &str) -> Result<(), VectorDbError> {
    if name.is_empty() {
        return Err(VectorDbError::validation("collection name must not be empty"));
    }
    if name.len() > MAX_COLLECTION_NAME_LEN {
        return Err(VectorDbError::validation(format!(
            "collection name exceeds {} bytes",
            MAX_COLLECTION_NAME_LEN
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(VectorDbError::validation(format!(
            "collection name '{}' contains invalid character '{}'",
            name, c
        )));
    }
    Ok(())
}
