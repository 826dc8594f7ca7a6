use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::RwLock;

use crate::vectordb::{
    CollectionInfo, CollectionSpec, CollectionStatus, ConnectionFailure, Document, DocumentId,
    DocumentPatch, Metadata, PointStatus, VectorDbError, VectorStore, WriteAck,
};

#[derive(Default, Clone)]
/// In-memory [`VectorStore`] with failure injection for tests.
pub struct MockVectorStore {
    collections: Arc<RwLock<BTreeMap<String, MockCollection>>>,
    faults: Arc<RwLock<MockFaults>>,
    operation_ids: Arc<AtomicU64>,
    upsert_calls: Arc<AtomicUsize>,
    upserts_in_flight: Arc<AtomicUsize>,
    max_upserts_in_flight: Arc<AtomicUsize>,
}

#[derive(Clone)]
struct MockCollection {
    spec: CollectionSpec,
    points: HashMap<DocumentId, MockStoredPoint>,
}

#[derive(Clone)]
struct MockStoredPoint {
    vector: Vec<f32>,
    metadata: Metadata,
}

#[derive(Default)]
struct MockFaults {
    unavailable: bool,
    latency: Option<Duration>,
    rejected_points: HashSet<DocumentId>,
    failing_chunks_with: HashSet<DocumentId>,
}

impl MockVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of points stored in `collection`.
    pub fn point_count(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.points.len())
    }

    /// Makes every call fail as if the endpoint were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.write().unavailable = unavailable;
    }

    /// Delays every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.faults.write().latency = Some(latency);
    }

    /// The store accepts the rest of a write but rejects this point.
    pub fn reject_point(&self, id: impl Into<DocumentId>) {
        self.faults.write().rejected_points.insert(id.into());
    }

    /// Any write containing this point fails as a whole.
    pub fn fail_writes_containing(&self, id: impl Into<DocumentId>) {
        self.faults.write().failing_chunks_with.insert(id.into());
    }

    /// Number of `upsert_points` calls received.
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    /// Highest number of `upsert_points` calls observed running at once.
    pub fn max_concurrent_upserts(&self) -> usize {
        self.max_upserts_in_flight.load(Ordering::SeqCst)
    }

    async fn simulate_transport(&self) -> Result<(), VectorDbError> {
        let (unavailable, latency) = {
            let faults = self.faults.read();
            (faults.unavailable, faults.latency)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if unavailable {
            return Err(VectorDbError::connection(
                ConnectionFailure::Unavailable,
                "mock store is unavailable",
            ));
        }
        Ok(())
    }

    fn next_ack(&self) -> WriteAck {
        WriteAck::completed(Some(self.operation_ids.fetch_add(1, Ordering::SeqCst)))
    }

    fn check_dimensions(spec: &CollectionSpec, vector: &[f32]) -> Result<(), VectorDbError> {
        if vector.len() as u64 != spec.dimensions {
            return Err(VectorDbError::validation(format!(
                "wrong vector dimension: expected {}, got {}",
                spec.dimensions,
                vector.len()
            )));
        }
        Ok(())
    }
}

impl VectorStore for MockVectorStore {
    async fn health_check(&self) -> Result<(), VectorDbError> {
        self.simulate_transport().await
    }

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<(), VectorDbError> {
        self.simulate_transport().await?;

        let mut collections = self.collections.write();
        if collections.contains_key(&spec.name) {
            return Err(VectorDbError::collection_exists(&spec.name));
        }
        collections.insert(
            spec.name.clone(),
            MockCollection {
                spec: spec.clone(),
                points: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>, VectorDbError> {
        self.simulate_transport().await?;
        Ok(self.collections.read().keys().cloned().collect())
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionInfo, VectorDbError> {
        self.simulate_transport().await?;

        let collections = self.collections.read();
        let coll = collections
            .get(name)
            .ok_or_else(|| VectorDbError::collection_not_found(name))?;

        Ok(CollectionInfo {
            name: name.to_string(),
            dimensions: coll.spec.dimensions,
            distance: coll.spec.distance,
            points_count: coll.points.len() as u64,
            indexed_vectors_count: coll.points.len() as u64,
            segments_count: 1,
            status: CollectionStatus::Green,
        })
    }

    async fn delete_collection(&self, name: &str) -> Result<(), VectorDbError> {
        self.simulate_transport().await?;

        self.collections
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| VectorDbError::collection_not_found(name))
    }

    async fn upsert_points(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<PointStatus>, VectorDbError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.upserts_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_upserts_in_flight
            .fetch_max(in_flight, Ordering::SeqCst);

        let result = self.apply_upsert(collection, documents).await;

        self.upserts_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn get_point(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, VectorDbError> {
        self.simulate_transport().await?;

        let collections = self.collections.read();
        let coll = collections
            .get(collection)
            .ok_or_else(|| VectorDbError::collection_not_found(collection))?;

        Ok(coll.points.get(id).map(|p| Document {
            id: id.clone(),
            vector: p.vector.clone(),
            metadata: (!p.metadata.is_empty()).then(|| p.metadata.clone()),
        }))
    }

    async fn update_point(
        &self,
        collection: &str,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> Result<WriteAck, VectorDbError> {
        self.simulate_transport().await?;

        if self.faults.read().failing_chunks_with.contains(id) {
            return Err(VectorDbError::store(
                "internal",
                format!("write containing point '{}' failed", id),
            ));
        }

        let mut collections = self.collections.write();
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| VectorDbError::collection_not_found(collection))?;
        if let Some(vector) = &patch.vector {
            Self::check_dimensions(&coll.spec, vector)?;
        }

        let point = coll
            .points
            .get_mut(id)
            .ok_or_else(|| VectorDbError::document_not_found(collection, id))?;
        let DocumentPatch { vector, metadata } = patch;
        if let Some(vector) = vector {
            point.vector = vector;
        }
        if let Some(metadata) = metadata {
            point.metadata = metadata;
        }

        Ok(self.next_ack())
    }

    async fn delete_point(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<WriteAck, VectorDbError> {
        self.simulate_transport().await?;

        let mut collections = self.collections.write();
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| VectorDbError::collection_not_found(collection))?;
        coll.points.remove(id);

        Ok(self.next_ack())
    }
}

impl MockVectorStore {
    async fn apply_upsert(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<PointStatus>, VectorDbError> {
        self.simulate_transport().await?;

        let faults = self.faults.read();
        if let Some(bad) = documents
            .iter()
            .find(|d| faults.failing_chunks_with.contains(&d.id))
        {
            return Err(VectorDbError::store(
                "internal",
                format!("write containing point '{}' failed", bad.id),
            ));
        }

        let mut collections = self.collections.write();
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| VectorDbError::collection_not_found(collection))?;

        let statuses = documents
            .into_iter()
            .map(|doc| {
                if faults.rejected_points.contains(&doc.id) {
                    return PointStatus::Rejected(VectorDbError::store(
                        "rejected",
                        format!("point '{}' rejected by store", doc.id),
                    ));
                }
                if let Err(e) = Self::check_dimensions(&coll.spec, &doc.vector) {
                    return PointStatus::Rejected(e);
                }
                coll.points.insert(
                    doc.id,
                    MockStoredPoint {
                        vector: doc.vector,
                        metadata: doc.metadata.unwrap_or_default(),
                    },
                );
                PointStatus::Accepted
            })
            .collect();

        Ok(statuses)
    }
}
