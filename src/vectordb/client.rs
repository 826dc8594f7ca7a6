use std::collections::HashMap;

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::points_selector::PointsSelectorOneOf;
use qdrant_client::qdrant::points_update_operation::{
    Operation as UpdateOperation, OverwritePayload, UpdateVectors,
};
use qdrant_client::qdrant::vectors_config::Config as VectorsConfigKind;
use qdrant_client::qdrant::vectors_output::VectorsOptions;
use qdrant_client::qdrant::{
    CollectionStatus as QdrantCollectionStatus, CreateCollectionBuilder, DeletePointsBuilder,
    Distance as QdrantDistance, GetPointsBuilder, PointId, PointStruct, PointVectors,
    PointsIdsList, PointsUpdateOperation, RetrievedPoint, UpdateBatchPointsBuilder, UpdateResult,
    UpdateStatus, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant, QdrantError};
use tracing::{debug, instrument};

use super::connection::StoreConfig;
use super::error::{ConnectionFailure, VectorDbError};
use super::model::{
    CollectionInfo, CollectionSpec, CollectionStatus, Distance, Document, DocumentId,
    DocumentPatch, Metadata, PointStatus, WriteAck, WriteStatus,
};

/// Async interface to the remote vector store.
///
/// Implementations translate their transport's failures into [`VectorDbError`]
/// and never retry.
pub trait VectorStore: Send + Sync {
    /// Probes the store.
    fn health_check(&self) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Creates a collection. Fails with `Conflict` if it already exists.
    fn create_collection(
        &self,
        spec: &CollectionSpec,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Lists collection names.
    fn list_collections(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, VectorDbError>> + Send;

    /// Reads a collection's schema and counters. Fails with `NotFound` if absent.
    fn collection_info(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<CollectionInfo, VectorDbError>> + Send;

    /// Drops a collection. Fails with `NotFound` if absent.
    fn delete_collection(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Writes points. `Err` means nothing in the request was written; `Ok`
    /// carries one status per input document, in input order.
    fn upsert_points(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> impl std::future::Future<Output = Result<Vec<PointStatus>, VectorDbError>> + Send;

    /// Reads one point. `Ok(None)` if the collection exists but the point does not.
    fn get_point(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> impl std::future::Future<Output = Result<Option<Document>, VectorDbError>> + Send;

    /// Applies a patch to one point in a single store request: the vector
    /// and/or the metadata are replaced, absent fields are kept. `Err` means
    /// no part of the patch was applied.
    fn update_point(
        &self,
        collection: &str,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> impl std::future::Future<Output = Result<WriteAck, VectorDbError>> + Send;

    /// Removes a point.
    fn delete_point(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> impl std::future::Future<Output = Result<WriteAck, VectorDbError>> + Send;
}

#[derive(Clone)]
/// Qdrant-backed [`VectorStore`] (gRPC).
///
/// Connection pooling is provided by the underlying channel; the client is
/// cheap to clone.
pub struct QdrantStore {
    client: Qdrant,
    url: String,
}

impl QdrantStore {
    /// Builds a client for the configured endpoint. No request is sent.
    pub fn new(config: &StoreConfig) -> Result<Self, VectorDbError> {
        let url = config.url();
        let client = Qdrant::from_url(&url)
            .api_key(config.api_key.clone())
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .skip_compatibility_check()
            .build()
            .map_err(|e| VectorDbError::connection(ConnectionFailure::Transport, e.to_string()))?;

        Ok(Self { client, url })
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl VectorStore for QdrantStore {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn health_check(&self) -> Result<(), VectorDbError> {
        self.client
            .health_check()
            .await
            .map_err(|e| classify_error(e, "health check"))?;
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %spec.name))]
    async fn create_collection(&self, spec: &CollectionSpec) -> Result<(), VectorDbError> {
        let vectors_config = VectorParamsBuilder::new(spec.dimensions, spec.distance.into());

        self.client
            .create_collection(CreateCollectionBuilder::new(&spec.name).vectors_config(vectors_config))
            .await
            .map_err(|e| classify_error(e, &format!("collection '{}'", spec.name)))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_collections(&self) -> Result<Vec<String>, VectorDbError> {
        let response = self
            .client
            .list_collections()
            .await
            .map_err(|e| classify_error(e, "collections"))?;

        let mut names: Vec<String> = response.collections.into_iter().map(|c| c.name).collect();
        names.sort();
        Ok(names)
    }

    #[instrument(skip(self))]
    async fn collection_info(&self, name: &str) -> Result<CollectionInfo, VectorDbError> {
        let subject = format!("collection '{}'", name);
        let response = self
            .client
            .collection_info(name)
            .await
            .map_err(|e| classify_error(e, &subject))?;

        let info = response
            .result
            .ok_or_else(|| VectorDbError::collection_not_found(name))?;

        let params = match info
            .config
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config)
        {
            Some(VectorsConfigKind::Params(params)) => params,
            Some(VectorsConfigKind::ParamsMap(_)) => {
                return Err(VectorDbError::store(
                    "unsupported_schema",
                    format!("{} uses named vectors", subject),
                ));
            }
            None => {
                return Err(VectorDbError::store(
                    "unsupported_schema",
                    format!("{} has no vector configuration", subject),
                ));
            }
        };

        let distance = QdrantDistance::try_from(params.distance)
            .ok()
            .and_then(|d| Distance::try_from(d).ok())
            .ok_or_else(|| {
                VectorDbError::store(
                    "unsupported_schema",
                    format!("{} uses unknown distance {}", subject, params.distance),
                )
            })?;

        let status = match QdrantCollectionStatus::try_from(info.status) {
            Ok(QdrantCollectionStatus::Green) => CollectionStatus::Green,
            Ok(QdrantCollectionStatus::Yellow) => CollectionStatus::Yellow,
            Ok(QdrantCollectionStatus::Red) => CollectionStatus::Red,
            Ok(QdrantCollectionStatus::Grey) => CollectionStatus::Grey,
            _ => CollectionStatus::Unknown,
        };

        Ok(CollectionInfo {
            name: name.to_string(),
            dimensions: params.size,
            distance,
            points_count: info.points_count.unwrap_or(0),
            indexed_vectors_count: info.indexed_vectors_count.unwrap_or(0),
            segments_count: info.segments_count,
            status,
        })
    }

    #[instrument(skip(self))]
    async fn delete_collection(&self, name: &str) -> Result<(), VectorDbError> {
        let response = self
            .client
            .delete_collection(name)
            .await
            .map_err(|e| classify_error(e, &format!("collection '{}'", name)))?;

        if !response.result {
            return Err(VectorDbError::collection_not_found(name));
        }
        Ok(())
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn upsert_points(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<PointStatus>, VectorDbError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let count = documents.len();
        let points: Vec<PointStruct> = documents
            .into_iter()
            .map(|d| {
                let payload = Payload::from(d.metadata.unwrap_or_default());
                PointStruct::new(point_id(&d.id), d.vector, payload)
            })
            .collect();

        // Qdrant applies one upsert request atomically.
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(|e| classify_error(e, &format!("collection '{}'", collection)))?;

        debug!(collection, count, "Points upserted");
        Ok(vec![PointStatus::Accepted; count])
    }

    #[instrument(skip(self, id), fields(id = %id))]
    async fn get_point(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, VectorDbError> {
        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(collection, vec![point_id(id)])
                    .with_vectors(true)
                    .with_payload(true),
            )
            .await
            .map_err(|e| classify_error(e, &format!("collection '{}'", collection)))?;

        match response.result.into_iter().next() {
            Some(point) => document_from_retrieved(point, id).map(Some),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, id, patch), fields(id = %id))]
    async fn update_point(
        &self,
        collection: &str,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> Result<WriteAck, VectorDbError> {
        let DocumentPatch { vector, metadata } = patch;
        let mut operations = Vec::with_capacity(2);

        if let Some(vector) = vector {
            operations.push(PointsUpdateOperation {
                operation: Some(UpdateOperation::UpdateVectors(UpdateVectors {
                    points: vec![PointVectors {
                        id: Some(point_id(id)),
                        vectors: Some(vector.into()),
                    }],
                    ..Default::default()
                })),
            });
        }
        if let Some(metadata) = metadata {
            operations.push(PointsUpdateOperation {
                operation: Some(UpdateOperation::OverwritePayload(OverwritePayload {
                    payload: HashMap::from(Payload::from(metadata)),
                    points_selector: Some(
                        PointsSelectorOneOf::Points(PointsIdsList {
                            ids: vec![point_id(id)],
                        })
                        .into(),
                    ),
                    ..Default::default()
                })),
            });
        }

        if operations.is_empty() {
            return Err(VectorDbError::validation(
                "update must include `vector` and/or `metadata`",
            ));
        }

        let response = self
            .client
            .update_points_batch(UpdateBatchPointsBuilder::new(collection, operations).wait(true))
            .await
            .map_err(|e| classify_error(e, &format!("document '{}' in '{}'", id, collection)))?;

        Ok(write_ack(response.result.into_iter().last()))
    }

    #[instrument(skip(self, id), fields(id = %id))]
    async fn delete_point(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<WriteAck, VectorDbError> {
        let response = self
            .client
            .delete_points(
                DeletePointsBuilder::new(collection)
                    .points(PointsIdsList {
                        ids: vec![point_id(id)],
                    })
                    .wait(true),
            )
            .await
            .map_err(|e| classify_error(e, &format!("document '{}' in '{}'", id, collection)))?;

        Ok(write_ack(response.result))
    }
}

impl From<Distance> for QdrantDistance {
    fn from(d: Distance) -> Self {
        match d {
            Distance::Cosine => QdrantDistance::Cosine,
            Distance::Dot => QdrantDistance::Dot,
            Distance::Euclidean => QdrantDistance::Euclid,
            Distance::Manhattan => QdrantDistance::Manhattan,
        }
    }
}

impl TryFrom<QdrantDistance> for Distance {
    type Error = QdrantDistance;

    fn try_from(d: QdrantDistance) -> Result<Self, Self::Error> {
        match d {
            QdrantDistance::Cosine => Ok(Distance::Cosine),
            QdrantDistance::Dot => Ok(Distance::Dot),
            QdrantDistance::Euclid => Ok(Distance::Euclidean),
            QdrantDistance::Manhattan => Ok(Distance::Manhattan),
            other => Err(other),
        }
    }
}

fn point_id(id: &DocumentId) -> PointId {
    match id {
        DocumentId::Num(n) => PointId::from(*n),
        DocumentId::Uuid(u) => PointId::from(u.hyphenated().to_string()),
    }
}

#[allow(deprecated)]
fn document_from_retrieved(
    point: RetrievedPoint,
    requested: &DocumentId,
) -> Result<Document, VectorDbError> {
    let id = match point.id.and_then(|pid| pid.point_id_options) {
        Some(PointIdOptions::Num(n)) => DocumentId::Num(n),
        Some(PointIdOptions::Uuid(s)) => s.parse()?,
        None => requested.clone(),
    };

    let vector = match point.vectors.and_then(|v| v.vectors_options) {
        Some(VectorsOptions::Vector(v)) => v.data,
        Some(VectorsOptions::Vectors(_)) => {
            return Err(VectorDbError::store(
                "unsupported_schema",
                format!("document '{}' uses named vectors", id),
            ));
        }
        None => Vec::new(),
    };

    let metadata: Metadata = point
        .payload
        .into_iter()
        .map(|(k, v)| (k, v.into_json()))
        .collect();

    Ok(Document {
        id,
        vector,
        metadata: (!metadata.is_empty()).then_some(metadata),
    })
}

fn write_ack(result: Option<UpdateResult>) -> WriteAck {
    match result {
        Some(r) => {
            let status = match UpdateStatus::try_from(r.status) {
                Ok(UpdateStatus::Completed) => WriteStatus::Completed,
                Ok(UpdateStatus::Acknowledged) => WriteStatus::Acknowledged,
                _ => WriteStatus::Unknown,
            };
            WriteAck {
                operation_id: r.operation_id,
                status,
            }
        }
        None => WriteAck {
            operation_id: None,
            status: WriteStatus::Unknown,
        },
    }
}

fn classify_error(err: QdrantError, subject: &str) -> VectorDbError {
    match err {
        QdrantError::ResponseError { status } => {
            classify_status(status.code() as i32, status.message(), subject)
        }
        other => VectorDbError::connection(ConnectionFailure::Transport, other.to_string()),
    }
}

/// Maps a gRPC status code and message onto the error taxonomy.
pub(crate) fn classify_status(code: i32, message: &str, subject: &str) -> VectorDbError {
    let lowered = message.to_ascii_lowercase();
    match code {
        // INVALID_ARGUMENT: Qdrant reports duplicates and some lookups this way.
        3 if lowered.contains("already exists") => VectorDbError::Conflict {
            resource: subject.to_string(),
        },
        3 if lowered.contains("doesn't exist") || lowered.contains("not found") => {
            VectorDbError::NotFound {
                resource: subject.to_string(),
            }
        }
        3 | 11 => VectorDbError::validation(message),
        4 => VectorDbError::connection(ConnectionFailure::Timeout, message),
        5 => VectorDbError::NotFound {
            resource: subject.to_string(),
        },
        6 => VectorDbError::Conflict {
            resource: subject.to_string(),
        },
        7 | 16 => VectorDbError::connection(ConnectionFailure::Auth, message),
        14 if lowered.contains("refused") => {
            VectorDbError::connection(ConnectionFailure::Refused, message)
        }
        14 => VectorDbError::connection(ConnectionFailure::Unavailable, message),
        1 => VectorDbError::connection(ConnectionFailure::Transport, message),
        _ => VectorDbError::store(grpc_code_name(code), message),
    }
}

fn grpc_code_name(code: i32) -> &'static str {
    match code {
        0 => "ok",
        1 => "cancelled",
        2 => "unknown",
        3 => "invalid_argument",
        4 => "deadline_exceeded",
        5 => "not_found",
        6 => "already_exists",
        7 => "permission_denied",
        8 => "resource_exhausted",
        9 => "failed_precondition",
        10 => "aborted",
        11 => "out_of_range",
        12 => "unimplemented",
        13 => "internal",
        14 => "unavailable",
        15 => "data_loss",
        16 => "unauthenticated",
        _ => "unrecognized",
    }
}
