//! Batch ingestion: per-document validation, chunked concurrent writes,
//! and an input-ordered report of what was accepted.

pub mod config;
pub mod types;


use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::documents::validate_document;
use crate::vectordb::{
    ConnectionFailure, ConnectionManager, Document, DocumentId, PointStatus, VectorDbError,
    VectorStore,
};

pub use config::{BatchConfig, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CONCURRENCY};
pub use types::{BatchEntry, BatchResult, BatchStatus, ItemOutcome, ItemStatus};

/// Writes many documents into one collection.
///
/// Valid documents are split into chunks of [`BatchConfig::chunk_size`] and
/// written with at most [`BatchConfig::max_concurrency`] chunks in flight.
/// A failing chunk rejects only its own documents.
pub struct BatchIngestor<S> {
    connections: ConnectionManager<S>,
    config: BatchConfig,
}

impl<S: VectorStore> BatchIngestor<S> {
    pub fn new(connections: ConnectionManager<S>, config: BatchConfig) -> Self {
        Self {
            connections,
            config,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Ingests `entries` and reports one outcome per input, in input order.
    ///
    /// Only a missing collection, an unreachable store or an empty batch fail
    /// the call as a whole, checked in that order. Everything else, including
    /// entries already marked invalid, is reported per document.
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub async fn ingest<E: Into<BatchEntry>>(
        &self,
        collection: &str,
        entries: Vec<E>,
    ) -> Result<BatchResult, VectorDbError> {
        let dimensions = {
            let handle = self.connections.acquire().await?;
            handle
                .run(|store| store.collection_info(collection))
                .await?
                .dimensions
        };

        if entries.is_empty() {
            return Err(VectorDbError::validation("batch contains no documents"));
        }

        let total = entries.len();
        let mut outcomes: Vec<Option<ItemOutcome>> = vec![None; total];
        let mut valid = Vec::with_capacity(total);

        for (index, entry) in entries.into_iter().enumerate() {
            let entry: BatchEntry = entry.into();
            match entry {
                BatchEntry::Document(document) => match validate_document(&document, dimensions) {
                    Ok(()) => valid.push((index, document)),
                    Err(e) => {
                        outcomes[index] = Some(ItemOutcome::rejected(index, document.id, &e))
                    }
                },
                BatchEntry::Invalid { id, error } => {
                    outcomes[index] = Some(ItemOutcome::rejected(index, id, &error))
                }
            }
        }

        let invalid = total - valid.len();
        let chunks = chunked(valid, self.config.chunk_size);
        debug!(chunks = chunks.len(), invalid, "Batch validated");

        let limiter = Semaphore::new(self.config.max_concurrency.max(1));
        let writes: Vec<_> = chunks
            .into_iter()
            .map(|chunk| self.write_chunk(collection, chunk, &limiter))
            .collect();
        let written = join_all(writes).await;

        for outcome in written.into_iter().flatten() {
            let index = outcome.index;
            outcomes[index] = Some(outcome);
        }

        let items: Vec<ItemOutcome> = outcomes.into_iter().flatten().collect();
        let result = BatchResult::from_items(collection, items);

        info!(
            collection,
            total = result.total,
            accepted = result.accepted,
            rejected = result.rejected,
            "Batch ingested"
        );
        Ok(result)
    }

    /// Writes one chunk on its own connection slot. Never fails as a whole:
    /// a chunk-level error becomes a rejection of every document in it.
    async fn write_chunk(
        &self,
        collection: &str,
        chunk: Vec<(usize, Document)>,
        limiter: &Semaphore,
    ) -> Vec<ItemOutcome> {
        let (indices, documents): (Vec<usize>, Vec<Document>) = chunk.into_iter().unzip();
        let ids: Vec<DocumentId> = documents.iter().map(|d| d.id.clone()).collect();

        let Ok(_slot) = limiter.acquire().await else {
            let e = VectorDbError::connection(
                ConnectionFailure::Unavailable,
                "batch writer was shut down",
            );
            return reject_all(indices, ids, &e);
        };

        let result = match self.connections.acquire().await {
            Ok(handle) => {
                handle
                    .run(|store| store.upsert_points(collection, documents))
                    .await
            }
            Err(e) => Err(e),
        };

        let statuses = match result {
            Ok(statuses) if statuses.len() == ids.len() => statuses,
            Ok(statuses) => {
                let e = VectorDbError::store(
                    "status_mismatch",
                    format!(
                        "store returned {} statuses for {} points",
                        statuses.len(),
                        ids.len()
                    ),
                );
                warn!(collection, error = %e, "Chunk write returned inconsistent statuses");
                return reject_all(indices, ids, &e);
            }
            Err(e) => {
                warn!(collection, points = ids.len(), error = %e, "Chunk write failed");
                return reject_all(indices, ids, &e);
            }
        };

        indices
            .into_iter()
            .zip(ids)
            .zip(statuses)
            .map(|((index, id), status)| match status {
                PointStatus::Accepted => ItemOutcome::accepted(index, id),
                PointStatus::Rejected(e) => ItemOutcome::rejected(index, id, &e),
            })
            .collect()
    }
}

fn reject_all(
    indices: Vec<usize>,
    ids: Vec<DocumentId>,
    error: &VectorDbError,
) -> Vec<ItemOutcome> {
    indices
        .into_iter()
        .zip(ids)
        .map(|(index, id)| ItemOutcome::rejected(index, id, error))
        .collect()
}

fn chunked<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(size).collect());
    }
    chunks
}
