use std::sync::Arc;

use crate::batch::{BatchConfig, BatchIngestor};
use crate::documents::DocumentGateway;
use crate::registry::CollectionRegistry;
use crate::vectordb::{ConnectionManager, VectorStore};

/// Shared handler state. Every component holds a clone of the same
/// [`ConnectionManager`], so they share one in-flight limit.
pub struct GatewayState<S> {
    pub registry: Arc<CollectionRegistry<S>>,

    pub documents: Arc<DocumentGateway<S>>,

    pub batch: Arc<BatchIngestor<S>>,

    pub connections: ConnectionManager<S>,
}

impl<S> Clone for GatewayState<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            documents: Arc::clone(&self.documents),
            batch: Arc::clone(&self.batch),
            connections: self.connections.clone(),
        }
    }
}

impl<S: VectorStore> GatewayState<S> {
    pub fn new(connections: ConnectionManager<S>, batch_config: BatchConfig) -> Self {
        Self {
            registry: Arc::new(CollectionRegistry::new(connections.clone())),
            documents: Arc::new(DocumentGateway::new(connections.clone())),
            batch: Arc::new(BatchIngestor::new(connections.clone(), batch_config)),
            connections,
        }
    }
}
