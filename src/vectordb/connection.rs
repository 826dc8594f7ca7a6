//! Connection lifecycle: configuration, scoped acquisition, per-call timeout.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use super::client::{QdrantStore, VectorStore};
use super::error::{ConnectionFailure, VectorDbError};

pub const DEFAULT_STORE_HOST: &str = "localhost";
pub const DEFAULT_STORE_PORT: u16 = 6334;
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Endpoint and limits for the store connection. Immutable once a
/// [`ConnectionManager`] is built from it.
#[derive(Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub api_key: Option<String>,
    pub use_tls: bool,
    pub timeout: Duration,
    pub max_in_flight: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_STORE_HOST.to_string(),
            port: DEFAULT_STORE_PORT,
            api_key: None,
            use_tls: false,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl StoreConfig {
    /// Returns the endpoint URL, e.g. `http://localhost:6334`.
    pub fn url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("use_tls", &self.use_tls)
            .field("timeout", &self.timeout)
            .field("max_in_flight", &self.max_in_flight)
            .finish()
    }
}

/// Owns the single logical connection to the store.
///
/// Cloning is cheap and shares the same store client and in-flight limiter.
pub struct ConnectionManager<S> {
    store: Arc<S>,
    limiter: Arc<Semaphore>,
    timeout: Duration,
    endpoint: String,
}

impl<S> Clone for ConnectionManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            limiter: Arc::clone(&self.limiter),
            timeout: self.timeout,
            endpoint: self.endpoint.clone(),
        }
    }
}

impl ConnectionManager<QdrantStore> {
    /// Builds a Qdrant-backed manager from `config`.
    pub fn connect(config: &StoreConfig) -> Result<Self, VectorDbError> {
        let store = QdrantStore::new(config)?;
        Ok(Self::new(store, config))
    }
}

impl<S: VectorStore> ConnectionManager<S> {
    pub fn new(store: S, config: &StoreConfig) -> Self {
        Self {
            store: Arc::new(store),
            limiter: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            timeout: config.timeout,
            endpoint: config.url(),
        }
    }

    /// Waits for a free slot and returns a scoped handle. The slot is released
    /// when the handle is dropped, including on error and cancellation.
    pub async fn acquire(&self) -> Result<ConnectionHandle<'_, S>, VectorDbError> {
        let permit = Arc::clone(&self.limiter)
            .acquire_owned()
            .await
            .map_err(|_| {
                VectorDbError::connection(
                    ConnectionFailure::Unavailable,
                    format!("connection to {} is closed", self.endpoint),
                )
            })?;

        Ok(ConnectionHandle {
            store: self.store.as_ref(),
            timeout: self.timeout,
            _permit: permit,
        })
    }

    /// Probes the store; any error (including timeout) counts as unhealthy.
    pub async fn is_healthy(&self) -> bool {
        let handle = match self.acquire().await {
            Ok(handle) => handle,
            Err(_) => return false,
        };

        match handle.run(|store| store.health_check()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Vector store health check failed");
                false
            }
        }
    }

    /// Stops handing out new handles; in-flight handles finish normally.
    pub fn close(&self) {
        debug!(endpoint = %self.endpoint, "Closing vector store connection");
        self.limiter.close();
    }

    /// Number of handles that could be acquired right now.
    pub fn available_slots(&self) -> usize {
        self.limiter.available_permits()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Scoped access to the store, holding one in-flight slot.
pub struct ConnectionHandle<'m, S> {
    store: &'m S,
    timeout: Duration,
    _permit: OwnedSemaphorePermit,
}

impl<'m, S: VectorStore> ConnectionHandle<'m, S> {
    /// Runs one store call under the configured timeout.
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T, VectorDbError>
    where
        F: FnOnce(&'m S) -> Fut,
        Fut: Future<Output = Result<T, VectorDbError>>,
    {
        match tokio::time::timeout(self.timeout, op(self.store)).await {
            Ok(result) => result,
            Err(_) => Err(VectorDbError::connection(
                ConnectionFailure::Timeout,
                format!("store call exceeded {}ms", self.timeout.as_millis()),
            )),
        }
    }
}
