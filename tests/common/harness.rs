//! Test server harness.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use vecgate::batch::BatchConfig;
use vecgate::config::Config;
use vecgate::gateway::{GatewayState, create_router_with_state};
use vecgate::vectordb::{ConnectionManager, MockVectorStore, StoreConfig, VectorStore};

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub port: u16,
    pub batch: BatchConfig,
    pub store_timeout: Duration,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            batch: BatchConfig::default().chunk_size(8).max_concurrency(2),
            store_timeout: Duration::from_secs(2),
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    /// In-memory store behind the server; `None` for real-store servers.
    pub store: Option<MockVectorStore>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn mock_store(&self) -> &MockVectorStore {
        self.store
            .as_ref()
            .expect("server was not started with a mock store")
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn find_available_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok(addr.port())
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns a server backed by an in-memory [`MockVectorStore`].
///
/// The returned [`TestServer`] exposes the store so tests can inject faults
/// (unavailability, latency, per-point rejections) between requests.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let store = MockVectorStore::new();
    let store_config = StoreConfig {
        timeout: config.store_timeout,
        ..StoreConfig::default()
    };
    let connections = ConnectionManager::new(store.clone(), &store_config);

    let mut server = serve(connections, config).await?;
    server.store = Some(store);
    Ok(server)
}

/// Spawns a server connected to a **real Qdrant** instance, configured from
/// the same `VECGATE_STORE_*` variables as the binary.
///
/// # Prerequisites
///
/// ```bash
/// docker run -p 6333:6333 -p 6334:6334 qdrant/qdrant
/// ```
pub async fn spawn_real_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let app_config =
        Config::from_env().map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let connections = ConnectionManager::connect(&app_config.store_config())
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    serve(connections, config).await
}

async fn serve<S>(
    connections: ConnectionManager<S>,
    config: TestServerConfig,
) -> Result<TestServer, ServerStartupError>
where
    S: VectorStore + 'static,
{
    let port = if config.port == 0 {
        find_available_port().await?
    } else {
        config.port
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let state = GatewayState::new(connections, config.batch);
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        store: None,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
