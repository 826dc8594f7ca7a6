//! Vecgate HTTP server entrypoint.

use std::net::SocketAddr;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use vecgate::config::Config;
use vecgate::gateway::{GatewayState, cors_layer, create_router_with_state};
use vecgate::vectordb::ConnectionManager;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        "Vecgate starting"
    );

    let store_config = config.store_config();
    let connections = ConnectionManager::connect(&store_config)?;
    tracing::info!(
        endpoint = connections.endpoint(),
        timeout_ms = config.store_timeout_ms,
        max_in_flight = config.store_max_in_flight,
        "Vector store client configured"
    );

    if connections.is_healthy().await {
        tracing::info!("Vector store reachable");
    } else {
        tracing::warn!(
            endpoint = connections.endpoint(),
            "Vector store not reachable yet; /ready will report 503 until it is"
        );
    }

    let state = GatewayState::new(connections.clone(), config.batch_config());
    let mut app = create_router_with_state(state);
    if let Some(cors) = cors_layer(&config.cors_origins) {
        app = app.layer(cors);
    }

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    connections.close();
    tracing::info!("Vecgate shutdown complete");
    Ok(())
}

async fn run_health_check() -> i32 {
    let port = std::env::var("VECGATE_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
