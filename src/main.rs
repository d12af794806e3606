//! Maintenance Beacon server.
//!
//! Wires storage, the broadcast dispatcher, the event store and the HTTP /
//! WebSocket surface together and starts serving.

use std::sync::Arc;

use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, EnvFilter};

use maintenance_beacon::adapters::http::{app_router, build_cors_layer, MaintenanceAppState};
use maintenance_beacon::adapters::memory::InMemoryMaintenanceStore;
use maintenance_beacon::adapters::postgres::{
    self, PostgresApplicationRepository, PostgresMaintenanceEventRepository,
};
use maintenance_beacon::adapters::websocket::{BroadcastDispatcher, RoomManager, WebSocketState};
use maintenance_beacon::application::{ApplicationCatalog, MaintenanceEventStore};
use maintenance_beacon::config::{AppConfig, DatabaseConfig, LogFormat};
use maintenance_beacon::domain::foundation::DomainError;
use maintenance_beacon::ports::{ApplicationRepository, MaintenanceEventRepository};

#[derive(Debug, Error)]
enum StartupError {
    #[error("Storage initialisation failed: {0}")]
    Storage(#[from] DomainError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::load_validated() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    match config.log_format() {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

type Repositories = (
    Arc<dyn ApplicationRepository>,
    Arc<dyn MaintenanceEventRepository>,
);

async fn build_repositories(config: &DatabaseConfig) -> Result<Repositories, StartupError> {
    let Some(url) = config.postgres_url() else {
        tracing::warn!("No database URL configured; using the in-memory store, data is lost on restart");
        let store = Arc::new(InMemoryMaintenanceStore::new());
        let applications: Arc<dyn ApplicationRepository> = store.clone();
        let events: Arc<dyn MaintenanceEventRepository> = store;
        return Ok((applications, events));
    };

    tracing::info!("Connecting to database...");
    let pool = postgres::connect(url, &config.pool).await?;
    if config.run_migrations {
        postgres::run_migrations(&pool).await?;
    }

    let applications: Arc<dyn ApplicationRepository> =
        Arc::new(PostgresApplicationRepository::new(pool.clone()));
    let events: Arc<dyn MaintenanceEventRepository> =
        Arc::new(PostgresMaintenanceEventRepository::new(pool));
    Ok((applications, events))
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    tracing::info!("Starting maintenance-beacon v{}", env!("CARGO_PKG_VERSION"));

    let (applications, events) = build_repositories(&config.database).await?;

    let rooms = Arc::new(RoomManager::new());
    let dispatcher = Arc::new(BroadcastDispatcher::new(rooms));
    let event_store = Arc::new(MaintenanceEventStore::new(
        applications.clone(),
        events,
        dispatcher.clone(),
    ));
    let catalog = Arc::new(ApplicationCatalog::new(applications, event_store.clone()));

    let app = app_router(
        MaintenanceAppState::new(catalog.clone(), event_store.clone()),
        WebSocketState::new(catalog, event_store, dispatcher, config.websocket.clone()),
    )
    .layer(build_cors_layer(&config.server))
    .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
