//! NotifyHub Server: notification storage, live WebSocket fan-out, and a
//! request/reply bridge to peer services over the message broker.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use notifyhub_core::config::AppConfig;
use notifyhub_core::error::AppError;
use notifyhub_core::traits::UserLookup;
use notifyhub_database::{
    DatabasePool, MemoryNotificationStore, NotificationRepository, NotificationStore,
};
use notifyhub_messaging::{
    Broker, HandlerRegistry, MemoryBroker, MessageType, MessagingBridge, RedisBroker,
};
use notifyhub_realtime::Hub;
use notifyhub_service::{CountUnreadHandler, NotificationPresenter, NotificationService};

#[tokio::main]
async fn main() {
    let env = std::env::var("NOTIFYHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.is_json() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().pretty().with_env_filter(filter).with_target(true).init();
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting NotifyHub v{}", env!("CARGO_PKG_VERSION"));
    let config = Arc::new(config);

    // ── Step 1: Notification store ───────────────────────────────
    let (store, db) = open_store(&config).await?;

    // ── Step 2: Message broker ───────────────────────────────────
    let broker = open_broker(&config).await?;

    // ── Step 3: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 4: Notification hub ─────────────────────────────────
    let (hub, hub_handle) = Hub::new();
    let hub_task = tokio::spawn(hub.run(shutdown_rx.clone()));

    // ── Step 5: Messaging bridge and services ────────────────────
    let mut bridge = MessagingBridge::new(&config.broker, &config.rpc, broker);
    let users: Arc<dyn UserLookup> = Arc::new(bridge.user_directory());
    let notification_service = NotificationService::new(
        store,
        NotificationPresenter::new(users),
        hub_handle.clone(),
    );

    let handlers = HandlerRegistry::new().with(
        MessageType::CountUnreadNotifications,
        Arc::new(CountUnreadHandler::new(notification_service.clone())),
    );
    bridge.start(handlers, shutdown_rx.clone()).await?;

    // ── Step 6: Build and start HTTP server ──────────────────────
    let app_state =
        notifyhub_api::AppState::new(Arc::clone(&config), notification_service, hub_handle);
    let app = notifyhub_api::build_router(app_state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("NotifyHub server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 7: Wait for background tasks ────────────────────────
    tracing::info!("Waiting for background tasks to complete...");
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    if tokio::time::timeout(grace, bridge.join()).await.is_err() {
        tracing::warn!("Messaging bridge did not stop within the grace period");
    }
    if tokio::time::timeout(grace, hub_task).await.is_err() {
        tracing::warn!("Notification hub did not stop within the grace period");
    }

    if let Some(db) = db {
        db.close().await;
    }

    tracing::info!("NotifyHub server shut down gracefully");
    Ok(())
}

/// Open the configured notification store, running migrations for PostgreSQL.
///
/// The pool is returned alongside the store so it can be closed on shutdown.
async fn open_store(
    config: &AppConfig,
) -> Result<(Arc<dyn NotificationStore>, Option<DatabasePool>), AppError> {
    match config.database.provider.as_str() {
        "postgres" => {
            let db = DatabasePool::connect(&config.database).await?;

            db.migrate().await?;

            let store: Arc<dyn NotificationStore> =
                Arc::new(NotificationRepository::new(db.pool().clone()));
            Ok((store, Some(db)))
        }
        "memory" => {
            tracing::warn!("Using in-memory notification store; records are lost on restart");
            let store: Arc<dyn NotificationStore> = Arc::new(MemoryNotificationStore::new());
            Ok((store, None))
        }
        other => Err(AppError::configuration(format!(
            "Unknown database provider '{other}'"
        ))),
    }
}

/// Connect to the configured message broker.
async fn open_broker(config: &AppConfig) -> Result<Arc<dyn Broker>, AppError> {
    tracing::info!(
        "Initializing broker (provider: {})...",
        config.broker.provider
    );
    let broker: Arc<dyn Broker> = match config.broker.provider.as_str() {
        "redis" => Arc::new(RedisBroker::connect(&config.broker).await?),
        "memory" => Arc::new(MemoryBroker::new()),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown broker provider '{other}'"
            )));
        }
    };
    Ok(broker)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
