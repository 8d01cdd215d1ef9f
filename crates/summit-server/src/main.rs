mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use summit_adapters::notify::LoggingNotifier;
use summit_adapters::persistence::sqlite::SqliteDb;
use summit_app::escalation_service::EscalationService;
use summit_app::monitor::EscalationMonitor;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    tracing::info!(
        database_url = %config.database_url,
        sweep_interval_minutes = config.sweep_interval_minutes,
        "starting escalation engine"
    );

    let db = SqliteDb::new(&config.database_url).await.unwrap_or_else(|e| {
        eprintln!("Database error: {e}");
        std::process::exit(1);
    });

    let service = Arc::new(EscalationService::new(
        db.clone(),
        db.clone(),
        db.clone(),
        db.clone(),
        db.clone(),
        LoggingNotifier::new(),
        db,
        config.engine,
    ));

    let monitor = EscalationMonitor::new(service, config.sweep_interval_minutes);
    let handle = monitor.spawn();

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
    handle.shutdown().await;
}
