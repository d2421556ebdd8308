use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use zota_deposit_backend::api::{self, AppState};
use zota_deposit_backend::config::AppConfig;
use zota_deposit_backend::gateway::ZotaClient;
use zota_deposit_backend::logging::init_tracing;
use zota_deposit_backend::orders::OrderStore;
use zota_deposit_backend::services::DepositFlow;
use zota_deposit_backend::workers::PollerRegistry;

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_tracing(&config.logging);
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "🚀 Starting Zota deposit backend"
    );
    info!(
        base_url = %config.gateway.base_url,
        endpoint_id = %config.gateway.endpoint_id,
        poll_interval_secs = config.poller.poll_interval.as_secs(),
        poll_max_attempts = config.poller.max_attempts,
        "Configuration loaded"
    );

    let client = ZotaClient::new(config.gateway.zota_config()).map_err(|e| {
        error!(error = %e, "Failed to build Zota client");
        e
    })?;

    let store = OrderStore::new();
    let pollers = PollerRegistry::new();
    let flow = DepositFlow::new(
        store,
        Arc::new(client),
        config.gateway.deposit_settings(),
        pollers.clone(),
        config.poller.clone(),
    )
    .with_max_insert_attempts(config.flow.max_insert_attempts);

    let app = api::router(AppState::new(flow)).layer(api::cors_layer(&config.server));
    info!("✅ Routes configured");

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("❌ Failed to bind to address {}: {}", addr, e);
        e
    })?;

    info!(address = %addr, "🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pollers.shutdown(config.poller.shutdown_timeout).await;

    info!("👋 Server shutdown complete");

    Ok(())
}
