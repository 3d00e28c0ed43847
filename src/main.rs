use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::signal;

use sis_admin::{
    config::AppConfig,
    create_router,
    services::{
        auth::AuthService,
        database::Database,
        storage::StorageService,
        token::TokenService,
        user_store::{AdminUserStore, InMemoryAdminUserStore, MongoAdminUserStore},
    },
    utils, AppState,
};

/// Graceful shutdown signal handler
///
/// Lets in-flight requests complete on Ctrl+C or SIGTERM
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
            Ok(mut stream) => {
                stream.recv().await;
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
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    utils::logging::init_logging()?;

    let config = Arc::new(AppConfig::load()?);

    let users: Arc<dyn AdminUserStore> = if config.app.dev_mode {
        Arc::new(InMemoryAdminUserStore::with_dev_admin(&config.dev_admin).await?)
    } else {
        let database = Database::new(&config.database.url, &config.database.name).await?;
        Arc::new(MongoAdminUserStore::new(&database))
    };

    let tokens = Arc::new(TokenService::new(&config.jwt));
    let state = AppState {
        auth: AuthService::new(users, tokens),
        storage: Arc::new(StorageService::new(&config.storage)),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from((config.server.host.parse::<std::net::IpAddr>()?, config.server.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
