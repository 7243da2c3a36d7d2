//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::{DaemonConfig, StorageConfig};
use crate::error::{DaemonError, DaemonResult};
use crate::render::{HtmlRenderer, Renderer};
use crate::storage::{InMemoryStorage, MySqlStorage, PostgresStorage, SqliteStorage, Storage};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Wiki daemon server
pub struct Server {
    config: DaemonConfig,
    storage: Arc<dyn Storage>,
    renderer: Arc<dyn Renderer>,
}

impl Server {
    /// Create a new server with the given configuration
    ///
    /// Connects to storage and loads templates up front so that a bad
    /// database URL or template directory fails startup instead of requests.
    pub async fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let storage = connect_storage(&config.storage).await?;
        storage.ping().await?;
        tracing::info!(backend = storage.backend(), "Connected to storage");

        let renderer: Arc<dyn Renderer> = match &config.templates.dir {
            Some(dir) => Arc::new(HtmlRenderer::from_dir(dir)?),
            None => Arc::new(HtmlRenderer::builtin()?),
        };

        Ok(Self::with_parts(config, storage, renderer))
    }

    /// Assemble a server from already-built collaborators
    pub fn with_parts(
        config: DaemonConfig,
        storage: Arc<dyn Storage>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            config,
            storage,
            renderer,
        }
    }

    /// Run the server
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        let state = AppState::new(self.storage.clone(), self.renderer.clone());
        let app = create_router(state, self.config.server.max_body_size);

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Wiki daemon listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Wiki daemon shutting down");

        Ok(())
    }
}

async fn connect_storage(config: &StorageConfig) -> DaemonResult<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match (config, config.connection()) {
        (StorageConfig::Memory, _) | (_, None) => {
            tracing::warn!("Using in-memory storage; pages are lost on restart");
            Arc::new(InMemoryStorage::new())
        }
        (StorageConfig::Postgres { .. }, Some((url, settings))) => {
            Arc::new(PostgresStorage::new(url, &settings).await?)
        }
        (StorageConfig::MySql { .. }, Some((url, settings))) => {
            Arc::new(MySqlStorage::new(url, &settings).await?)
        }
        (StorageConfig::Sqlite { .. }, Some((url, settings))) => {
            Arc::new(SqliteStorage::new(url, &settings).await?)
        }
    };
    Ok(storage)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install signal handler");
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
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
