use std::sync::Arc;

use chainscript_registry::LedgerRegistry;
use chainscript_store::{FileLedgerStore, InMemoryLedgerStore, LedgerStore};
use tokio::net::TcpListener;

use crate::auth::{AuthProvider, BearerIdentityAuth};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// ChainScript HTTP server.
pub struct ChainScriptServer {
    config: ServerConfig,
    state: AppState,
}

impl ChainScriptServer {
    /// Build a server from its config: open the store, create the registry,
    /// and make sure the default story exists.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store: Arc<dyn LedgerStore> = match &config.data_dir {
            Some(dir) => Arc::new(FileLedgerStore::open(dir).map_err(|e| {
                ServerError::Config(format!("data_dir {}: {e}", dir.display()))
            })?),
            None => Arc::new(InMemoryLedgerStore::new()),
        };
        Self::with_registry(config, Arc::new(LedgerRegistry::new(store)), Arc::new(BearerIdentityAuth))
    }

    /// Build a server around an existing registry and auth provider.
    pub fn with_registry(
        config: ServerConfig,
        registry: Arc<LedgerRegistry>,
        auth: Arc<dyn AuthProvider>,
    ) -> ServerResult<Self> {
        let default_story = config.default_story()?;
        registry.get_or_create(&default_story)?;
        let state = AppState::new(registry, auth, default_story);
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<LedgerRegistry> {
        &self.state.registry
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), &self.config.allowed_origins)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            persistent = self.config.data_dir.is_some(),
            "ChainScript server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
