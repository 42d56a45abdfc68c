use crate::config::ServerConfig;
use crate::error::ServerResult;
use std::sync::Arc;
use vawg::AppContext;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Loaded dataset, embedder and model (shared across requests)
    pub context: Arc<AppContext>,
}

impl ServerState {
    /// Load the pipeline described by `config`. Fails if the dataset or model cannot be loaded.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let app_config = config.app_config()?;
        let context = AppContext::load(app_config)?;
        Ok(Self::with_context(config, Arc::new(context)))
    }

    /// Wrap an already loaded context
    pub fn with_context(config: ServerConfig, context: Arc<AppContext>) -> Self {
        Self {
            config: Arc::new(config),
            context,
        }
    }
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
    pub records: usize,
    pub model_columns: usize,
    pub embedding_model: String,
}
