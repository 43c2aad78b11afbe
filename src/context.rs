/// Application context and dependency injection
use crate::{
    config::{ProviderConfig, ServerConfig},
    error::HandlesResult,
    identity::{Did, DidProvider, MemoryProvider, PostgresProvider},
};
use std::sync::Arc;
use tracing::info;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub provider: Arc<dyn DidProvider>,
}

impl AppContext {
    /// Create a new application context from configuration
    ///
    /// Builds the configured provider; a provider that cannot start aborts
    /// startup.
    pub async fn new(config: ServerConfig) -> HandlesResult<Self> {
        let provider: Arc<dyn DidProvider> = match &config.provider {
            ProviderConfig::Memory { dids, domains } => Arc::new(MemoryProvider::new(
                dids.iter()
                    .map(|(handle, did)| (handle.clone(), Did::new(did.as_str()))),
                domains.iter().cloned(),
            )),
            ProviderConfig::Postgres(settings) => {
                Arc::new(PostgresProvider::connect(settings).await?)
            }
        };

        info!(provider = provider.name(), "Instantiated DID provider");

        Ok(Self::with_provider(config, provider))
    }

    /// Create a context around an already constructed provider
    pub fn with_provider(config: ServerConfig, provider: Arc<dyn DidProvider>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
        }
    }
}
