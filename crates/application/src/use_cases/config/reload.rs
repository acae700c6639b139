use ferrous_proxy_domain::DomainError;
use std::sync::Arc;
use tracing::{info, warn};

use super::load::LoadConfigUseCase;
use crate::ports::GenerationStore;
use crate::services::{LoadMode, ProxyGeneration};

/// Reads the configuration file again and swaps in the new generation. A
/// failed load leaves the active generation in place.
pub struct ReloadConfigUseCase {
    loader: Arc<LoadConfigUseCase>,
    store: Arc<dyn GenerationStore>,
}

impl ReloadConfigUseCase {
    pub fn new(loader: Arc<LoadConfigUseCase>, store: Arc<dyn GenerationStore>) -> Self {
        Self { loader, store }
    }

    pub fn execute(&self, config_path: &str) -> Result<Arc<ProxyGeneration>, DomainError> {
        let source = self.loader.ports().files.read_to_string(config_path)?;
        let generation = match self.loader.execute(&source, LoadMode::Normal) {
            Ok(generation) => Arc::new(generation),
            Err(e) => {
                warn!(path = %config_path, error = %e, "Reload failed, keeping the active configuration");
                return Err(e);
            }
        };

        self.store.publish(generation.clone());
        info!("Configuration reloaded successfully from: {}", config_path);
        Ok(generation)
    }
}
