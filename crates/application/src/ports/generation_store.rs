use std::sync::Arc;

use crate::services::ProxyGeneration;

/// Holds the configuration generation currently serving traffic.
pub trait GenerationStore: Send + Sync {
    fn current(&self) -> Option<Arc<ProxyGeneration>>;

    /// Replaces the active generation in one step.
    fn publish(&self, generation: Arc<ProxyGeneration>);
}
