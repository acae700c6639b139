use arc_swap::ArcSwapOption;
use ferrous_proxy_application::ports::GenerationStore;
use ferrous_proxy_application::ProxyGeneration;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Lock-free holder of the active generation. Readers never block a reload
/// and keep the generation they loaded until they drop it.
#[derive(Default)]
pub struct ArcSwapGenerationStore {
    current: ArcSwapOption<ProxyGeneration>,
    published: AtomicU64,
}

impl ArcSwapGenerationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generation(generation: Arc<ProxyGeneration>) -> Self {
        let store = Self::new();
        store.publish(generation);
        store
    }

    /// Number of generations published so far.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl GenerationStore for ArcSwapGenerationStore {
    fn current(&self) -> Option<Arc<ProxyGeneration>> {
        self.current.load_full()
    }

    fn publish(&self, generation: Arc<ProxyGeneration>) {
        let frontends = generation.frontends.len();
        let backends = generation.backends.len();
        self.current.store(Some(generation));
        let number = self.published.fetch_add(1, Ordering::Relaxed) + 1;
        info!(generation = number, frontends, backends, "Configuration generation published");
    }
}
