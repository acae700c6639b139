use ferrous_proxy_domain::config::LoggingConfig;
use ferrous_proxy_domain::objects::{
    EbpfFilter, LoadBalancingPolicy, PacketCache, ServerPool, XskMap,
};
use ferrous_proxy_domain::{
    BackendEndpoint, DynamicBlockGroup, FrontendListener, RuleChains, RuntimeSettings,
    SelectorArena,
};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::context::LoadMode;

/// Everything one successful load produced. Immutable once built; a reload
/// builds a new one and the old one is dropped when its last reader lets go.
#[derive(Debug, Clone, Default)]
pub struct ProxyGeneration {
    pub mode: LoadMode,
    pub logging: LoggingConfig,
    pub settings: RuntimeSettings,
    pub frontends: Vec<FrontendListener>,
    pub backends: Vec<Arc<BackendEndpoint>>,
    pub pools: BTreeMap<String, ServerPool>,
    pub default_policy: Option<Arc<LoadBalancingPolicy>>,
    pub packet_caches: BTreeMap<String, Arc<PacketCache>>,
    pub ebpf_filter: Option<EbpfFilter>,
    pub xsk_maps: Vec<Arc<XskMap>>,
    /// Arena the chains' selector handles point into.
    pub selectors: SelectorArena,
    pub chains: RuleChains,
    pub dynamic_blocks: Vec<DynamicBlockGroup>,
}

impl ProxyGeneration {
    pub fn pool(&self, name: &str) -> Option<&ServerPool> {
        self.pools.get(name)
    }

    pub fn backend(&self, name: &str) -> Option<&Arc<BackendEndpoint>> {
        self.backends.iter().find(|backend| backend.name == name)
    }
}
