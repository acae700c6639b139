use serde::{Deserialize, Serialize};

use super::actions::{ActionConfig, ResponseActionConfig};
use super::binds::BindConfig;
use super::dynamic_rules::{DynamicRulesConfig, DynamicRulesSettingsConfig};
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::objects::{
    EbpfConfig, KeyValueStoresConfig, LoadBalancingPoliciesConfig, NetmaskGroupConfig,
    PacketCacheConfig, PoolConfig, RemoteLoggingConfig, XskConfig,
};
use super::rules::{QueryRuleConfig, ResponseRuleConfig};
use super::selectors::SelectorConfig;
use super::server::{
    ConsoleConfig, GeneralConfig, MetricsConfig, ProxyProtocolConfig, QueryCountConfig,
    TuningConfig, WebserverConfig,
};
use super::upstream::BackendConfig;

/// Main configuration structure for Ferrous Proxy
///
/// Every section is optional. Sections are processed in a fixed order, so a
/// name declared in one section can be referenced by every later one.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,

    pub console: ConsoleConfig,

    /// Networks allowed to send queries
    pub acl: Vec<String>,

    pub webserver: WebserverConfig,

    pub tuning: TuningConfig,

    pub general: GeneralConfig,

    pub proxy_protocol: ProxyProtocolConfig,

    pub metrics: MetricsConfig,

    pub query_count: QueryCountConfig,

    pub netmask_groups: Vec<NetmaskGroupConfig>,

    pub key_value_stores: KeyValueStoresConfig,

    pub remote_logging: RemoteLoggingConfig,

    pub ebpf: EbpfConfig,

    pub xsk: Vec<XskConfig>,

    pub binds: Vec<BindConfig>,

    pub backends: Vec<BackendConfig>,

    pub pools: Vec<PoolConfig>,

    pub packet_caches: Vec<PacketCacheConfig>,

    pub load_balancing_policies: LoadBalancingPoliciesConfig,

    pub dynamic_rules_settings: DynamicRulesSettingsConfig,

    pub dynamic_rules: Vec<DynamicRulesConfig>,

    pub selectors: Vec<SelectorConfig>,

    pub actions: Vec<ActionConfig>,

    pub response_actions: Vec<ResponseActionConfig>,

    pub query_rules: Vec<QueryRuleConfig>,

    pub cache_miss_rules: Vec<QueryRuleConfig>,

    pub response_rules: Vec<ResponseRuleConfig>,

    pub cache_hit_response_rules: Vec<ResponseRuleConfig>,

    pub cache_inserted_response_rules: Vec<ResponseRuleConfig>,

    pub self_answered_response_rules: Vec<ResponseRuleConfig>,

    pub xfr_response_rules: Vec<ResponseRuleConfig>,
}

impl Config {
    /// Parse a configuration document
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Locate the configuration file
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-proxy.toml in current directory
    /// 3. /etc/ferrous-proxy/config.toml
    pub fn locate(path: Option<&str>) -> Result<String, ConfigError> {
        if let Some(path) = path {
            return Ok(path.to_string());
        }
        ["ferrous-proxy.toml", "/etc/ferrous-proxy/config.toml"]
            .into_iter()
            .find(|candidate| std::path::Path::new(candidate).exists())
            .map(str::to_string)
            .ok_or_else(|| {
                ConfigError::FileRead(
                    "ferrous-proxy.toml".to_string(),
                    "no configuration file found".to_string(),
                )
            })
    }

    pub fn rule_count(&self) -> usize {
        self.query_rules.len()
            + self.cache_miss_rules.len()
            + self.response_rules.len()
            + self.cache_hit_response_rules.len()
            + self.cache_inserted_response_rules.len()
            + self.self_answered_response_rules.len()
            + self.xfr_response_rules.len()
    }
}
