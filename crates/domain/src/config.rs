pub mod actions;
pub mod binds;
pub mod dynamic_rules;
pub mod errors;
pub mod health;
pub mod logging;
pub mod objects;
pub mod root;
pub mod rules;
pub mod script;
pub mod selectors;
pub mod server;
pub mod upstream;

pub use actions::{
    ActionConfig, ActionKindConfig, DnstapLogActionConfig, RemoteLogActionConfig,
    ResponseActionConfig, ResponseActionKindConfig, SpoofVarsConfig,
};
pub use binds::{BindConfig, IncomingDohConfig, IncomingQuicConfig, IncomingTlsConfig};
pub use dynamic_rules::{DynamicRuleConfig, DynamicRulesConfig, DynamicRulesSettingsConfig};
pub use errors::ConfigError;
pub use health::{HealthCheckConfig, LazyHealthCheckConfig};
pub use logging::LoggingConfig;
pub use objects::{
    CustomLoadBalancingPolicyConfig, EbpfConfig, EbpfMapConfig, KeyValueStoresConfig,
    LoadBalancingPoliciesConfig, NetmaskGroupConfig, PacketCacheConfig, PoolConfig,
    RemoteLoggingConfig, XskConfig,
};
pub use root::Config;
pub use rules::{QueryRuleConfig, ResponseRuleConfig};
pub use script::ScriptSourceConfig;
pub use selectors::{SelectorConfig, SelectorKindConfig};
pub use server::{ConsoleConfig, QueryCountConfig, WebserverConfig};
pub use upstream::{BackendConfig, OutgoingTlsConfig};
