//! Ferrous Proxy Domain Layer
pub mod action;
pub mod config;
pub mod dns_name;
pub mod dns_protocol;
pub mod dns_record;
pub mod dynblock;
pub mod endpoint;
pub mod errors;
pub mod listener;
pub mod netmask;
pub mod objects;
pub mod rule;
pub mod script;
pub mod selector;
pub mod settings;

pub use action::{Action, DnsActionKind, ResponseAction, ResponseConfig};
pub use config::{Config, ConfigError};
pub use dns_name::{DnsName, DnsNameSet, SuffixMatchNode};
pub use dns_protocol::{parse_socket_addr, DnsProtocol};
pub use dns_record::{QClass, QType, RCode};
pub use dynblock::{
    BlockDecision, BlockVerdict, Detector, DynamicBlockGroup, DynamicBlockKind, DynamicBlockRule,
    GlobalStats, SourceStats, TagSettings,
};
pub use endpoint::{Availability, BackendEndpoint, HealthCheckParams, LazyHealthCheckMode};
pub use errors::DomainError;
pub use listener::{FrontendListener, ListenerExtension, Transport};
pub use netmask::{Netmask, NetmaskGroup};
pub use rule::{ChainKind, Rule, RuleChain, RuleChains};
pub use script::{ScriptFlavour, ScriptFunction, ScriptOrigin};
pub use selector::{MatchHost, QueryView, SelectorArena, SelectorId, SelectorNode};
pub use settings::RuntimeSettings;
