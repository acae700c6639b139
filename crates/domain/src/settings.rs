use std::net::SocketAddr;

use crate::action::DnsActionKind;
use crate::netmask::NetmaskGroup;
use crate::script::ScriptFunction;

pub const DEFAULT_CONSOLE_PORT: u16 = 5199;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSettings {
    pub listen_address: Option<SocketAddr>,
    pub acl: NetmaskGroup,
    pub key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebserverSettings {
    pub listen_addresses: Vec<SocketAddr>,
    pub password: String,
    pub api_key: String,
    pub hash_plaintext_credentials: bool,
    pub acl: NetmaskGroup,
    pub custom_headers: Vec<(String, String)>,
    pub api_requires_authentication: bool,
    pub stats_require_authentication: bool,
    pub dashboard_requires_authentication: bool,
    pub max_concurrent_connections: u32,
    pub api_configuration_directory: String,
    pub api_read_write: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarbonEndpoint {
    pub address: SocketAddr,
    pub name: String,
    pub interval: u32,
    pub namespace: String,
    pub instance: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryCountSettings {
    pub enabled: bool,
    pub filter: Option<ScriptFunction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TlsTuning {
    pub engines: Vec<String>,
    pub providers: Vec<String>,
}

/// Process-wide settings that are not attached to any entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuntimeSettings {
    pub acl: NetmaskGroup,
    pub console: Option<ConsoleSettings>,
    pub webserver: Option<WebserverSettings>,
    pub carbon: Vec<CarbonEndpoint>,
    pub query_count: Option<QueryCountSettings>,
    pub proxy_protocol_acl: NetmaskGroup,
    pub tls_tuning: TlsTuning,
    pub tcp_fast_open_key: Option<[u32; 4]>,
    pub capabilities_to_retain: Vec<String>,
    pub dynamic_block_default_action: DnsActionKind,
}

/// Parses `xxxxxxxx-xxxxxxxx-xxxxxxxx-xxxxxxxx`.
pub fn parse_tcp_fast_open_key(s: &str) -> Result<[u32; 4], String> {
    let words: Vec<&str> = s.trim().split('-').collect();
    if words.len() != 4 {
        return Err(format!(
            "invalid TCP fast open key '{}': expected 4 dash-separated words",
            s
        ));
    }
    let mut key = [0u32; 4];
    for (slot, word) in key.iter_mut().zip(&words) {
        *slot = u32::from_str_radix(word, 16)
            .map_err(|e| format!("invalid TCP fast open key '{}': {}", s, e))?;
    }
    Ok(key)
}
