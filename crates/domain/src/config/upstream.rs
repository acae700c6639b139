use serde::{Deserialize, Serialize};

use super::health::HealthCheckConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    pub address: String,

    /// Explicit UUID, generated when empty
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default = "default_protocol")]
    pub protocol: String,

    #[serde(default)]
    pub tls: OutgoingTlsConfig,

    #[serde(default)]
    pub doh: OutgoingDohConfig,

    #[serde(default)]
    pub use_client_subnet: bool,

    #[serde(default)]
    pub use_proxy_protocol: bool,

    #[serde(default)]
    pub queries_per_second: u32,

    #[serde(default = "default_one")]
    pub order: i32,

    #[serde(default = "default_one")]
    pub weight: i32,

    #[serde(default)]
    pub pools: Vec<String>,

    #[serde(default)]
    pub tcp: OutgoingTcpConfig,

    #[serde(default)]
    pub health_checks: HealthCheckConfig,

    #[serde(default)]
    pub source: String,

    #[serde(default = "default_sockets")]
    pub sockets: u32,

    #[serde(default)]
    pub disable_zero_scope: bool,

    #[serde(default)]
    pub reconnect_on_up: bool,

    #[serde(default)]
    pub max_in_flight: u32,

    #[serde(default)]
    pub tcp_only: bool,

    #[serde(default)]
    pub auto_upgrade: AutoUpgradeConfig,

    #[serde(default)]
    pub max_concurrent_tcp_connections: u32,

    /// Space-separated CPU indexes
    #[serde(default)]
    pub cpus: String,

    /// Name of a declared XSK map
    #[serde(default)]
    pub xsk: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutgoingTlsConfig {
    #[serde(default = "default_tls_provider")]
    pub provider: String,

    #[serde(default)]
    pub subject_name: String,

    #[serde(default)]
    pub subject_address: String,

    #[serde(default = "default_true")]
    pub validate_certificate: bool,

    #[serde(default)]
    pub ca_store: String,

    #[serde(default)]
    pub ciphers: String,

    #[serde(default)]
    pub ciphers_tls_13: String,

    #[serde(default)]
    pub key_log_file: String,

    #[serde(default = "default_true")]
    pub release_buffers: bool,

    #[serde(default)]
    pub enable_renegotiation: bool,

    #[serde(default)]
    pub ktls: bool,

    /// Skip the backend instead of failing the load when its TLS context
    /// cannot be built
    #[serde(default)]
    pub ignore_configuration_errors: bool,
}

impl Default for OutgoingTlsConfig {
    fn default() -> Self {
        Self {
            provider: default_tls_provider(),
            subject_name: String::new(),
            subject_address: String::new(),
            validate_certificate: true,
            ca_store: String::new(),
            ciphers: String::new(),
            ciphers_tls_13: String::new(),
            key_log_file: String::new(),
            release_buffers: true,
            enable_renegotiation: false,
            ktls: false,
            ignore_configuration_errors: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutgoingDohConfig {
    #[serde(default = "default_doh_path")]
    pub path: String,

    #[serde(default)]
    pub add_x_forwarded_headers: bool,
}

impl Default for OutgoingDohConfig {
    fn default() -> Self {
        Self {
            path: default_doh_path(),
            add_x_forwarded_headers: false,
        }
    }
}

/// Timeouts are in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutgoingTcpConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u16,

    #[serde(default = "default_io_timeout")]
    pub send_timeout: u16,

    #[serde(default = "default_io_timeout")]
    pub receive_timeout: u16,
}

impl Default for OutgoingTcpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            send_timeout: default_io_timeout(),
            receive_timeout: default_io_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutoUpgradeConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_upgrade_interval")]
    pub interval: u32,

    #[serde(default)]
    pub keep: bool,

    #[serde(default)]
    pub pool: String,

    #[serde(default = "default_doh_key")]
    pub doh_key: u8,

    #[serde(default)]
    pub use_lazy_health_check: bool,
}

impl Default for AutoUpgradeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: default_upgrade_interval(),
            keep: false,
            pool: String::new(),
            doh_key: default_doh_key(),
            use_lazy_health_check: false,
        }
    }
}

fn default_protocol() -> String {
    "Do53".to_string()
}

fn default_one() -> i32 {
    1
}

fn default_sockets() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_tls_provider() -> String {
    "rustls".to_string()
}

fn default_doh_path() -> String {
    "/dns-query".to_string()
}

fn default_connect_timeout() -> u16 {
    5
}

fn default_io_timeout() -> u16 {
    30
}

fn default_upgrade_interval() -> u32 {
    3600
}

fn default_doh_key() -> u8 {
    7
}
