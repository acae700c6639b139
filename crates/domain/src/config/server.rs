use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub listen_address: String,

    /// Base64-encoded shared secret
    #[serde(default)]
    pub key: String,

    #[serde(default = "default_local_acl")]
    pub acl: Vec<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            listen_address: String::new(),
            key: String::new(),
            acl: default_local_acl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct HttpHeaderConfig {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebserverConfig {
    #[serde(default)]
    pub listen_addresses: Vec<String>,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub hash_plaintext_credentials: bool,

    #[serde(default = "default_local_acl")]
    pub acl: Vec<String>,

    #[serde(default)]
    pub custom_headers: Vec<HttpHeaderConfig>,

    #[serde(default = "default_true")]
    pub api_requires_authentication: bool,

    #[serde(default = "default_true")]
    pub stats_require_authentication: bool,

    #[serde(default = "default_true")]
    pub dashboard_requires_authentication: bool,

    #[serde(default = "default_max_web_connections")]
    pub max_concurrent_connections: u32,

    #[serde(default)]
    pub api_configuration_directory: String,

    #[serde(default)]
    pub api_read_write: bool,
}

impl Default for WebserverConfig {
    fn default() -> Self {
        Self {
            listen_addresses: Vec::new(),
            password: String::new(),
            api_key: String::new(),
            hash_plaintext_credentials: false,
            acl: default_local_acl(),
            custom_headers: Vec::new(),
            api_requires_authentication: true,
            stats_require_authentication: true,
            dashboard_requires_authentication: true,
            max_concurrent_connections: default_max_web_connections(),
            api_configuration_directory: String::new(),
            api_read_write: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CarbonConfig {
    pub address: String,

    #[serde(default)]
    pub name: String,

    #[serde(default = "default_carbon_interval")]
    pub interval: u32,

    #[serde(default = "default_carbon_namespace")]
    pub namespace: String,

    #[serde(default = "default_carbon_instance")]
    pub instance: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub carbon: Vec<CarbonConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QueryCountConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub filter_function_name: String,

    #[serde(default)]
    pub filter_function_code: String,

    #[serde(default)]
    pub filter_function_file: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TlsTuningConfig {
    #[serde(default)]
    pub engines: Vec<String>,

    #[serde(default)]
    pub providers: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TcpFastOpenConfig {
    /// Four dash-separated 32-bit hex words
    #[serde(default)]
    pub fast_open_key: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TuningConfig {
    #[serde(default)]
    pub tls: TlsTuningConfig,

    #[serde(default)]
    pub tcp: TcpFastOpenConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub capabilities_to_retain: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProxyProtocolConfig {
    #[serde(default)]
    pub acl: Vec<String>,
}

fn default_local_acl() -> Vec<String> {
    vec!["127.0.0.1".to_string(), "::1".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_max_web_connections() -> u32 {
    100
}

fn default_carbon_interval() -> u32 {
    30
}

fn default_carbon_namespace() -> String {
    "ferrous-proxy".to_string()
}

fn default_carbon_instance() -> String {
    "main".to_string()
}
