use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthCheckConfig {
    /// One of `auto`, `up`, `down` or `lazy`
    #[serde(default = "default_mode")]
    pub mode: String,

    #[serde(default = "default_qname")]
    pub qname: String,

    #[serde(default = "default_qclass")]
    pub qclass: String,

    #[serde(default = "default_qtype")]
    pub qtype: String,

    #[serde(default)]
    pub function: String,

    #[serde(default)]
    pub lua: String,

    #[serde(default)]
    pub lua_file: String,

    /// Milliseconds
    #[serde(default = "default_timeout")]
    pub timeout: u16,

    #[serde(default)]
    pub set_cd: bool,

    #[serde(default = "default_one")]
    pub max_failures: u8,

    #[serde(default = "default_one")]
    pub rise: u8,

    #[serde(default = "default_interval")]
    pub interval: u16,

    #[serde(default)]
    pub must_resolve: bool,

    #[serde(default)]
    pub use_tcp: bool,

    #[serde(default)]
    pub lazy: LazyHealthCheckConfig,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            qname: default_qname(),
            qclass: default_qclass(),
            qtype: default_qtype(),
            function: String::new(),
            lua: String::new(),
            lua_file: String::new(),
            timeout: default_timeout(),
            set_cd: false,
            max_failures: 1,
            rise: 1,
            interval: default_interval(),
            must_resolve: false,
            use_tcp: false,
            lazy: LazyHealthCheckConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LazyHealthCheckConfig {
    #[serde(default = "default_sample_size")]
    pub sample_size: u16,

    #[serde(default = "default_min_sample_count")]
    pub min_sample_count: u16,

    /// Percentage of failed samples
    #[serde(default = "default_threshold")]
    pub threshold: u8,

    #[serde(default = "default_lazy_interval")]
    pub interval: u16,

    #[serde(default)]
    pub use_exponential_back_off: bool,

    #[serde(default = "default_max_back_off")]
    pub max_back_off: u16,

    /// `TimeoutOnly` or `TimeoutOrServFail`
    #[serde(default = "default_lazy_mode")]
    pub mode: String,
}

impl Default for LazyHealthCheckConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            min_sample_count: default_min_sample_count(),
            threshold: default_threshold(),
            interval: default_lazy_interval(),
            use_exponential_back_off: false,
            max_back_off: default_max_back_off(),
            mode: default_lazy_mode(),
        }
    }
}

fn default_mode() -> String {
    "auto".to_string()
}

fn default_qname() -> String {
    "a.root-servers.net.".to_string()
}

fn default_qclass() -> String {
    "IN".to_string()
}

fn default_qtype() -> String {
    "A".to_string()
}

fn default_timeout() -> u16 {
    1000
}

fn default_one() -> u8 {
    1
}

fn default_interval() -> u16 {
    1
}

fn default_sample_size() -> u16 {
    100
}

fn default_min_sample_count() -> u16 {
    1
}

fn default_threshold() -> u8 {
    20
}

fn default_lazy_interval() -> u16 {
    30
}

fn default_max_back_off() -> u16 {
    3600
}

fn default_lazy_mode() -> String {
    "TimeoutOrServFail".to_string()
}
