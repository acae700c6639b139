use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use uuid::Uuid;

use crate::dns_name::DnsName;
use crate::dns_protocol::DnsProtocol;
use crate::dns_record::{QClass, QType};
use crate::script::ScriptFunction;

/// How a backend's state is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    Auto,
    Up,
    Down,
    Lazy,
}

impl FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "lazy" => Ok(Self::Lazy),
            other => Err(format!(
                "unknown health-check mode '{}'. Expected: auto, up, down or lazy",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LazyHealthCheckMode {
    #[default]
    Disabled,
    TimeoutOnly,
    TimeoutOrServFail,
}

impl LazyHealthCheckMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::TimeoutOnly => "TimeoutOnly",
            Self::TimeoutOrServFail => "TimeoutOrServFail",
        }
    }
}

impl FromStr for LazyHealthCheckMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "timeoutonly" => Ok(Self::TimeoutOnly),
            "timeoutorservfail" => Ok(Self::TimeoutOrServFail),
            other => Err(format!("unknown lazy health-check mode '{}'", other)),
        }
    }
}

impl fmt::Display for LazyHealthCheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of the traffic-driven health check. Only captured here, the
/// back-off state machine runs elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyHealthCheck {
    pub mode: LazyHealthCheckMode,
    pub sample_size: u16,
    pub min_sample_count: u16,
    pub threshold: u8,
    pub interval: u16,
    pub use_exponential_back_off: bool,
    pub max_back_off: u16,
}

impl Default for LazyHealthCheck {
    fn default() -> Self {
        Self {
            mode: LazyHealthCheckMode::Disabled,
            sample_size: 100,
            min_sample_count: 1,
            threshold: 20,
            interval: 30,
            use_exponential_back_off: false,
            max_back_off: 3600,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthCheckParams {
    pub availability: Availability,
    pub qname: DnsName,
    pub qtype: QType,
    pub qclass: QClass,
    pub timeout_ms: u16,
    pub interval: u16,
    pub use_tcp: bool,
    pub set_cd: bool,
    pub must_resolve: bool,
    pub max_failures: u8,
    pub rise: u8,
    pub function: Option<ScriptFunction>,
    pub lazy: LazyHealthCheck,
}

impl Default for HealthCheckParams {
    fn default() -> Self {
        Self {
            availability: Availability::Auto,
            qname: DnsName::root(),
            qtype: QType::A,
            qclass: QClass::IN,
            timeout_ms: 1000,
            interval: 1,
            use_tcp: false,
            set_cd: false,
            must_resolve: false,
            max_failures: 1,
            rise: 1,
            function: None,
            lazy: LazyHealthCheck::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsClientParams {
    pub provider: String,
    pub subject_name: String,
    pub subject_address: Option<IpAddr>,
    pub ciphers: String,
    pub ciphers_tls_13: String,
    pub ca_store: String,
    pub key_log_file: String,
    pub validate_certificate: bool,
    pub release_buffers: bool,
    pub enable_renegotiation: bool,
    pub ktls: bool,
    pub ignore_configuration_errors: bool,
}

impl TlsClientParams {
    /// Name checked against the server certificate, if any.
    pub fn verification_name(&self) -> Option<String> {
        if !self.subject_name.is_empty() {
            return Some(self.subject_name.clone());
        }
        self.subject_address.map(|ip| ip.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DohBackendParams {
    pub path: String,
    pub add_x_forwarded_headers: bool,
}

/// Plain backends probed for an encrypted twin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoUpgrade {
    pub interval: u32,
    pub pool: String,
    pub doh_key: u8,
    pub keep: bool,
    pub use_lazy_health_check: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TcpTimeouts {
    pub connect: u16,
    pub send: u16,
    pub receive: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendEndpoint {
    pub id: Uuid,
    pub name: String,
    pub address: SocketAddr,
    pub source: String,
    pub protocol: DnsProtocol,
    pub pools: Vec<String>,
    pub order: i32,
    pub weight: i32,
    pub sockets: u32,
    pub qps: Option<u32>,
    pub max_in_flight: u32,
    pub max_concurrent_tcp_connections: u32,
    pub tcp_only: bool,
    pub use_client_subnet: bool,
    pub use_proxy_protocol: bool,
    pub disable_zero_scope: bool,
    pub reconnect_on_up: bool,
    pub tcp_timeouts: TcpTimeouts,
    pub cpus: Vec<u32>,
    pub tls: Option<TlsClientParams>,
    pub doh: Option<DohBackendParams>,
    pub health_check: HealthCheckParams,
    pub auto_upgrade: Option<AutoUpgrade>,
    /// Name of the raw-socket map the backend receives responses through
    pub xsk_map: Option<String>,
    /// False when built by a check-config run.
    pub activate: bool,
}

impl BackendEndpoint {
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            self.address.to_string()
        } else {
            format!("{} ({})", self.name, self.address)
        }
    }
}
