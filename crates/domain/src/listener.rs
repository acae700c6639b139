use std::collections::BTreeSet;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::dns_protocol::DnsProtocol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Udp,
    Tcp,
    Quic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsCertificate {
    pub certificate: String,
    pub key: String,
    pub password: Option<String>,
}

/// Server-side TLS settings shared by DoT, DoH, DoH3 and DoQ listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsServerParams {
    pub provider: String,
    pub certificates: Vec<TlsCertificate>,
    pub ocsp_response_files: Vec<String>,
    pub ciphers: String,
    pub ciphers_tls_13: String,
    pub minimum_version: String,
    pub ticket_key_file: String,
    pub key_log_file: String,
    pub number_of_stored_sessions: u32,
    pub session_timeout: u32,
    pub tickets_keys_rotation_delay: u32,
    pub number_of_tickets_keys: u32,
    pub prefer_server_ciphers: bool,
    pub session_tickets: bool,
    pub release_buffers: bool,
    pub enable_renegotiation: bool,
    pub async_mode: bool,
    pub ktls: bool,
    pub read_ahead: bool,
    pub proxy_protocol_outside_tls: bool,
    pub ignore_configuration_errors: bool,
}

impl TlsServerParams {
    pub fn has_certificates(&self) -> bool {
        !self.certificates.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CongestionControl {
    #[default]
    Reno,
    Cubic,
    Bbr,
}

impl FromStr for CongestionControl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reno" => Ok(Self::Reno),
            "cubic" => Ok(Self::Cubic),
            "bbr" => Ok(Self::Bbr),
            other => Err(format!("unknown congestion control algorithm '{}'", other)),
        }
    }
}

/// HTTP engine behind a DoH listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DohEngine {
    #[default]
    Nghttp2,
    H2o,
}

impl DohEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nghttp2 => "nghttp2",
            Self::H2o => "h2o",
        }
    }
}

impl FromStr for DohEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nghttp2" => Ok(Self::Nghttp2),
            "h2o" => Ok(Self::H2o),
            other => Err(format!(
                "unknown DoH provider '{}'. Expected: nghttp2 or h2o",
                other
            )),
        }
    }
}

impl fmt::Display for DohEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DohResponse {
    pub path_regex: String,
    pub status: u16,
    pub content: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DohListenerParams {
    pub engine: DohEngine,
    pub paths: Vec<String>,
    pub idle_timeout: u64,
    pub server_tokens: String,
    pub send_cache_control_headers: bool,
    pub keep_incoming_headers: bool,
    pub trust_forwarded_for_header: bool,
    pub early_acl_drop: bool,
    pub exact_path_matching: bool,
    pub internal_pipe_buffer_size: u32,
    pub custom_response_headers: Vec<(String, String)>,
    pub responses_map: Vec<DohResponse>,
    /// Set when no certificate was given and the listener serves plain HTTP.
    pub plain_http: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuicListenerParams {
    pub idle_timeout: u64,
    pub congestion_control: CongestionControl,
    pub internal_pipe_buffer_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsCryptParams {
    pub provider_name: String,
    pub certificates: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerExtension {
    None,
    Doh(DohListenerParams),
    Doh3 {
        paths: Vec<String>,
        quic: QuicListenerParams,
    },
    Doq(QuicListenerParams),
    DnsCrypt(DnsCryptParams),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TcpTuning {
    pub fast_open_queue_size: u32,
    pub listen_queue_size: u32,
    pub max_in_flight_queries: u32,
    pub max_concurrent_connections: u32,
}

/// One socket of a bind declaration. A bind with `threads = N` produces N
/// stream (or QUIC) listeners, plus N UDP ones for plain and DNSCrypt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendListener {
    pub address: SocketAddr,
    pub protocol: DnsProtocol,
    pub transport: Transport,
    pub threads: u32,
    pub thread_index: u32,
    pub reuseport: bool,
    pub interface: String,
    pub cpus: BTreeSet<u32>,
    pub enable_proxy_protocol: bool,
    pub tcp: TcpTuning,
    pub tls: Option<TlsServerParams>,
    pub extension: ListenerExtension,
    pub xsk_map: Option<String>,
    pub additional_addresses: Vec<SocketAddr>,
    /// False when built by a check-config run.
    pub activate: bool,
}
