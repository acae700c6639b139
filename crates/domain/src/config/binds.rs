use serde::{Deserialize, Serialize};

use super::server::HttpHeaderConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BindConfig {
    pub listen_address: String,

    #[serde(default = "default_protocol")]
    pub protocol: String,

    #[serde(default = "default_threads")]
    pub threads: u32,

    #[serde(default)]
    pub reuseport: bool,

    #[serde(default)]
    pub interface: String,

    /// Space-separated CPU indexes
    #[serde(default)]
    pub cpus: String,

    #[serde(default)]
    pub enable_proxy_protocol: bool,

    #[serde(default)]
    pub tcp: IncomingTcpConfig,

    #[serde(default)]
    pub tls: IncomingTlsConfig,

    #[serde(default)]
    pub doh: IncomingDohConfig,

    #[serde(default)]
    pub quic: IncomingQuicConfig,

    #[serde(default)]
    pub dnscrypt: IncomingDnscryptConfig,

    #[serde(default)]
    pub additional_addresses: Vec<String>,

    /// Name of a registered XSK map
    #[serde(default)]
    pub xsk: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IncomingTcpConfig {
    #[serde(default)]
    pub max_in_flight_queries: u32,

    #[serde(default)]
    pub listen_queue_size: u32,

    #[serde(default)]
    pub fast_open_queue_size: u32,

    #[serde(default)]
    pub max_concurrent_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TlsCertificateConfig {
    pub certificate: String,

    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IncomingTlsConfig {
    #[serde(default = "default_tls_provider")]
    pub provider: String,

    #[serde(default)]
    pub certificates: Vec<TlsCertificateConfig>,

    #[serde(default)]
    pub ignore_configuration_errors: bool,

    #[serde(default)]
    pub ciphers: String,

    #[serde(default)]
    pub ciphers_tls_13: String,

    #[serde(default = "default_minimum_version")]
    pub minimum_version: String,

    #[serde(default)]
    pub ticket_key_file: String,

    #[serde(default = "default_tickets_keys_rotation_delay")]
    pub tickets_keys_rotation_delay: u32,

    #[serde(default = "default_number_of_tickets_keys")]
    pub number_of_tickets_keys: u32,

    #[serde(default = "default_true")]
    pub prefer_server_ciphers: bool,

    #[serde(default)]
    pub session_timeout: u32,

    #[serde(default = "default_true")]
    pub session_tickets: bool,

    #[serde(default = "default_number_of_stored_sessions")]
    pub number_of_stored_sessions: u32,

    #[serde(default)]
    pub ocsp_response_files: Vec<String>,

    #[serde(default)]
    pub key_log_file: String,

    #[serde(default = "default_true")]
    pub release_buffers: bool,

    #[serde(default)]
    pub enable_renegotiation: bool,

    #[serde(default)]
    pub async_mode: bool,

    #[serde(default)]
    pub ktls: bool,

    #[serde(default = "default_true")]
    pub read_ahead: bool,

    #[serde(default)]
    pub proxy_protocol_outside_tls: bool,
}

impl Default for IncomingTlsConfig {
    fn default() -> Self {
        Self {
            provider: default_tls_provider(),
            certificates: Vec::new(),
            ignore_configuration_errors: false,
            ciphers: String::new(),
            ciphers_tls_13: String::new(),
            minimum_version: default_minimum_version(),
            ticket_key_file: String::new(),
            tickets_keys_rotation_delay: default_tickets_keys_rotation_delay(),
            number_of_tickets_keys: default_number_of_tickets_keys(),
            prefer_server_ciphers: true,
            session_timeout: 0,
            session_tickets: true,
            number_of_stored_sessions: default_number_of_stored_sessions(),
            ocsp_response_files: Vec::new(),
            key_log_file: String::new(),
            release_buffers: true,
            enable_renegotiation: false,
            async_mode: false,
            ktls: false,
            read_ahead: true,
            proxy_protocol_outside_tls: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct HttpResponsesMapConfig {
    pub expression: String,

    pub status: u16,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub headers: Vec<HttpHeaderConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IncomingDohConfig {
    #[serde(default = "default_doh_provider")]
    pub provider: String,

    #[serde(default = "default_doh_paths")]
    pub paths: Vec<String>,

    #[serde(default = "default_doh_idle_timeout")]
    pub idle_timeout: u64,

    #[serde(default)]
    pub server_tokens: String,

    #[serde(default = "default_true")]
    pub send_cache_control_headers: bool,

    #[serde(default)]
    pub keep_incoming_headers: bool,

    #[serde(default)]
    pub trust_forwarded_for_header: bool,

    #[serde(default = "default_true")]
    pub early_acl_drop: bool,

    #[serde(default = "default_true")]
    pub exact_path_matching: bool,

    #[serde(default = "default_pipe_buffer_size")]
    pub internal_pipe_buffer_size: u32,

    #[serde(default)]
    pub custom_response_headers: Vec<HttpHeaderConfig>,

    #[serde(default)]
    pub responses_map: Vec<HttpResponsesMapConfig>,
}

impl Default for IncomingDohConfig {
    fn default() -> Self {
        Self {
            provider: default_doh_provider(),
            paths: default_doh_paths(),
            idle_timeout: default_doh_idle_timeout(),
            server_tokens: String::new(),
            send_cache_control_headers: true,
            keep_incoming_headers: false,
            trust_forwarded_for_header: false,
            early_acl_drop: true,
            exact_path_matching: true,
            internal_pipe_buffer_size: default_pipe_buffer_size(),
            custom_response_headers: Vec::new(),
            responses_map: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IncomingQuicConfig {
    #[serde(default = "default_quic_idle_timeout")]
    pub idle_timeout: u64,

    #[serde(default = "default_congestion_control")]
    pub congestion_control: String,

    #[serde(default = "default_pipe_buffer_size")]
    pub internal_pipe_buffer_size: u32,
}

impl Default for IncomingQuicConfig {
    fn default() -> Self {
        Self {
            idle_timeout: default_quic_idle_timeout(),
            congestion_control: default_congestion_control(),
            internal_pipe_buffer_size: default_pipe_buffer_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DnscryptCertificateConfig {
    pub certificate: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IncomingDnscryptConfig {
    #[serde(default)]
    pub provider_name: String,

    #[serde(default)]
    pub certificates: Vec<DnscryptCertificateConfig>,
}

fn default_protocol() -> String {
    "Do53".to_string()
}

fn default_threads() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_tls_provider() -> String {
    "rustls".to_string()
}

fn default_minimum_version() -> String {
    "tls1.2".to_string()
}

fn default_tickets_keys_rotation_delay() -> u32 {
    43_200
}

fn default_number_of_tickets_keys() -> u32 {
    5
}

fn default_number_of_stored_sessions() -> u32 {
    20_480
}

fn default_doh_provider() -> String {
    "nghttp2".to_string()
}

fn default_doh_paths() -> Vec<String> {
    vec!["/dns-query".to_string()]
}

fn default_doh_idle_timeout() -> u64 {
    30
}

fn default_quic_idle_timeout() -> u64 {
    5
}

fn default_congestion_control() -> String {
    "reno".to_string()
}

fn default_pipe_buffer_size() -> u32 {
    1_048_576
}
