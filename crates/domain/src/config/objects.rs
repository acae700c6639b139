use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PacketCacheConfig {
    pub name: String,

    pub size: usize,

    #[serde(default = "default_max_ttl")]
    pub max_ttl: u32,

    #[serde(default)]
    pub min_ttl: u32,

    #[serde(default = "default_sixty")]
    pub temporary_failure_ttl: u32,

    #[serde(default = "default_max_negative_ttl")]
    pub max_negative_ttl: u32,

    #[serde(default = "default_sixty")]
    pub stale_ttl: u32,

    #[serde(default)]
    pub dont_age: bool,

    #[serde(default = "default_shards")]
    pub shards: u32,

    #[serde(default = "default_true")]
    pub deferrable_insert_lock: bool,

    /// EDNS option codes left out of the cache key
    #[serde(default)]
    pub options_to_skip: Vec<String>,

    /// Include cookies in the cache key
    #[serde(default)]
    pub cookie_hashing: bool,

    #[serde(default = "default_maximum_entry_size")]
    pub maximum_entry_size: usize,

    #[serde(default)]
    pub parse_ecs: bool,

    #[serde(default)]
    pub keep_stale_data: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CustomLoadBalancingPolicyConfig {
    pub name: String,

    #[serde(default)]
    pub function_name: String,

    #[serde(default)]
    pub function_code: String,

    #[serde(default)]
    pub function_file: String,

    #[serde(default)]
    pub ffi: bool,

    #[serde(default)]
    pub per_thread: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoadBalancingPoliciesConfig {
    #[serde(default = "default_policy")]
    pub default_policy: String,

    #[serde(default)]
    pub custom_policies: Vec<CustomLoadBalancingPolicyConfig>,
}

impl Default for LoadBalancingPoliciesConfig {
    fn default() -> Self {
        Self {
            default_policy: default_policy(),
            custom_policies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PoolConfig {
    pub name: String,

    /// Name of a registered packet cache
    #[serde(default)]
    pub packet_cache: String,

    /// Name of a registered load-balancing policy
    #[serde(default)]
    pub policy: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NetmaskGroupConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub netmasks: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LmdbKvsConfig {
    pub name: String,
    pub file_name: String,
    pub database_name: String,

    #[serde(default)]
    pub no_lock: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CdbKvsConfig {
    pub name: String,
    pub file_name: String,

    #[serde(default)]
    pub refresh_delay: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceIpKeyConfig {
    pub name: String,

    #[serde(default = "default_v4_mask")]
    pub v4_mask: u8,

    #[serde(default = "default_v6_mask")]
    pub v6_mask: u8,

    #[serde(default)]
    pub include_port: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QnameKeyConfig {
    pub name: String,

    #[serde(default = "default_true")]
    pub wire_format: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SuffixKeyConfig {
    pub name: String,

    #[serde(default)]
    pub minimum_labels: u16,

    #[serde(default = "default_true")]
    pub wire_format: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagKeyConfig {
    pub name: String,
    pub tag: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LookupKeysConfig {
    #[serde(default)]
    pub source_ip_keys: Vec<SourceIpKeyConfig>,

    #[serde(default)]
    pub qname_keys: Vec<QnameKeyConfig>,

    #[serde(default)]
    pub suffix_keys: Vec<SuffixKeyConfig>,

    #[serde(default)]
    pub tag_keys: Vec<TagKeyConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KeyValueStoresConfig {
    #[serde(default)]
    pub lmdb: Vec<LmdbKvsConfig>,

    #[serde(default)]
    pub cdb: Vec<CdbKvsConfig>,

    #[serde(default)]
    pub lookup_keys: LookupKeysConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtobufLoggerConfig {
    pub name: String,
    pub address: String,

    #[serde(default = "default_logger_timeout")]
    pub timeout: u16,

    #[serde(default = "default_max_queued_entries")]
    pub max_queued_entries: u64,

    #[serde(default = "default_reconnect_wait_time")]
    pub reconnect_wait_time: u8,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnstapLoggerConfig {
    pub name: String,

    /// `unix` or `tcp`
    pub transport: String,

    pub address: String,

    #[serde(default)]
    pub buffer_hint: u32,

    #[serde(default)]
    pub flush_timeout: u32,

    #[serde(default)]
    pub input_queue_size: u32,

    #[serde(default)]
    pub output_queue_size: u32,

    #[serde(default)]
    pub queue_notify_threshold: u32,

    #[serde(default)]
    pub reopen_interval: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RemoteLoggingConfig {
    #[serde(default)]
    pub protobuf_loggers: Vec<ProtobufLoggerConfig>,

    #[serde(default)]
    pub dnstap_loggers: Vec<DnstapLoggerConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct XskConfig {
    pub name: String,
    pub interface: String,

    #[serde(default = "default_xsk_queues")]
    pub queues: u16,

    #[serde(default = "default_xsk_frames")]
    pub frames: u32,

    #[serde(default = "default_xsk_map_path")]
    pub map_path: String,
}

/// Kernel-side filter maps. The filter is only created when the IPv4, IPv6
/// and qname maps all have room for entries.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EbpfConfig {
    pub ipv4: EbpfMapConfig,
    pub ipv6: EbpfMapConfig,
    pub qnames: EbpfMapConfig,
    pub cidr_ipv4: EbpfMapConfig,
    pub cidr_ipv6: EbpfMapConfig,

    /// Maps are managed by an external program and carry actions
    pub external: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EbpfMapConfig {
    pub max_entries: u32,
    pub pinned_path: String,
}

fn default_true() -> bool {
    true
}

fn default_max_ttl() -> u32 {
    86_400
}

fn default_sixty() -> u32 {
    60
}

fn default_max_negative_ttl() -> u32 {
    3_600
}

fn default_shards() -> u32 {
    20
}

fn default_maximum_entry_size() -> usize {
    4_096
}

fn default_policy() -> String {
    "leastOutstanding".to_string()
}

fn default_v4_mask() -> u8 {
    32
}

fn default_v6_mask() -> u8 {
    128
}

fn default_logger_timeout() -> u16 {
    2
}

fn default_max_queued_entries() -> u64 {
    100
}

fn default_reconnect_wait_time() -> u8 {
    1
}

fn default_xsk_queues() -> u16 {
    1
}

fn default_xsk_frames() -> u32 {
    65_536
}

fn default_xsk_map_path() -> String {
    "/sys/fs/bpf/ferrous-proxy/xskmap".to_string()
}
