use std::collections::BTreeSet;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::script::ScriptFunction;

/// EDNS option code of DNS cookies, never part of the cache key by default.
pub const EDNS_OPTION_COOKIE: u16 = 10;

/// Size of a DNS header, the smallest cacheable entry.
pub const DNS_HEADER_SIZE: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketCacheSettings {
    pub size: usize,
    pub max_ttl: u32,
    pub min_ttl: u32,
    pub temporary_failure_ttl: u32,
    pub max_negative_ttl: u32,
    pub stale_ttl: u32,
    pub dont_age: bool,
    pub shards: u32,
    pub deferrable_insert_lock: bool,
    pub parse_ecs: bool,
    pub keep_stale_data: bool,
    pub options_to_skip: BTreeSet<u16>,
    pub maximum_entry_size: usize,
}

impl Default for PacketCacheSettings {
    fn default() -> Self {
        Self {
            size: 100_000,
            max_ttl: 86_400,
            min_ttl: 0,
            temporary_failure_ttl: 60,
            max_negative_ttl: 3_600,
            stale_ttl: 60,
            dont_age: false,
            shards: 20,
            deferrable_insert_lock: true,
            parse_ecs: false,
            keep_stale_data: false,
            options_to_skip: BTreeSet::from([EDNS_OPTION_COOKIE]),
            maximum_entry_size: 4_096,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketCache {
    pub name: String,
    pub settings: PacketCacheSettings,
}

/// Load-balancing policies shipped with the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinPolicy {
    FirstAvailable,
    RoundRobin,
    WeightedRandom,
    WeightedHashed,
    ConsistentHashed,
    LeastOutstanding,
    OrderedWeightedRandomUntagged,
}

impl BuiltinPolicy {
    pub const ALL: [BuiltinPolicy; 7] = [
        BuiltinPolicy::FirstAvailable,
        BuiltinPolicy::RoundRobin,
        BuiltinPolicy::WeightedRandom,
        BuiltinPolicy::WeightedHashed,
        BuiltinPolicy::ConsistentHashed,
        BuiltinPolicy::LeastOutstanding,
        BuiltinPolicy::OrderedWeightedRandomUntagged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstAvailable => "firstAvailable",
            Self::RoundRobin => "roundrobin",
            Self::WeightedRandom => "wrandom",
            Self::WeightedHashed => "whashed",
            Self::ConsistentHashed => "chashed",
            Self::LeastOutstanding => "leastOutstanding",
            Self::OrderedWeightedRandomUntagged => "orderedWrandUntag",
        }
    }
}

impl fmt::Display for BuiltinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadBalancingPolicy {
    Builtin(BuiltinPolicy),
    Scripted {
        name: String,
        function: ScriptFunction,
    },
    /// Per-thread FFI policies get their own runtime in every worker, so only
    /// the source code is kept.
    PerThread {
        name: String,
        code: String,
    },
}

impl LoadBalancingPolicy {
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(policy) => policy.as_str(),
            Self::Scripted { name, .. } | Self::PerThread { name, .. } => name,
        }
    }
}

/// A named set of backends sharing a cache and a selection policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerPool {
    pub name: String,
    pub backends: Vec<Uuid>,
    pub packet_cache: Option<Arc<PacketCache>>,
    pub policy: Option<Arc<LoadBalancingPolicy>>,
}

impl ServerPool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValueBackend {
    Lmdb {
        file_name: String,
        database_name: String,
        no_lock: bool,
    },
    Cdb {
        file_name: String,
        refresh_delay: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueStore {
    pub name: String,
    pub backend: KeyValueBackend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKeyKind {
    SourceIp {
        v4_mask: u8,
        v6_mask: u8,
        include_port: bool,
    },
    QName {
        wire_format: bool,
    },
    Suffix {
        minimum_labels: u16,
        wire_format: bool,
    },
    Tag {
        tag: String,
    },
}

/// Describes how the lookup key is derived from a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    pub name: String,
    pub kind: LookupKeyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnstapTransport {
    Unix,
    Tcp,
}

impl FromStr for DnstapTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unix" => Ok(Self::Unix),
            "tcp" => Ok(Self::Tcp),
            other => Err(format!(
                "unsupported dnstap transport '{}'. Expected: unix or tcp",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStreamOptions {
    pub buffer_hint: u32,
    pub flush_timeout: u32,
    pub input_queue_size: u32,
    pub output_queue_size: u32,
    pub queue_notify_threshold: u32,
    pub reopen_interval: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteLoggerKind {
    Protobuf {
        address: SocketAddr,
        timeout: u16,
        max_queued_entries: u64,
        reconnect_wait_time: u8,
    },
    Dnstap {
        transport: DnstapTransport,
        address: String,
        options: FrameStreamOptions,
    },
    /// Registered in client and check-config modes, where nothing connects.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLogger {
    pub name: String,
    pub kind: RemoteLoggerKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EbpfMapKind {
    Ipv4,
    Ipv6,
    QNames,
    Cidr4,
    Cidr6,
}

impl EbpfMapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EbpfMapKind::Ipv4 => "ipv4",
            EbpfMapKind::Ipv6 => "ipv6",
            EbpfMapKind::QNames => "qnames",
            EbpfMapKind::Cidr4 => "cidr4",
            EbpfMapKind::Cidr6 => "cidr6",
        }
    }
}

/// Layout of the map values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EbpfMapFormat {
    Legacy,
    WithActions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EbpfMap {
    pub kind: EbpfMapKind,
    pub max_entries: u32,
    pub pinned_path: String,
}

/// Default kernel-side filter. Maps without room for entries are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EbpfFilter {
    pub format: EbpfMapFormat,
    pub external: bool,
    pub maps: Vec<EbpfMap>,
}

impl EbpfFilter {
    pub fn map(&self, kind: EbpfMapKind) -> Option<&EbpfMap> {
        self.maps.iter().find(|map| map.kind == kind)
    }
}

/// Descriptor of an AF_XDP socket map shared by a set of listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XskMap {
    pub name: String,
    pub interface: String,
    pub queues: u16,
    pub frames: u32,
    pub map_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_cache_defaults_skip_cookie() {
        let settings = PacketCacheSettings::default();
        assert!(settings.options_to_skip.contains(&EDNS_OPTION_COOKIE));
        assert!(settings.maximum_entry_size >= DNS_HEADER_SIZE);
    }

    #[test]
    fn test_builtin_policy_names() {
        let names: Vec<&str> = BuiltinPolicy::ALL.iter().map(|p| p.as_str()).collect();
        assert!(names.contains(&"leastOutstanding"));
        assert!(names.contains(&"chashed"));
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn test_dnstap_transport_parsing() {
        assert_eq!("UNIX".parse::<DnstapTransport>().unwrap(), DnstapTransport::Unix);
        assert!("udp".parse::<DnstapTransport>().is_err());
    }
}
