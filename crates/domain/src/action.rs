use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;

use crate::dns_name::DnsName;
use crate::dns_record::{QType, RCode};
use crate::objects::RemoteLogger;
use crate::script::ScriptFunction;
use crate::selector::KvsBinding;

/// Symbolic action names, as used by dynamic rules and by scripted
/// callbacks returning a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DnsActionKind {
    Drop,
    Nxdomain,
    Refused,
    Spoof,
    Allow,
    HeaderModify,
    Pool,
    Delay,
    Truncate,
    ServFail,
    #[default]
    None,
    NoOp,
    NoRecurse,
    SpoofRaw,
    SpoofPacket,
    SetTag,
}

impl DnsActionKind {
    const NAMES: [(&'static str, DnsActionKind); 16] = [
        ("Drop", DnsActionKind::Drop),
        ("Nxdomain", DnsActionKind::Nxdomain),
        ("Refused", DnsActionKind::Refused),
        ("Spoof", DnsActionKind::Spoof),
        ("Allow", DnsActionKind::Allow),
        ("HeaderModify", DnsActionKind::HeaderModify),
        ("Pool", DnsActionKind::Pool),
        ("Delay", DnsActionKind::Delay),
        ("Truncate", DnsActionKind::Truncate),
        ("ServFail", DnsActionKind::ServFail),
        ("None", DnsActionKind::None),
        ("NoOp", DnsActionKind::NoOp),
        ("NoRecurse", DnsActionKind::NoRecurse),
        ("SpoofRaw", DnsActionKind::SpoofRaw),
        ("SpoofPacket", DnsActionKind::SpoofPacket),
        ("SetTag", DnsActionKind::SetTag),
    ];

    pub fn as_str(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(name, _)| *name)
            .unwrap_or("None")
    }
}

impl FromStr for DnsActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s.trim()))
            .map(|(_, kind)| *kind)
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

impl fmt::Display for DnsActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header bits and TTL of synthesized answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseConfig {
    pub set_aa: Option<bool>,
    pub set_ad: Option<bool>,
    pub set_ra: Option<bool>,
    pub ttl: u32,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            set_aa: None,
            set_ad: None,
            set_ra: None,
            ttl: 60,
        }
    }
}

/// Reference to a remote logger; unbound only in tolerant load modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerBinding {
    pub name: String,
    pub logger: Option<Arc<RemoteLogger>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteLogSettings {
    pub logger: LoggerBinding,
    pub alter_function: Option<ScriptFunction>,
    pub server_id: String,
    pub ip_encrypt_key: String,
    pub export_tags: Vec<String>,
    pub metas: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DnstapLogSettings {
    pub identity: String,
    pub logger: LoggerBinding,
    pub alter_function: Option<ScriptFunction>,
}

/// Effect applied to a query when its rule's selector matches.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Allow,
    Drop,
    NoOp,
    Truncate,
    NoRecurse,
    SetDisableValidation,
    Rcode(RCode),
    Pool {
        pool_name: String,
        stop_processing: bool,
    },
    Delay {
        msec: u32,
    },
    SetTag {
        tag: String,
        value: String,
    },
    Spoof {
        ips: Vec<IpAddr>,
        response: ResponseConfig,
    },
    SpoofCname {
        cname: DnsName,
        response: ResponseConfig,
    },
    SpoofRaw {
        answers: Vec<Vec<u8>>,
        qtype_for_any: Option<QType>,
        response: ResponseConfig,
    },
    SpoofPacket {
        packet: Vec<u8>,
    },
    SetProxyProtocolValues(Vec<(u8, String)>),
    KvsLookup {
        binding: KvsBinding,
        destination_tag: String,
    },
    KvsRangeLookup {
        binding: KvsBinding,
        destination_tag: String,
    },
    RemoteLog(RemoteLogSettings),
    DnstapLog(DnstapLogSettings),
    Script(ScriptFunction),
    /// Runs the wrapped action, then keeps evaluating the chain.
    Continue(Arc<Action>),
}

impl Action {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Drop => "drop",
            Self::NoOp => "no-op",
            Self::Truncate => "truncate",
            Self::NoRecurse => "no-recurse",
            Self::SetDisableValidation => "set-disable-validation",
            Self::Rcode(_) => "rcode",
            Self::Pool { .. } => "pool",
            Self::Delay { .. } => "delay",
            Self::SetTag { .. } => "set-tag",
            Self::Spoof { .. } => "spoof",
            Self::SpoofCname { .. } => "spoof-cname",
            Self::SpoofRaw { .. } => "spoof-raw",
            Self::SpoofPacket { .. } => "spoof-packet",
            Self::SetProxyProtocolValues(_) => "set-proxy-protocol-values",
            Self::KvsLookup { .. } => "kvs-lookup",
            Self::KvsRangeLookup { .. } => "kvs-range-lookup",
            Self::RemoteLog(_) => "remote-log",
            Self::DnstapLog(_) => "dnstap-log",
            Self::Script(_) => "lua",
            Self::Continue(_) => "continue",
        }
    }
}

/// Effect applied to a response on its way back to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseAction {
    Allow,
    Drop,
    NoOp,
    ServFail,
    Delay {
        msec: u32,
    },
    SetTag {
        tag: String,
        value: String,
    },
    ClearRecordTypes(BTreeSet<QType>),
    LimitTtl {
        min: u32,
        max: u32,
        types: BTreeSet<QType>,
    },
    SetMinTtl(u32),
    SetMaxTtl(u32),
    RemoteLog {
        settings: RemoteLogSettings,
        include_cname: bool,
        export_extended_errors_to_meta: String,
    },
    DnstapLog(DnstapLogSettings),
    Script(ScriptFunction),
}

impl ResponseAction {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Drop => "drop",
            Self::NoOp => "no-op",
            Self::ServFail => "servfail",
            Self::Delay { .. } => "delay",
            Self::SetTag { .. } => "set-tag",
            Self::ClearRecordTypes(_) => "clear-record-types",
            Self::LimitTtl { .. } => "limit-ttl",
            Self::SetMinTtl(_) => "set-min-ttl",
            Self::SetMaxTtl(_) => "set-max-ttl",
            Self::RemoteLog { .. } => "remote-log",
            Self::DnstapLog(_) => "dnstap-log",
            Self::Script(_) => "lua",
        }
    }
}
