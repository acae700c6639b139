use serde::{Deserialize, Serialize};

use super::script::ScriptSourceConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActionConfig {
    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub kind: ActionKindConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResponseActionConfig {
    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub kind: ResponseActionKindConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SpoofVarsConfig {
    #[serde(default)]
    pub set_aa: Option<bool>,

    #[serde(default)]
    pub set_ad: Option<bool>,

    #[serde(default)]
    pub set_ra: Option<bool>,

    #[serde(default)]
    pub ttl: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyProtocolValueConfig {
    pub key: u8,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtobufMetaConfig {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteLogActionConfig {
    pub logger_name: String,

    #[serde(default)]
    pub alter_function_name: String,

    #[serde(default)]
    pub alter_function_code: String,

    #[serde(default)]
    pub alter_function_file: String,

    #[serde(default)]
    pub server_id: String,

    #[serde(default)]
    pub ip_encrypt_key: String,

    #[serde(default)]
    pub export_tags: Vec<String>,

    #[serde(default)]
    pub metas: Vec<ProtobufMetaConfig>,

    /// Response actions only
    #[serde(default = "default_true")]
    pub include_cname: bool,

    /// Response actions only
    #[serde(default)]
    pub export_extended_errors_to_meta: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnstapLogActionConfig {
    pub identity: String,

    pub logger_name: String,

    #[serde(default)]
    pub alter_function_name: String,

    #[serde(default)]
    pub alter_function_code: String,

    #[serde(default)]
    pub alter_function_file: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActionKindConfig {
    Allow,
    Drop,
    NoOp,
    Truncate,
    NoRecurse,
    SetDisableValidation,

    Rcode {
        rcode: String,
    },

    Pool {
        pool_name: String,

        #[serde(default = "default_true")]
        stop_processing: bool,
    },

    Delay {
        msec: u32,
    },

    SetTag {
        tag: String,

        #[serde(default)]
        value: String,
    },

    Spoof {
        ips: Vec<String>,

        #[serde(default)]
        vars: SpoofVarsConfig,
    },

    SpoofCname {
        cname: String,

        #[serde(default)]
        vars: SpoofVarsConfig,
    },

    SpoofRaw {
        answers: Vec<String>,

        #[serde(default)]
        qtype_for_any: String,

        #[serde(default)]
        vars: SpoofVarsConfig,
    },

    SpoofPacket {
        response: String,

        /// Number of bytes of `response` to use, all of them when absent
        #[serde(default)]
        len: Option<usize>,
    },

    SetProxyProtocolValues {
        values: Vec<ProxyProtocolValueConfig>,
    },

    KvsLookup {
        kvs_name: String,
        lookup_key_name: String,
        destination_tag: String,
    },

    KvsRangeLookup {
        kvs_name: String,
        lookup_key_name: String,
        destination_tag: String,
    },

    RemoteLog(RemoteLogActionConfig),

    DnstapLog(DnstapLogActionConfig),

    Lua(ScriptSourceConfig),

    LuaFfi(ScriptSourceConfig),

    Continue {
        action: Box<ActionConfig>,
    },

    ByName {
        action_name: String,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ResponseActionKindConfig {
    Allow,
    Drop,
    NoOp,
    #[serde(rename = "servfail")]
    ServFail,

    Delay {
        msec: u32,
    },

    SetTag {
        tag: String,

        #[serde(default)]
        value: String,
    },

    ClearRecordTypes {
        types: Vec<String>,
    },

    LimitTtl {
        #[serde(default)]
        min: u32,

        #[serde(default = "default_max_ttl")]
        max: u32,

        #[serde(default)]
        types: Vec<String>,
    },

    SetMinTtl {
        min: u32,
    },

    SetMaxTtl {
        max: u32,
    },

    RemoteLog(RemoteLogActionConfig),

    DnstapLog(DnstapLogActionConfig),

    Lua(ScriptSourceConfig),

    LuaFfi(ScriptSourceConfig),

    ByName {
        action_name: String,
    },
}

fn default_true() -> bool {
    true
}

fn default_max_ttl() -> u32 {
    u32::MAX
}
