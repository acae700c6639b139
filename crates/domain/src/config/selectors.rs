use serde::{Deserialize, Serialize};

use super::script::ScriptSourceConfig;

/// A selector declaration. Named selectors are registered and can be
/// reused with `type = "by-name"`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectorConfig {
    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub kind: SelectorKindConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SelectorKindConfig {
    All,

    #[serde(rename = "qname")]
    QName {
        qname: String,
    },

    QnameSet {
        qnames: Vec<String>,
    },

    QnameSuffix {
        suffixes: Vec<String>,

        #[serde(default)]
        quiet: bool,
    },

    Qtype {
        qtype: String,
    },

    Tag {
        tag: String,

        /// Any value matches when empty
        #[serde(default)]
        value: String,
    },

    NetmaskGroup {
        #[serde(default)]
        netmask_group_name: String,

        #[serde(default)]
        netmasks: Vec<String>,

        #[serde(default = "default_true")]
        source: bool,

        #[serde(default)]
        quiet: bool,
    },

    KvsLookup {
        kvs_name: String,
        lookup_key_name: String,
    },

    KvsRangeLookup {
        kvs_name: String,
        lookup_key_name: String,
    },

    Lua(ScriptSourceConfig),

    LuaFfi(ScriptSourceConfig),

    And {
        selectors: Vec<SelectorConfig>,
    },

    Or {
        selectors: Vec<SelectorConfig>,
    },

    Not {
        selector: Box<SelectorConfig>,
    },

    ByName {
        selector_name: String,
    },
}

fn default_true() -> bool {
    true
}
