use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DynamicRulesSettingsConfig {
    /// Action applied by rules that do not name one
    #[serde(default = "default_action")]
    pub default_action: String,
}

impl Default for DynamicRulesSettingsConfig {
    fn default() -> Self {
        Self {
            default_action: default_action(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DynamicRulesConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default = "default_mask_ipv4")]
    pub mask_ipv4: u8,

    #[serde(default = "default_mask_ipv6")]
    pub mask_ipv6: u8,

    #[serde(default)]
    pub mask_port: u8,

    #[serde(default)]
    pub exclude_ranges: Vec<String>,

    #[serde(default)]
    pub include_ranges: Vec<String>,

    #[serde(default)]
    pub exclude_domains: Vec<String>,

    #[serde(default)]
    pub rules: Vec<DynamicRuleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DynamicRuleConfig {
    /// Kept as text: unknown kinds are skipped, not rejected
    pub rule_type: String,

    #[serde(default = "default_seconds")]
    pub seconds: u32,

    #[serde(default = "default_action_duration")]
    pub action_duration: u32,

    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub rate: u64,

    #[serde(default)]
    pub warning_rate: u64,

    #[serde(default)]
    pub ratio: f64,

    #[serde(default)]
    pub warning_ratio: f64,

    #[serde(default)]
    pub action: String,

    #[serde(default)]
    pub tag_name: String,

    #[serde(default = "default_tag_value")]
    pub tag_value: String,

    #[serde(default)]
    pub visitor_function_name: String,

    #[serde(default)]
    pub visitor_function_code: String,

    #[serde(default)]
    pub visitor_function_file: String,

    #[serde(default)]
    pub rcode: String,

    #[serde(default)]
    pub qtype: String,

    #[serde(default)]
    pub minimum_number_of_responses: u64,

    #[serde(default)]
    pub minimum_global_cache_hit_ratio: f64,
}

fn default_action() -> String {
    "Drop".to_string()
}

fn default_mask_ipv4() -> u8 {
    32
}

fn default_mask_ipv6() -> u8 {
    64
}

fn default_seconds() -> u32 {
    10
}

fn default_action_duration() -> u32 {
    60
}

fn default_tag_value() -> String {
    "0".to_string()
}
