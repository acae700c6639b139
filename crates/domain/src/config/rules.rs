use serde::{Deserialize, Serialize};

use super::actions::{ActionConfig, ResponseActionConfig};
use super::selectors::SelectorConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryRuleConfig {
    #[serde(default)]
    pub name: String,

    /// Explicit rule identity, generated when empty
    #[serde(default)]
    pub uuid: String,

    #[serde(default)]
    pub priority: u64,

    pub selector: SelectorConfig,

    pub action: ActionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResponseRuleConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub uuid: String,

    #[serde(default)]
    pub priority: u64,

    pub selector: SelectorConfig,

    pub action: ResponseActionConfig,
}
