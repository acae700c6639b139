use serde::{Deserialize, Serialize};

/// A scripted callback given by name, inline code or file. The first
/// non-empty field wins, in that order.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ScriptSourceConfig {
    #[serde(default)]
    pub function_name: String,

    #[serde(default)]
    pub function_code: String,

    #[serde(default)]
    pub function_file: String,
}
