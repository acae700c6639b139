use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub structured: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub verbose_log_destination: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            structured: false,
            verbose: false,
            verbose_log_destination: String::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
