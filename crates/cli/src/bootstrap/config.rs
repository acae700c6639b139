use ferrous_proxy_domain::{Config, ConfigError};
use tracing::debug;

/// The configuration file located on disk, parsed once for bootstrap.
pub struct LoadedConfig {
    pub path: String,
    pub config: Config,
}

pub fn read_config(explicit: Option<&str>) -> Result<LoadedConfig, ConfigError> {
    let path = Config::locate(explicit)?;
    let contents = std::fs::read_to_string(&path)
        .map_err(|e| ConfigError::FileRead(path.clone(), e.to_string()))?;
    let config = Config::from_toml(&contents)?;
    debug!(path = %path, rules = config.rule_count(), "Configuration file parsed");
    Ok(LoadedConfig { path, config })
}
