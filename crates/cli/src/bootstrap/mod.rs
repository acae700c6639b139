mod config;
mod logging;

pub use config::{read_config, LoadedConfig};
pub use logging::init_logging;
