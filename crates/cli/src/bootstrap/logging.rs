use ferrous_proxy_domain::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// `--log-level` wins over `RUST_LOG`, which wins over `logging.level`.
pub fn init_logging(cli_level: Option<&str>, config: &LoggingConfig) {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level)),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.verbose);
    if config.structured {
        builder.json().init();
    } else {
        builder.init();
    }
}
