use anyhow::Context;
use clap::Parser;
use ferrous_proxy_application::ports::GenerationStore;
use ferrous_proxy_application::LoadMode;
use std::sync::Arc;
use tracing::{error, info, warn};

mod bootstrap;
mod di;

#[derive(Parser)]
#[command(name = "ferrous-proxy")]
#[command(version)]
#[command(about = "Ferrous Proxy - DNS load balancer configuration loader")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Validate the configuration and exit
    #[arg(long, conflicts_with = "client")]
    check_config: bool,

    /// Only load the console settings, to talk to a running instance
    #[arg(long)]
    client: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn mode(&self) -> LoadMode {
        if self.check_config {
            LoadMode::ValidateOnly
        } else if self.client {
            LoadMode::Client
        } else {
            LoadMode::Normal
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let loaded = bootstrap::read_config(cli.config.as_deref())?;
    bootstrap::init_logging(cli.log_level.as_deref(), &loaded.config.logging);

    let mode = cli.mode();
    info!(
        path = %loaded.path,
        mode = ?mode,
        "Starting Ferrous Proxy v{}",
        env!("CARGO_PKG_VERSION")
    );

    let use_cases = di::UseCases::new(&loaded.path);
    let generation = use_cases
        .load_config
        .execute_config(&loaded.config, mode)
        .with_context(|| format!("Unable to load configuration from {}", loaded.path))?;

    match mode {
        LoadMode::ValidateOnly => {
            println!("Configuration '{}' OK!", loaded.path);
            return Ok(());
        }
        LoadMode::Client => {
            match generation
                .settings
                .console
                .as_ref()
                .and_then(|console| console.listen_address)
            {
                Some(address) => info!(address = %address, "Console endpoint"),
                None => warn!("No console listen address configured"),
            }
            return Ok(());
        }
        LoadMode::Normal => {}
    }

    use_cases.store.publish(Arc::new(generation));
    wait_for_signals(&use_cases, &loaded.path).await?;

    info!("Shutdown complete");
    Ok(())
}

/// SIGHUP reloads the configuration file, Ctrl-C stops the process.
#[cfg(unix)]
async fn wait_for_signals(use_cases: &di::UseCases, path: &str) -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup()).context("Unable to install SIGHUP handler")?;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                return Ok(());
            }
            _ = hangup.recv() => {
                info!(path = %path, "SIGHUP received, reloading configuration");
                if let Err(e) = use_cases.reload_config.execute(path) {
                    error!(error = %e, "Configuration reload failed");
                }
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signals(_use_cases: &di::UseCases, _path: &str) -> anyhow::Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("Unable to listen for Ctrl-C")?;
    info!("Shutdown signal received");
    Ok(())
}
