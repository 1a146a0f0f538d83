mod cli;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

use relay::config::RelayConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Some(path) = &cli.env_file {
        if let Err(err) = load_env_file(path) {
            tracing::error!("config-missing: failed to load --env-file {path}: {err}");
            std::process::exit(1);
        }
    }

    let mut config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("config-missing: {err}");
            std::process::exit(1);
        }
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if let Err(err) = relay::start_relay(config).await {
        tracing::error!("relay exited: {err}");
        std::process::exit(1);
    }
}

/// Minimal `KEY=VALUE` loader: blank lines and `#`-prefixed lines are
/// skipped, existing environment variables are never overwritten.
fn load_env_file(path: &str) -> std::io::Result<()> {
    let contents = std::fs::read_to_string(path)?;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if std::env::var(key).is_err() {
            std::env::set_var(key, value);
        }
    }
    Ok(())
}
