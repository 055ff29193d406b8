use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{Config, ForecastService};
use inquire::Password;
use tracing::info;

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast-gateway", version, about = "Forecast gateway for mobile clients")]
pub struct Cli {
    /// Path to the config file; defaults to the platform config directory.
    #[arg(long, global = true, env = "FORECAST_GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP gateway (default).
    Serve {
        /// Listening port; overrides the config file and PORT.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Store the WeatherAPI.com API key in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command.unwrap_or(Command::Serve { port: None }) {
            Command::Serve { port } => serve(&path, port).await,
            Command::Configure => configure(&path),
        }
    }
}

async fn serve(path: &Path, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = Config::load(path)?;
    config.apply_env()?;
    if let Some(port) = port {
        config.server.port = port;
    }

    let service = ForecastService::from_config(&config)?;

    info!(config = %path.display(), days = config.upstream.days, "Starting forecast gateway");
    server::serve(&config, service).await
}

fn configure(path: &Path) -> anyhow::Result<()> {
    let mut config = Config::load(path)?;

    let api_key = Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .with_help_message("Get one at https://www.weatherapi.com/my/")
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.upstream.api_key = Some(api_key.to_string());
    config.save(path)?;

    println!("Saved API key to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["forecast-gateway"]).expect("parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_accepts_port_and_config() {
        let cli = Cli::try_parse_from([
            "forecast-gateway",
            "serve",
            "--port",
            "9000",
            "--config",
            "/tmp/gateway.toml",
        ])
        .expect("parse");

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/gateway.toml")));
        assert!(matches!(cli.command, Some(Command::Serve { port: Some(9000) })));
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(Cli::try_parse_from(["forecast-gateway", "serve", "--port", "99999"]).is_err());
    }
}
