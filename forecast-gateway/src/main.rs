//! Binary crate for the `forecast-gateway` HTTP service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - The HTTP surface (routing, CORS, rate limiting)

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod rate_limit;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
