//! Strictly Lobby - server binary

mod cli;

use anyhow::Result;
use clap::Parser;
use strictly_lobby::ServerConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, port, host } => {
            let mut settings = match config {
                Some(path) => ServerConfig::from_file(path)?,
                None => ServerConfig::default(),
            };
            if let Some(port) = port {
                settings = settings.with_port(port);
            }
            if let Some(host) = host {
                settings = settings.with_host(host);
            }
            run_server(settings).await
        }
    }
}

/// Run the lobby server
async fn run_server(config: ServerConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    info!(addr = %config.bind_addr(), "Starting Strictly Lobby");
    strictly_lobby::serve(config).await
}
