//! Command-line interface for strictly_lobby.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Lobby - live multiplayer tic-tac-toe server
#[derive(Parser, Debug)]
#[command(name = "strictly_lobby")]
#[command(about = "Live multiplayer tic-tac-toe over WebSocket", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP/WebSocket lobby server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
    },
}
