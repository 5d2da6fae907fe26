//! Command-line interface for sliding_server.

use clap::{Parser, Subcommand};

/// Sliding Games - three-mark tic-tac-toe rooms over WebSocket
#[derive(Parser, Debug)]
#[command(name = "sliding_server")]
#[command(about = "Room server and terminal client for three-mark tic-tac-toe", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the room server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Port to bind to (falls back to $PORT, then the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Endpoint path for sockets and the liveness probe
        #[arg(long)]
        path: Option<String>,

        /// Validate moves server-side before relaying them
        #[arg(long)]
        authoritative: bool,
    },

    /// Join a room and play from the terminal
    Play {
        /// Room to join
        room: String,

        /// Server socket URL
        #[arg(long, default_value = "ws://127.0.0.1:3000/api/socket")]
        server_url: String,
    },
}
