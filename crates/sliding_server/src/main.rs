//! Sliding Games - room server and terminal client.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use sliding_server::{RelayMode, RoomRegistry, ServerConfig, SessionGateway};
use std::path::PathBuf;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            port,
            host,
            path,
            authoritative,
        } => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("info,sliding_server=debug")),
                )
                .init();
            let config = resolve_config(config, port, host, path, authoritative)?;
            run_server(config).await
        }
        Command::Play { room, server_url } => {
            // Board goes to stdout, logs to stderr.
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
                )
                .with_writer(std::io::stderr)
                .init();
            sliding_server::play(&server_url, &room).await
        }
    }
}

/// Layers CLI flags and `$PORT` over the config file (or defaults).
#[instrument]
fn resolve_config(
    path_to_config: Option<PathBuf>,
    port: Option<u16>,
    host: Option<String>,
    path: Option<String>,
    authoritative: bool,
) -> Result<ServerConfig> {
    let mut config = match path_to_config {
        Some(file) => ServerConfig::from_file(file)?,
        None => ServerConfig::default(),
    };

    let env_port = std::env::var("PORT").ok().and_then(|p| p.parse().ok());
    if let Some(port) = port.or(env_port) {
        config = config.with_port(port);
    }
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(path) = path {
        config = config.with_path(path);
    }
    if authoritative {
        config = config.with_mode(RelayMode::Authoritative);
    }
    config.validate()?;
    Ok(config)
}

/// Run the room server
#[instrument(skip(config))]
async fn run_server(config: ServerConfig) -> Result<()> {
    info!(mode = %config.mode(), "Starting Sliding Games server");

    let gateway = SessionGateway::new(RoomRegistry::new(), *config.mode());
    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(
        "Server ready at ws://{}:{}{}",
        config.host(),
        config.port(),
        config.path()
    );

    sliding_server::serve(listener, gateway, config.path()).await?;
    Ok(())
}
