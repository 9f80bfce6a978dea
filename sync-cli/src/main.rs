//! # scratch-sync
//!
//! Sync private `scratch/` folders across machines on a Tailscale network
//! using Syncthing.
//!
//! ## Commands
//!
//! - `init`: Register a repository's `scratch/` folder with Syncthing
//! - `pair`: Discover peers on the overlay and pair with them
//! - `status`: Show devices, folders and pending requests
//! - `list`: List managed folders
//! - `serve`: Run the discovery listener in the foreground
//!
//! ## Example
//!
//! ```bash
//! # In a repository
//! scratch-sync init
//!
//! # Pair with every reachable peer without prompting
//! scratch-sync pair --yes
//!
//! # Or only with some of them
//! scratch-sync pair --only laptop 100.101.102.103
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod templates;

use commands::{init, list, pair, serve, status};
use config::Config;

/// Sync private scratch/ folders across machines using Syncthing.
#[derive(Parser, Debug)]
#[command(name = "scratch-sync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/scratch-sync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register this repository's scratch/ folder with Syncthing
    Init {
        /// Repository path (default: current directory)
        path: Option<PathBuf>,

        /// Custom name for the sync folder
        #[arg(long, short)]
        name: Option<String>,
    },

    /// Discover and pair with other devices on the overlay network
    Pair {
        /// Per-peer probe timeout in seconds
        #[arg(long, short)]
        timeout: Option<f64>,

        /// Pair without prompting
        #[arg(long, short)]
        yes: bool,

        /// Only pair peers matching these hostnames, IPs or device-id prefixes
        #[arg(long, num_args = 1..)]
        only: Vec<String>,
    },

    /// Show sync status
    Status,

    /// List managed folders
    List,

    /// Run the discovery listener
    Serve {
        /// Port to listen on
        #[arg(long, short)]
        port: Option<u16>,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn probe_timeout(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("invalid timeout {}: expected non-negative seconds", secs))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    tracing::debug!("{:?}", config);

    match cli.command {
        Commands::Init { path, name } => {
            init::run(&config, path.as_deref(), name.as_deref()).await?;
        }
        Commands::Pair { timeout, yes, only } => {
            let timeout = probe_timeout(timeout.unwrap_or(config.probe.timeout_secs))?;
            pair::run(&config, timeout, yes, only).await?;
        }
        Commands::Status => {
            status::run(&config).await?;
        }
        Commands::List => {
            list::run(&config).await?;
        }
        Commands::Serve { port } => {
            serve::run(&config, port).await?;
        }
    }

    Ok(())
}
