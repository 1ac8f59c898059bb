//! CLI argument definitions using clap
//!
//! Commands:
//! - stockroom serve [--config <path>] [--port <port>]
//! - stockroom init [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stockroom - inventory service with token-based access control
#[derive(Parser, Debug)]
#[command(name = "stockroom")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port override, taking precedence over config and PORT
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create the data files from their seeds and report record counts
    Init {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
