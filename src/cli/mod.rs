//! CLI module for Stockroom
//!
//! Provides command-line interface for:
//! - serve: Open the data files and run the HTTP API
//! - init: Seed the data files and exit

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
