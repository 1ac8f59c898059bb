//! CLI command implementations

use std::path::Path;

use tracing::info;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use crate::config::ServiceConfig;
use crate::http_server::{HttpServer, Services};
use crate::logging::init_logging;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::Init { config } => init(config.as_deref()),
    }
}

/// Open the stores, seeding any missing data file, and report counts
pub fn init(config_path: Option<&Path>) -> CliResult<()> {
    let config = ServiceConfig::resolve(config_path)?;
    init_logging(config.log_format);

    let services = Services::open(&config)?;
    let products = services.products.len()?;
    let users = services.users.len()?;

    info!(products, users, data_dir = %config.storage.data_dir.display(), "data directory ready");
    println!(
        "Initialized {}: {} products, {} users",
        config.storage.data_dir.display(),
        products,
        users
    );
    Ok(())
}

/// Open the stores and serve the HTTP API until Ctrl-C
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let mut config = ServiceConfig::resolve(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }
    init_logging(config.log_format);

    let services = Services::open(&config)?;
    let server = HttpServer::new(config.http.clone(), &services);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}
