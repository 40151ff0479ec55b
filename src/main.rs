// MongoDB Atlas Provider - Atlas control-plane resources
// Copyright (c) 2025 MongoDB Atlas Provider Contributors
// Licensed under the Mozilla Public License 2.0

use clap::Parser;
use mongodbatlas::cli::{Cli, Commands};
use mongodbatlas::config::LoggingConfig;
use mongodbatlas::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Optional; a missing .env is ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Console only; file logging is configured for embedded use
    let log_level = cli.log_level.as_deref().unwrap_or("info");
    let guard = match init_logging(log_level, &LoggingConfig::default()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "MongoDB Atlas provider tooling");

    let exit_code = tokio::select! {
        result = execute_command(&cli) => match result {
            Ok(code) => code,
            Err(e) => {
                tracing::error!(error = %e, "Command execution failed");
                eprintln!("Error: {e:#}");
                5
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted; Atlas may still be applying the last request");
            130
        }
    };

    drop(guard);
    process::exit(exit_code);
}

async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::StateId(args) => args.execute().await,
        Commands::Resource(args) => args.execute(&cli.config).await,
    }
}
