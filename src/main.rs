// Seqferry - Sequencing output publisher
// Copyright (c) 2025 Seqferry Contributors
// Licensed under the MIT License

use seqferry::cli::{exit_code, Cli, Commands};
use seqferry::config::{load_config, LoggingConfig};
use seqferry::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging and the default level come from the config when it loads;
    // commands report config errors themselves.
    let file_config = match &cli.command {
        Commands::Init(_) => None,
        _ => load_config(&cli.config).ok(),
    };
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = file_config.map(|c| c.logging).unwrap_or_else(LoggingConfig::default);

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(exit_code::CONFIGURATION);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Seqferry - Sequencing output publisher"
    );

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            exit_code::FATAL
        }
    };

    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Publish(args) => args.execute(&cli.config).await,
        Commands::ArchiveLogs(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
