//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the seqferry configuration file.

use crate::cli::exit_code;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config also validates every section
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Store Backend: {:?}", config.store.backend);
        println!("  Store Root: {}", config.store.root);
        println!("  Destination Collection: {}", config.store.dest_collection);
        println!("  Log Collection: {}", config.store.log_collection);
        println!("  Registry Backend: {:?}", config.registry.backend);
        println!("  Registry Path: {}", config.registry.path);
        println!("  Scratch Root: {}", config.staging.scratch_root().display());
        println!("  Bandwidth Limit: {} KiB/s", config.staging.bandwidth_limit_kbps);
        println!("  Staging Timeout: {}s", config.staging.timeout_secs);
        println!("  Sequence Pattern: {}", config.classification.sequence_pattern);
        println!("  Exclude Pattern: {}", config.classification.exclude_pattern);
        println!();
        Ok(exit_code::SUCCESS)
    }
}
