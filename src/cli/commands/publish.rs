//! Publish command implementation
//!
//! This module implements the `publish` command, which loads one secondary
//! analysis into the object store.

use crate::adapters::{create_object_store, create_run_registry};
use crate::cli::{exit_code, exit_code_for};
use crate::config::load_config;
use crate::core::publish::{AnalysisPublisher, PublishOutcome, PublishRequest, PublishSummary};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the publish command
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Directory holding the analysis output files
    #[arg(long)]
    pub analysis_dir: PathBuf,

    /// Run folder that receives the completion marker
    #[arg(long)]
    pub runfolder: PathBuf,

    /// Secondary analysis identifier
    #[arg(long)]
    pub analysis_id: String,

    /// Metadata XML (default: discovered in the analysis directory)
    #[arg(long)]
    pub metadata_xml: Option<PathBuf>,

    /// Primers report JSON (default: discovered in the analysis directory)
    #[arg(long)]
    pub primers_report: Option<PathBuf>,

    /// Override the destination collection
    #[arg(long)]
    pub dest: Option<String>,

    /// Dry run mode - classify, stage and resolve without writing to the store
    #[arg(long)]
    pub dry_run: bool,
}

impl PublishArgs {
    /// Execute the publish command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(analysis_id = %self.analysis_id, "Starting publish command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        if let Some(dest) = &self.dest {
            tracing::info!(dest = %dest, "Overriding destination collection from CLI");
            config.store.dest_collection = dest.clone();
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(exit_code::CONFIGURATION);
        }

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - Nothing will be written to the object store");
            println!();
        }

        let store = match create_object_store(&config.store).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open object store");
                eprintln!("Failed to open object store: {e}");
                return Ok(exit_code_for(&e));
            }
        };
        let registry = match create_run_registry(&config.registry).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open run registry");
                eprintln!("Failed to open run registry: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let publisher = AnalysisPublisher::new(&config, store, registry)?;
        let request = PublishRequest {
            analysis_dir: self.analysis_dir.clone(),
            runfolder: self.runfolder.clone(),
            analysis_id: self.analysis_id.clone(),
            metadata_xml: self.metadata_xml.clone(),
            primers_report: self.primers_report.clone(),
        };

        println!("🚀 Publishing analysis {}...", self.analysis_id);
        println!();

        let summary = match publisher.publish(&request).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Publish failed");
                eprintln!("Publish failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        print_summary(&summary);
        Ok(exit_code_for_summary(&summary))
    }
}

fn print_summary(summary: &PublishSummary) {
    println!("📊 Publish Summary:");
    println!("  Analysis: {}", summary.analysis_id);
    if !summary.destination.is_empty() {
        println!("  Destination: {}", summary.destination);
    }
    println!("  Files Seen: {}", summary.result.files_seen);
    println!("  Files Published: {}", summary.result.files_processed);
    println!("  Errors: {}", summary.result.errors);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", summary.result.success_rate());
    println!();

    match summary.outcome {
        PublishOutcome::AlreadyLoaded => println!("✅ Analysis was already loaded; nothing to do"),
        PublishOutcome::Complete => println!("✅ Publish completed successfully!"),
        PublishOutcome::Unmarked => {
            println!("✅ Publish completed; too few files for a completion marker")
        }
        PublishOutcome::DryRun => println!("✅ Dry run completed"),
        PublishOutcome::Partial => {
            println!("⚠️  Publish incomplete; no marker written, rerun to retry")
        }
    }
}

fn exit_code_for_summary(summary: &PublishSummary) -> i32 {
    if summary.is_successful() {
        exit_code::SUCCESS
    } else {
        exit_code::PARTIAL
    }
}
