//! Archive-logs command implementation

use crate::adapters::create_object_store;
use crate::cli::{exit_code, exit_code_for};
use crate::config::load_config;
use crate::core::archive::LogArchiver;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the archive-logs command
#[derive(Args, Debug)]
pub struct ArchiveArgs {
    /// Run folder whose log tree is archived
    #[arg(long)]
    pub source_dir: PathBuf,

    /// Run id (default: inferred from the run folder name)
    #[arg(long)]
    pub run_id: Option<u64>,

    /// Destination collection (default: store.log_collection)
    #[arg(long)]
    pub dest: Option<String>,
}

impl ArchiveArgs {
    /// Execute the archive-logs command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(source_dir = %self.source_dir.display(), "Starting archive-logs command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };
        let destination = self
            .dest
            .clone()
            .unwrap_or_else(|| config.store.log_collection.clone());

        let store = match create_object_store(&config.store).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open object store");
                eprintln!("Failed to open object store: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let archiver = LogArchiver::new(&config, store)?;
        match archiver
            .archive_and_publish(&self.source_dir, self.run_id, &destination)
            .await
        {
            Ok(id) => {
                println!("✅ Published log archive: {id}");
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, "Log archiving failed");
                eprintln!("Log archiving failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}
