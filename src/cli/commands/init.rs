//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::exit_code;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "seqferry.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing seqferry configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit_code::CONFIGURATION);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Point [store] root at the object store directory");
                println!("  3. Point [registry] path at the run registry JSON file");
                println!("  4. Validate configuration: seqferry validate-config");
                println!("  5. Publish an analysis: seqferry publish --help");
                println!();
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(exit_code::FATAL)
            }
        }
    }

    /// Commented sample configuration
    fn sample_config() -> &'static str {
        r#"# seqferry configuration
#
# Values may reference environment variables as ${VAR_NAME}. Any key can
# also be overridden with SEQFERRY_<SECTION>_<KEY>, for example
# SEQFERRY_STORE_ROOT=/mnt/store.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run mode (classify, stage and resolve, but write nothing)
dry_run = false

# ============================================================================
# File Classification
# ============================================================================
[classification]
# Base names treated as sequence data
# sequence_pattern = '(?:^|\.)(?:subreads|hifi_reads|fail_reads|reads|ccs|mapped)(?:\.[\w-]+)*\.bam$|^scisoseq\..+\.bam$|\.fasta(?:\.gz)?$'

# Base names never published
exclude_pattern = "segmented"

# Files collected by archive-logs (everything, minus the exclusions below)
log_include_pattern = "."
log_exclude_pattern = '\.(?:bam|pbi|bai|h5)$'

# Run id inferred from run folder names; group 1 is the id
run_id_pattern = '^\d{6}_[A-Za-z0-9]+_0*(\d+)_'

# ============================================================================
# Sidecar Discovery
# ============================================================================
[sidecar]
metadata_pattern = '\.(?:consensusreadset|subreadset)\.xml$'
primers_report_pattern = 'primers.*\.json$'

# ============================================================================
# Staging
# ============================================================================
[staging]
# Scratch parent directory (empty = system temp directory)
scratch_dir = ""

# Copy bandwidth cap in KiB/s (0 = unlimited)
bandwidth_limit_kbps = 102400

# Upper bound for staging one batch
timeout_secs = 3600

# ============================================================================
# Object Store
# ============================================================================
[store]
backend = "local"
root = "/data/seqferry/store"

# Analyses land in <dest_collection>/<run name>/<analysis id>
dest_collection = "/seq/pacbio"

# archive-logs default destination
log_collection = "/seq/logs"

# ============================================================================
# Run Registry
# ============================================================================
[registry]
backend = "file"
path = "/data/seqferry/registry.json"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "/var/log/seqferry"

# Log rotation (daily, hourly or never)
local_rotation = "daily"

# Rotated files to keep
local_max_files = 14
"#
    }
}
