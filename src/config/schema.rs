//! Configuration schema types
//!
//! This module defines the configuration structure for seqferry.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Object store backend selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Collections are directories below a local root
    #[default]
    Local,
}

/// Run registry backend selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistryBackend {
    /// Registry records read from a JSON file
    #[default]
    File,
}

/// Main seqferry configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeqferryConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// File name patterns used for classification
    #[serde(default)]
    pub classification: ClassificationConfig,

    /// Sidecar descriptor discovery
    #[serde(default)]
    pub sidecar: SidecarConfig,

    /// Staging (copy/rename/compress) settings
    #[serde(default)]
    pub staging: StagingConfig,

    /// Object store settings
    pub store: StoreConfig,

    /// Run registry settings
    pub registry: RegistryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SeqferryConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.classification.validate()?;
        self.sidecar.validate()?;
        self.staging.validate()?;
        self.store.validate()?;
        self.registry.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (stage and resolve, but never write to the store)
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// File name patterns (regular expressions over base names)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Sequence data: raw and mapped reads, single-cell outputs, FASTA
    #[serde(default = "default_sequence_pattern")]
    pub sequence_pattern: String,

    /// Names never published from an analysis directory
    #[serde(default = "default_exclude_pattern")]
    pub exclude_pattern: String,

    /// Names included in a log bundle
    #[serde(default = "default_log_include_pattern")]
    pub log_include_pattern: String,

    /// Names left out of a log bundle
    #[serde(default = "default_log_exclude_pattern")]
    pub log_exclude_pattern: String,

    /// Extracts a numeric run id from a run folder name (first capture group)
    #[serde(default = "default_run_id_pattern")]
    pub run_id_pattern: String,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            sequence_pattern: default_sequence_pattern(),
            exclude_pattern: default_exclude_pattern(),
            log_include_pattern: default_log_include_pattern(),
            log_exclude_pattern: default_log_exclude_pattern(),
            run_id_pattern: default_run_id_pattern(),
        }
    }
}

impl ClassificationConfig {
    fn validate(&self) -> Result<(), String> {
        validate_pattern("classification.sequence_pattern", &self.sequence_pattern)?;
        validate_pattern("classification.exclude_pattern", &self.exclude_pattern)?;
        validate_pattern(
            "classification.log_include_pattern",
            &self.log_include_pattern,
        )?;
        validate_pattern(
            "classification.log_exclude_pattern",
            &self.log_exclude_pattern,
        )?;
        let run_id = validate_pattern("classification.run_id_pattern", &self.run_id_pattern)?;
        if run_id.captures_len() < 2 {
            return Err("classification.run_id_pattern must contain a capture group".to_string());
        }
        Ok(())
    }
}

/// Sidecar descriptor discovery patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidecarConfig {
    /// Metadata XML in an analysis directory
    #[serde(default = "default_metadata_pattern")]
    pub metadata_pattern: String,

    /// Primers report JSON in an analysis directory
    #[serde(default = "default_primers_report_pattern")]
    pub primers_report_pattern: String,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            metadata_pattern: default_metadata_pattern(),
            primers_report_pattern: default_primers_report_pattern(),
        }
    }
}

impl SidecarConfig {
    fn validate(&self) -> Result<(), String> {
        validate_pattern("sidecar.metadata_pattern", &self.metadata_pattern)?;
        validate_pattern("sidecar.primers_report_pattern", &self.primers_report_pattern)?;
        Ok(())
    }
}

/// Staging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Parent directory for per-run scratch areas (empty = system temp dir)
    #[serde(default)]
    pub scratch_dir: String,

    /// Copy bandwidth cap in KiB/s (0 = unlimited)
    #[serde(default = "default_bandwidth_limit_kbps")]
    pub bandwidth_limit_kbps: u64,

    /// Upper bound for staging one batch
    #[serde(default = "default_staging_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            scratch_dir: String::new(),
            bandwidth_limit_kbps: default_bandwidth_limit_kbps(),
            timeout_secs: default_staging_timeout_secs(),
        }
    }
}

impl StagingConfig {
    /// Directory under which scratch areas are created
    pub fn scratch_root(&self) -> PathBuf {
        if self.scratch_dir.is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.scratch_dir)
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("staging.timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}

/// Object store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend
    #[serde(default)]
    pub backend: StoreBackend,

    /// Root directory of the local store
    pub root: String,

    /// Collection under which analyses are published
    pub dest_collection: String,

    /// Collection under which log bundles are published
    #[serde(default = "default_log_collection")]
    pub log_collection: String,
}

impl StoreConfig {
    fn validate(&self) -> Result<(), String> {
        if self.root.is_empty() {
            return Err("store.root cannot be empty".to_string());
        }
        if !self.dest_collection.starts_with('/') {
            return Err(format!(
                "store.dest_collection '{}' must be an absolute collection path",
                self.dest_collection
            ));
        }
        if !self.log_collection.starts_with('/') {
            return Err(format!(
                "store.log_collection '{}' must be an absolute collection path",
                self.log_collection
            ));
        }
        Ok(())
    }
}

/// Run registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry backend
    #[serde(default)]
    pub backend: RegistryBackend,

    /// Path of the registry records file
    pub path: String,
}

impl RegistryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.is_empty() {
            return Err("registry.path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,

    /// Number of rotated log files kept
    #[serde(default = "default_local_max_files")]
    pub local_max_files: usize,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_max_files == 0 {
            return Err("logging.local_max_files must be > 0".to_string());
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
            local_max_files: default_local_max_files(),
        }
    }
}

fn validate_pattern(name: &str, pattern: &str) -> Result<Regex, String> {
    if pattern.is_empty() {
        return Err(format!("{name} cannot be empty"));
    }
    Regex::new(pattern).map_err(|e| format!("{name} is not a valid regex: {e}"))
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_sequence_pattern() -> String {
    r"(?:^|\.)(?:subreads|hifi_reads|fail_reads|reads|ccs|mapped)(?:\.[\w-]+)*\.bam$|^scisoseq\..+\.bam$|\.fasta(?:\.gz)?$"
        .to_string()
}

fn default_exclude_pattern() -> String {
    "segmented".to_string()
}

fn default_log_include_pattern() -> String {
    ".".to_string()
}

fn default_log_exclude_pattern() -> String {
    r"\.(?:bam|pbi|bai|h5)$".to_string()
}

fn default_run_id_pattern() -> String {
    r"^\d{6}_[A-Za-z0-9]+_0*(\d+)_".to_string()
}

fn default_metadata_pattern() -> String {
    r"\.(?:consensusreadset|subreadset)\.xml$".to_string()
}

fn default_primers_report_pattern() -> String {
    r"primers.*\.json$".to_string()
}

fn default_bandwidth_limit_kbps() -> u64 {
    102_400
}

fn default_staging_timeout_secs() -> u64 {
    3600
}

fn default_log_collection() -> String {
    "/seq/logs".to_string()
}

fn default_local_path() -> String {
    "/var/log/seqferry".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

fn default_local_max_files() -> usize {
    14
}
