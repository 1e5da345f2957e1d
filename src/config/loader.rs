//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SeqferryConfig;
use crate::domain::errors::SeqferryError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SeqferryConfig
/// 4. Applies environment variable overrides (SEQFERRY_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a `Configuration` error if the file cannot be read or parsed,
/// a referenced environment variable is unset, or validation fails
///
/// # Examples
///
/// ```no_run
/// use seqferry::config::loader::load_config;
///
/// let config = load_config("seqferry.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SeqferryConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SeqferryError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SeqferryError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
///
/// # Errors
///
/// Same as [`load_config`], minus the file access
pub fn parse_config(contents: &str) -> Result<SeqferryConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: SeqferryConfig = toml::from_str(&contents)
        .map_err(|e| SeqferryError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        SeqferryError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are passed through untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SeqferryError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using SEQFERRY_* prefix
///
/// Environment variables follow the pattern: SEQFERRY_<SECTION>_<KEY>,
/// e.g. SEQFERRY_STORE_ROOT or SEQFERRY_STAGING_TIMEOUT_SECS. Unparsable
/// numeric values are ignored.
fn apply_env_overrides(config: &mut SeqferryConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("SEQFERRY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("SEQFERRY_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Classification overrides
    if let Ok(val) = std::env::var("SEQFERRY_CLASSIFICATION_EXCLUDE_PATTERN") {
        config.classification.exclude_pattern = val;
    }
    if let Ok(val) = std::env::var("SEQFERRY_CLASSIFICATION_RUN_ID_PATTERN") {
        config.classification.run_id_pattern = val;
    }

    // Staging overrides
    if let Ok(val) = std::env::var("SEQFERRY_STAGING_SCRATCH_DIR") {
        config.staging.scratch_dir = val;
    }
    if let Ok(val) = std::env::var("SEQFERRY_STAGING_BANDWIDTH_LIMIT_KBPS") {
        if let Ok(limit) = val.parse() {
            config.staging.bandwidth_limit_kbps = limit;
        }
    }
    if let Ok(val) = std::env::var("SEQFERRY_STAGING_TIMEOUT_SECS") {
        if let Ok(timeout) = val.parse() {
            config.staging.timeout_secs = timeout;
        }
    }

    // Store overrides
    if let Ok(val) = std::env::var("SEQFERRY_STORE_ROOT") {
        config.store.root = val;
    }
    if let Ok(val) = std::env::var("SEQFERRY_STORE_DEST_COLLECTION") {
        config.store.dest_collection = val;
    }
    if let Ok(val) = std::env::var("SEQFERRY_STORE_LOG_COLLECTION") {
        config.store.log_collection = val;
    }

    // Registry overrides
    if let Ok(val) = std::env::var("SEQFERRY_REGISTRY_PATH") {
        config.registry.path = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("SEQFERRY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("SEQFERRY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
