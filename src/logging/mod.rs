//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output
//! - JSON-formatted local file logs with rotation
//! - Configurable log levels
//!
//! # Example
//!
//! ```no_run
//! use seqferry::logging::init_logging;
//! use seqferry::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of an analysis publish
///
/// # Example
///
/// ```no_run
/// use seqferry::log_publish_start;
///
/// log_publish_start!("0000021", "/data/runs/r84047/0000021");
/// ```
#[macro_export]
macro_rules! log_publish_start {
    ($analysis_id:expr, $analysis_dir:expr) => {
        tracing::info!(
            analysis_id = %$analysis_id,
            analysis_dir = %$analysis_dir,
            "Starting publish"
        );
    };
}

/// Log the completion of an analysis publish
///
/// # Example
///
/// ```no_run
/// use seqferry::log_publish_complete;
/// use seqferry::core::publish::PublishResult;
/// use std::time::Duration;
///
/// let result = PublishResult::new(3, 3, 0);
/// log_publish_complete!("0000021", result, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_publish_complete {
    ($analysis_id:expr, $result:expr, $duration:expr) => {
        tracing::info!(
            analysis_id = %$analysis_id,
            files_seen = $result.files_seen,
            files_processed = $result.files_processed,
            errors = $result.errors,
            duration_ms = $duration.as_millis(),
            "Publish finished"
        );
    };
}

/// Log a file that was deliberately not published
///
/// # Example
///
/// ```no_run
/// use seqferry::log_file_skipped;
///
/// log_file_skipped!("m84047.hifi_reads.bam", "no registry record");
/// ```
#[macro_export]
macro_rules! log_file_skipped {
    ($file:expr, $reason:expr) => {
        tracing::warn!(
            file = %$file,
            reason = %$reason,
            "Skipping file"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use seqferry::log_error_with_context;
/// use seqferry::domain::SeqferryError;
///
/// let error = SeqferryError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}
