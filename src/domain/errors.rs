//! Domain error types
//!
//! This module defines the error hierarchy for seqferry. Errors are split by
//! how far they are allowed to travel: configuration, sidecar and marker
//! failures end a run, staging failures end a batch, and store failures end
//! only the publish of a single file.

use thiserror::Error;

/// Main seqferry error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum SeqferryError {
    /// Configuration errors, including a missing required barcode and an
    /// ambiguous registry match. Always fatal to the run.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Sidecar descriptor (metadata XML or primers report) could not be parsed
    #[error("Sidecar error: {0}")]
    Sidecar(String),

    /// Staging (copy/rename/compress) batch failure
    #[error("Staging error: {0}")]
    Staging(String),

    /// Object store errors
    #[error("Object store error: {0}")]
    Store(#[from] StoreError),

    /// Run registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Archive construction errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl SeqferryError {
    /// Whether this error must end the whole run rather than a single file
    /// or batch.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SeqferryError::Configuration(_) | SeqferryError::Sidecar(_) | SeqferryError::Io(_)
        )
    }
}

/// Object store errors
///
/// Errors raised by [`crate::adapters::store::ObjectStore`] implementations.
/// These never expose backend-specific types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to reach the store
    #[error("Failed to connect to object store: {0}")]
    ConnectionFailed(String),

    /// Permission denied for the operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Collection could not be created or removed
    #[error("Collection operation failed: {0}")]
    CollectionFailed(String),

    /// Object upload failed
    #[error("Failed to put object: {0}")]
    PutFailed(String),

    /// Metadata could not be attached or read
    #[error("Metadata operation failed: {0}")]
    MetadataFailed(String),

    /// Object does not exist
    #[error("Object not found: {0}")]
    ObjectNotFound(String),
}

/// Run registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Registry backend unreachable or unreadable
    #[error("Registry unavailable: {0}")]
    Unavailable(String),

    /// Registry returned data that could not be interpreted
    #[error("Invalid registry data: {0}")]
    InvalidData(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for SeqferryError {
    fn from(err: std::io::Error) -> Self {
        SeqferryError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SeqferryError {
    fn from(err: serde_json::Error) -> Self {
        SeqferryError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SeqferryError {
    fn from(err: toml::de::Error) -> Self {
        SeqferryError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from regex compile errors
impl From<regex::Error> for SeqferryError {
    fn from(err: regex::Error) -> Self {
        SeqferryError::Configuration(format!("Invalid pattern: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seqferry_error_display() {
        let err = SeqferryError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_store_error_conversion() {
        let store_err = StoreError::PutFailed("disk full".to_string());
        let err: SeqferryError = store_err.into();
        assert!(matches!(err, SeqferryError::Store(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_registry_error_conversion() {
        let registry_err = RegistryError::Unavailable("timeout".to_string());
        let err: SeqferryError = registry_err.into();
        assert!(matches!(err, SeqferryError::Registry(_)));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(SeqferryError::Configuration("x".to_string()).is_fatal());
        assert!(SeqferryError::Io("x".to_string()).is_fatal());
        assert!(SeqferryError::Sidecar("x".to_string()).is_fatal());
        assert!(!SeqferryError::Staging("x".to_string()).is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: SeqferryError = io_err.into();
        assert!(matches!(err, SeqferryError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: SeqferryError = json_err.into();
        assert!(matches!(err, SeqferryError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: SeqferryError = toml_err.into();
        assert!(matches!(err, SeqferryError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_regex_error_conversion() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: SeqferryError = regex_err.into();
        assert!(matches!(err, SeqferryError::Configuration(_)));
    }

    #[test]
    fn test_store_error_implements_std_error() {
        let err = StoreError::PermissionDenied("/seq/run".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
