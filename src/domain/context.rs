//! Error context extension trait
//!
//! Provides `.context()` and `.with_context()` for `Result<T, E>` where `E`
//! converts into [`SeqferryError`]. Unlike `anyhow::Context` the error keeps
//! its variant, so a configuration failure stays fatal after context is
//! added.
//!
//! # Examples
//!
//! ```rust
//! use seqferry::domain::Result;
//! use seqferry::domain::context::ResultExt;
//!
//! fn read_descriptor(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .context(format!("Failed to read sidecar descriptor: {}", path))
//! }
//! ```

use crate::domain::errors::SeqferryError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error (evaluated eagerly)
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context to an error using a closure (evaluated only on error)
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<SeqferryError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| prefix(e.into(), &context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| prefix(e.into(), &f()))
    }
}

fn prefix(error: SeqferryError, context: &dyn std::fmt::Display) -> SeqferryError {
    match error {
        SeqferryError::Configuration(msg) => {
            SeqferryError::Configuration(format!("{context}: {msg}"))
        }
        SeqferryError::Sidecar(msg) => SeqferryError::Sidecar(format!("{context}: {msg}")),
        SeqferryError::Staging(msg) => SeqferryError::Staging(format!("{context}: {msg}")),
        SeqferryError::Archive(msg) => SeqferryError::Archive(format!("{context}: {msg}")),
        SeqferryError::Serialization(msg) => {
            SeqferryError::Serialization(format!("{context}: {msg}"))
        }
        SeqferryError::Io(msg) => SeqferryError::Io(format!("{context}: {msg}")),
        other => SeqferryError::Other(format!("{context}: {other}")),
    }
}
