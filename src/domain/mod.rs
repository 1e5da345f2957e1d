//! Domain models and types for seqferry.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`WellLabel`], [`AnalysisId`], [`ProductId`])
//! - **Domain models** ([`AnalysisContext`], [`SourceFile`], [`MetadataRecord`])
//! - **Error types** ([`SeqferryError`], [`StoreError`], [`RegistryError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SeqferryError>`]:
//!
//! ```rust
//! use seqferry::domain::{SeqferryError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = seqferry::config::load_config("seqferry.toml")?;
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod context;
pub mod errors;
pub mod ids;
pub mod metadata;
pub mod result;
pub mod source_file;

// Re-export commonly used types for convenience
pub use analysis::{AnalysisContext, AnalysisContextBuilder};
pub use errors::{RegistryError, SeqferryError, StoreError};
pub use ids::{AnalysisId, ProductId, WellLabel};
pub use metadata::{DataLevel, MetadataAttribute, MetadataRecord};
pub use result::Result;
pub use source_file::{FileKind, SourceFile};
