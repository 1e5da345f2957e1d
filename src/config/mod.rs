//! Configuration management for seqferry.
//!
//! TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! seqferry uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SEQFERRY_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Validation on load (patterns must compile)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use seqferry::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("seqferry.toml")?;
//!
//! println!("Publishing under: {}", config.store.dest_collection);
//! println!("Staging timeout: {}s", config.staging.timeout_secs);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry run
//! - [`ClassificationConfig`] - file name patterns
//! - [`SidecarConfig`] - metadata XML / primers report discovery
//! - [`StagingConfig`] - scratch area, bandwidth cap, timeout
//! - [`StoreConfig`] - object store root and collections
//! - [`RegistryConfig`] - run registry source
//! - [`LoggingConfig`] - local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [store]
//! root = "/srv/seqferry/store"
//! dest_collection = "/seq/pacbio"
//!
//! [registry]
//! path = "${SEQFERRY_REGISTRY_FILE}"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, ClassificationConfig, LoggingConfig, RegistryBackend, RegistryConfig,
    SeqferryConfig, SidecarConfig, StagingConfig, StoreBackend, StoreConfig,
};
