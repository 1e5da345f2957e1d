//! External system integrations for seqferry.
//!
//! This module provides adapters for the systems a publish run talks to:
//!
//! - [`store`] - managed object store (trait-based, local filesystem backend)
//! - [`registry`] - run/sample tracking registry (trait-based, JSON file backend)
//! - [`factory`] - construction from configuration
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind `async_trait` traits so the
//! pipeline can be tested with in-memory implementations.
//!
//! ```rust,no_run
//! use seqferry::adapters::{create_object_store, create_run_registry};
//! use seqferry::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("seqferry.toml")?;
//! let store = create_object_store(&config.store).await?;
//! let registry = create_run_registry(&config.registry).await?;
//! println!("Using {} store", store.name());
//! # Ok(())
//! # }
//! ```

pub mod factory;
pub mod registry;
pub mod store;

pub use factory::{create_object_store, create_run_registry};
