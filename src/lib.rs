// Seqferry - Sequencing output publisher
// Copyright (c) 2025 Seqferry Contributors
// Licensed under the MIT License

//! # Seqferry - Sequencing output publisher
//!
//! Seqferry loads the output of long-read sequencing runs into a managed
//! object store. Each secondary analysis is classified, staged through a
//! copy/compress pipeline, tagged with run and sample metadata, and
//! uploaded exactly once: a completion marker in the run folder makes
//! reruns no-ops, and its absence makes a partial run retry.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (classification, staging, metadata, publishing, log archiving)
//! - [`adapters`] - Object store and run registry integrations
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seqferry::adapters::create_object_store;
//! use seqferry::config::load_config;
//! use seqferry::core::archive::LogArchiver;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("seqferry.toml")?;
//!     let store = create_object_store(&config.store).await?;
//!
//!     let archiver = LogArchiver::new(&config, store)?;
//!     let id = archiver
//!         .archive_and_publish(
//!             Path::new("/runs/150910_HS40_17550_A_C75BCANXX"),
//!             None,
//!             &config.store.log_collection,
//!         )
//!         .await?;
//!
//!     println!("Published {id}");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], whose error type is
//! [`domain::SeqferryError`]. Per-file failures during a publish are
//! counted in the [`core::publish::PublishSummary`] rather than returned.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
