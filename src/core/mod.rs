//! Core business logic for seqferry.
//!
//! # Modules
//!
//! - [`classify`] - Name-pattern partitioning of analysis and log directories
//! - [`sidecar`] - Metadata XML and primers report parsing
//! - [`metadata`] - Product ids and object metadata resolution
//! - [`staging`] - Copy/compress pipeline into a scratch area
//! - [`publish`] - Per-analysis publish orchestration and completion markers
//! - [`archive`] - Run log bundling
//!
//! # Publish Workflow
//!
//! 1. **Context**: Read run, well and barcode details from the sidecar files
//! 2. **Marker**: Stop early if the analysis was already loaded
//! 3. **Classify**: Split the directory into sequence and non-sequence files
//! 4. **Stage**: Copy and compress each batch into scratch space
//! 5. **Resolve**: Look up the sample record in the run registry
//! 6. **Publish**: Upload files and attach metadata
//! 7. **Mark**: Write the completion marker when every file made it
//!
//! # Example
//!
//! ```rust,no_run
//! use seqferry::adapters::{create_object_store, create_run_registry};
//! use seqferry::config::load_config;
//! use seqferry::core::publish::{AnalysisPublisher, PublishRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("seqferry.toml")?;
//! let store = create_object_store(&config.store).await?;
//! let registry = create_run_registry(&config.registry).await?;
//!
//! let publisher = AnalysisPublisher::new(&config, store, registry)?;
//! let summary = publisher
//!     .publish(&PublishRequest {
//!         analysis_dir: "/data/r84047/1_A01/0000021".into(),
//!         runfolder: "/data/r84047".into(),
//!         analysis_id: "0000021".to_string(),
//!         metadata_xml: None,
//!         primers_report: None,
//!     })
//!     .await?;
//!
//! println!("{}", summary.result);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod classify;
pub mod metadata;
pub mod publish;
pub mod sidecar;
pub mod staging;
