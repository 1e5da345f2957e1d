//! Object store abstraction layer
//!
//! The pipeline talks to managed storage only through the [`ObjectStore`]
//! trait. [`LocalObjectStore`] maps collections onto directories.

pub mod local;
pub mod traits;

pub use local::LocalObjectStore;
pub use traits::{ObjectId, ObjectStore, StoreResult};
