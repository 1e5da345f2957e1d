//! Run registry abstraction layer

pub mod file;
pub mod traits;

pub use file::FileRunRegistry;
pub use traits::{RegistryQuery, RegistryRecord, RegistryResult, RunRegistry};
