//! Adapter factory
//!
//! Factory functions that create the configured object store and run
//! registry implementations.

use crate::adapters::registry::{FileRunRegistry, RunRegistry};
use crate::adapters::store::{LocalObjectStore, ObjectStore};
use crate::config::schema::{RegistryBackend, RegistryConfig, StoreBackend, StoreConfig};
use crate::domain::Result;
use std::sync::Arc;

/// Create an object store based on the configuration
///
/// # Errors
///
/// Returns an error if the store cannot be opened
pub async fn create_object_store(config: &StoreConfig) -> Result<Arc<dyn ObjectStore>> {
    match config.backend {
        StoreBackend::Local => {
            tracing::info!(root = %config.root, "Creating local object store");
            let store = LocalObjectStore::open(&config.root).await?;
            Ok(Arc::new(store) as Arc<dyn ObjectStore>)
        }
    }
}

/// Create a run registry based on the configuration
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded
pub async fn create_run_registry(config: &RegistryConfig) -> Result<Arc<dyn RunRegistry>> {
    match config.backend {
        RegistryBackend::File => {
            tracing::info!(path = %config.path, "Creating file run registry");
            let registry = FileRunRegistry::load(&config.path).await?;
            Ok(Arc::new(registry) as Arc<dyn RunRegistry>)
        }
    }
}
