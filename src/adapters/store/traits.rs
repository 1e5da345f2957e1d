//! Object store abstraction traits
//!
//! This module defines the contract the publishing pipeline requires of a
//! managed object store: hierarchical collections, whole-file objects, and
//! attribute/value metadata attached to objects.

use crate::domain::errors::StoreError;
use crate::domain::metadata::MetadataRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Result type for object store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Identifier of a stored object (its absolute logical path)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(String);

impl ObjectId {
    /// Creates an object id from a logical path
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the logical path
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path component of the logical path
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Object store client trait
///
/// Collection and object paths are absolute logical paths such as
/// `/seq/pacbio/TRACTION-RUN-1140/0000021`. Implementations must not leak
/// backend-specific error types; everything maps onto [`StoreError`].
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Creates a collection and any missing parents
    ///
    /// Creating a collection that already exists succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CollectionFailed` or `PermissionDenied` if the collection
    /// cannot be created.
    async fn create_collection(&self, path: &str) -> StoreResult<()>;

    /// Removes a collection and everything below it
    ///
    /// # Errors
    ///
    /// Returns `CollectionFailed` if the collection cannot be removed.
    async fn remove_collection(&self, path: &str) -> StoreResult<()>;

    /// Uploads a local file as the object at `remote`
    ///
    /// The parent collection of `remote` must exist. An existing object is
    /// replaced and loses any metadata attached to it.
    ///
    /// # Errors
    ///
    /// Returns `PutFailed` if the upload fails.
    async fn put_object(&self, local: &Path, remote: &str) -> StoreResult<ObjectId>;

    /// Attaches metadata to an existing object
    ///
    /// Values are added to any metadata already attached since the object
    /// was last put.
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` if the object does not exist or
    /// `MetadataFailed` if the metadata cannot be written.
    async fn attach_metadata(&self, id: &ObjectId, record: &MetadataRecord) -> StoreResult<()>;

    /// Reads back the metadata attached to an object
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the object carries no metadata.
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` if the object does not exist.
    async fn metadata(&self, id: &ObjectId) -> StoreResult<Option<MetadataRecord>>;
}
