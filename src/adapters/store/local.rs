//! Filesystem-backed object store
//!
//! Collections are directories below a root, objects are files, and the
//! metadata of `<root>/a/b/file` is stored as JSON at
//! `<root>/.metadata/a/b/file.json`.

use super::traits::{ObjectId, ObjectStore, StoreResult};
use crate::domain::errors::StoreError;
use crate::domain::metadata::MetadataRecord;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

const METADATA_DIR: &str = ".metadata";

/// Object store rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Opens (creating if needed) a store at `root`
    ///
    /// # Errors
    ///
    /// Returns `ConnectionFailed` if the root cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            StoreError::ConnectionFailed(format!("{}: {}", root.display(), e))
        })?;

        tracing::debug!(root = %root.display(), "Opened local object store");
        Ok(Self { root })
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a logical path onto the filesystem
    fn resolve(&self, logical: &str) -> StoreResult<PathBuf> {
        Ok(self.root.join(relative(logical)?))
    }

    fn metadata_path(&self, logical: &str) -> StoreResult<PathBuf> {
        let mut path = self.root.join(METADATA_DIR).join(relative(logical)?);
        let file_name = format!(
            "{}.json",
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        );
        path.set_file_name(file_name);
        Ok(path)
    }
}

/// Validates a logical path and returns it relative to the root
fn relative(logical: &str) -> StoreResult<PathBuf> {
    if !logical.starts_with('/') {
        return Err(StoreError::PermissionDenied(format!(
            "'{logical}' is not an absolute logical path"
        )));
    }

    let mut rel = PathBuf::new();
    for component in Path::new(logical).components() {
        match component {
            Component::RootDir => {}
            Component::Normal(part) => rel.push(part),
            _ => {
                return Err(StoreError::PermissionDenied(format!(
                    "'{logical}' escapes the store root"
                )))
            }
        }
    }

    if rel.as_os_str().is_empty() {
        return Err(StoreError::PermissionDenied(
            "the store root itself is not addressable".to_string(),
        ));
    }
    if rel.starts_with(METADATA_DIR) {
        return Err(StoreError::PermissionDenied(format!(
            "'{logical}' is reserved for metadata"
        )));
    }

    Ok(rel)
}

fn permission_aware(err: std::io::Error, fallback: fn(String) -> StoreError, what: &str) -> StoreError {
    if err.kind() == ErrorKind::PermissionDenied {
        StoreError::PermissionDenied(format!("{what}: {err}"))
    } else {
        fallback(format!("{what}: {err}"))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn create_collection(&self, path: &str) -> StoreResult<()> {
        let dir = self.resolve(path)?;
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| permission_aware(e, StoreError::CollectionFailed, path))?;

        tracing::debug!(collection = %path, "Created collection");
        Ok(())
    }

    async fn remove_collection(&self, path: &str) -> StoreResult<()> {
        let dir = self.resolve(path)?;
        tokio::fs::remove_dir_all(&dir)
            .await
            .map_err(|e| permission_aware(e, StoreError::CollectionFailed, path))?;

        let meta_dir = self.root.join(METADATA_DIR).join(relative(path)?);
        match tokio::fs::remove_dir_all(&meta_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(permission_aware(e, StoreError::CollectionFailed, path)),
        }

        tracing::debug!(collection = %path, "Removed collection");
        Ok(())
    }

    async fn put_object(&self, local: &Path, remote: &str) -> StoreResult<ObjectId> {
        let target = self.resolve(remote)?;
        let parent_exists = match target.parent() {
            Some(parent) => tokio::fs::metadata(parent)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false),
            None => false,
        };
        if !parent_exists {
            return Err(StoreError::PutFailed(format!(
                "{remote}: parent collection does not exist"
            )));
        }

        tokio::fs::copy(local, &target)
            .await
            .map_err(|e| permission_aware(e, StoreError::PutFailed, remote))?;

        let stale = self.metadata_path(remote)?;
        match tokio::fs::remove_file(&stale).await {
            Ok(()) => tracing::debug!(remote = %remote, "Dropped metadata of replaced object"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(permission_aware(e, StoreError::PutFailed, remote)),
        }

        tracing::debug!(local = %local.display(), remote = %remote, "Put object");
        Ok(ObjectId::new(remote))
    }

    async fn attach_metadata(&self, id: &ObjectId, record: &MetadataRecord) -> StoreResult<()> {
        let object = self.resolve(id.as_str())?;
        if !tokio::fs::try_exists(&object).await.unwrap_or(false) {
            return Err(StoreError::ObjectNotFound(id.to_string()));
        }

        let mut merged = self.metadata(id).await?.unwrap_or_default();
        merged.merge(record.clone());

        let path = self.metadata_path(id.as_str())?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::MetadataFailed(format!("{id}: {e}")))?;
        }
        let json = serde_json::to_vec_pretty(&merged)
            .map_err(|e| StoreError::MetadataFailed(format!("{id}: {e}")))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| StoreError::MetadataFailed(format!("{id}: {e}")))?;

        tracing::debug!(object = %id, attributes = record.len(), "Attached metadata");
        Ok(())
    }

    async fn metadata(&self, id: &ObjectId) -> StoreResult<Option<MetadataRecord>> {
        let object = self.resolve(id.as_str())?;
        if !tokio::fs::try_exists(&object).await.unwrap_or(false) {
            return Err(StoreError::ObjectNotFound(id.to_string()));
        }

        let path = self.metadata_path(id.as_str())?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StoreError::MetadataFailed(format!("{id}: {e}"))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::MetadataFailed(format!("{id}: {e}"))),
        }
    }
}
