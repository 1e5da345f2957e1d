//! Run log archiver
//!
//! Bundles a run's log tree into one `.tar.gz`, checks the bundle against
//! the classified file set and publishes it as a single object.

use super::bundle::ArchiveBundle;
use crate::adapters::store::{ObjectId, ObjectStore};
use crate::config::SeqferryConfig;
use crate::core::classify::FileClassifier;
use crate::domain::errors::SeqferryError;
use crate::domain::metadata::{DataLevel, MetadataAttribute, MetadataRecord};
use crate::domain::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Archives run folders into the object store
pub struct LogArchiver {
    store: Arc<dyn ObjectStore>,
    classifier: FileClassifier,
    run_id_pattern: Regex,
    scratch_root: PathBuf,
}

impl LogArchiver {
    /// Creates an archiver from the classification and staging settings
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if a pattern does not compile
    pub fn new(config: &SeqferryConfig, store: Arc<dyn ObjectStore>) -> Result<Self> {
        Ok(Self {
            store,
            classifier: FileClassifier::for_logs(&config.classification)?,
            run_id_pattern: Regex::new(&config.classification.run_id_pattern)?,
            scratch_root: config.staging.scratch_root(),
        })
    }

    /// Run id encoded in a run folder name, e.g. `150910_HS40_17550_A_C75BCANXX` -> 17550
    pub fn infer_run_id(&self, dir_name: &str) -> Option<u64> {
        self.run_id_pattern
            .captures(dir_name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Archives every matching file below `source_dir` and publishes the
    /// bundle to `<destination>/<dir name>_logs.tgz`
    ///
    /// # Errors
    ///
    /// - `Configuration` if no run id is given and none can be inferred
    /// - `Io` if the tree cannot be read
    /// - `Archive` if the bundle cannot be built or fails its self-check
    /// - `Store` if the upload or metadata attachment fails
    pub async fn archive_and_publish(
        &self,
        source_dir: &Path,
        run_id: Option<u64>,
        destination: &str,
    ) -> Result<ObjectId> {
        let dir_name = source_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                SeqferryError::Configuration(format!(
                    "{} does not name a run folder",
                    source_dir.display()
                ))
            })?;

        let run_id = match run_id.or_else(|| self.infer_run_id(&dir_name)) {
            Some(id) => id,
            None => {
                return Err(SeqferryError::Configuration(format!(
                    "No run id given and none found in '{dir_name}'"
                )))
            }
        };

        let partition = self.classifier.classify_tree(source_dir).await?;
        let matched = partition.sequence;
        if matched.is_empty() {
            return Err(SeqferryError::Archive(format!(
                "No log files to archive in {}",
                source_dir.display()
            )));
        }
        tracing::info!(
            source = %source_dir.display(),
            run_id,
            files = matched.len(),
            skipped = partition.excluded.len() + partition.non_sequence.len(),
            "Archiving run logs"
        );

        let bundle = ArchiveBundle::build(&self.scratch_root, &dir_name, &matched).await?;
        bundle.verify().await?;

        self.store.create_collection(destination).await?;
        let remote = format!("{}/{}", destination.trim_end_matches('/'), bundle.file_name());
        let id = self.store.put_object(bundle.path(), &remote).await?;

        let record = MetadataRecord::new()
            .with(MetadataAttribute::Run, run_id.to_string())
            .with(MetadataAttribute::FileType, "tgz")
            .with(MetadataAttribute::DataLevel, DataLevel::Primary.as_str());
        self.store.attach_metadata(&id, &record).await?;

        tracing::info!(object = %id, members = bundle.members().len(), "Published log archive");
        Ok(id)
    }
}
