//! Registry backed by a JSON records file
//!
//! The file holds either a top-level array of records or an object with a
//! `records` array. It is read once when the registry is opened.

use super::traits::{RegistryQuery, RegistryRecord, RegistryResult, RunRegistry};
use crate::domain::errors::RegistryError;
use crate::domain::ids::WellLabel;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsFile {
    Bare(Vec<RegistryRecord>),
    Wrapped { records: Vec<RegistryRecord> },
}

/// Run registry loaded from a JSON file
#[derive(Debug, Clone, Default)]
pub struct FileRunRegistry {
    records: Vec<RegistryRecord>,
}

impl FileRunRegistry {
    /// Loads the registry from `path`
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the file cannot be read and `InvalidData`
    /// if it is not a valid records document or a record carries an
    /// unparsable well label.
    pub async fn load(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RegistryError::Unavailable(format!("{}: {}", path.display(), e)))?;

        let parsed: RecordsFile = serde_json::from_slice(&bytes)
            .map_err(|e| RegistryError::InvalidData(format!("{}: {}", path.display(), e)))?;
        let records = match parsed {
            RecordsFile::Bare(records) | RecordsFile::Wrapped { records } => records,
        };

        Self::from_records(records).inspect(|registry| {
            tracing::info!(
                path = %path.display(),
                records = registry.records.len(),
                "Loaded run registry"
            );
        })
    }

    /// Builds a registry from in-memory records
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if a record carries an unparsable well label.
    pub fn from_records(records: Vec<RegistryRecord>) -> RegistryResult<Self> {
        for record in &records {
            WellLabel::new(&record.well_label).map_err(|e| {
                RegistryError::InvalidData(format!("run {}: {}", record.run_name, e))
            })?;
        }
        Ok(Self { records })
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RunRegistry for FileRunRegistry {
    async fn find(&self, query: &RegistryQuery) -> RegistryResult<Vec<RegistryRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }
}
