//! Run registry abstraction traits
//!
//! The run registry is the sample-tracking system that knows which
//! study, sample and library were loaded into a given run/well/tag.

use crate::domain::errors::RegistryError;
use crate::domain::ids::WellLabel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result type for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Lookup key for registry records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryQuery {
    /// Run name
    pub run_name: String,

    /// Well label (compared in normalized form)
    pub well_label: WellLabel,

    /// Tag id; `None` matches records with any tag
    pub tag_id: Option<String>,

    /// Plate number; `None` matches records on any plate
    pub plate_number: Option<u8>,
}

impl RegistryQuery {
    /// Whether a record satisfies this query
    pub fn matches(&self, record: &RegistryRecord) -> bool {
        if record.run_name != self.run_name {
            return false;
        }
        match WellLabel::new(&record.well_label) {
            Ok(well) if well == self.well_label => {}
            _ => return false,
        }
        if let Some(tag) = &self.tag_id {
            if record.tag_id.as_deref() != Some(tag.as_str()) {
                return false;
            }
        }
        if let Some(plate) = self.plate_number {
            if record.plate_number.is_some_and(|p| p != plate) {
                return false;
            }
        }
        true
    }
}

/// One registry row: a library loaded into a run/well, optionally tagged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub run_name: String,
    pub well_label: String,
    #[serde(default)]
    pub tag_id: Option<String>,
    #[serde(default)]
    pub plate_number: Option<u8>,
    #[serde(default)]
    pub sample_name: Option<String>,
    #[serde(default)]
    pub sample_id: Option<String>,
    #[serde(default)]
    pub study_id: Option<String>,
    #[serde(default)]
    pub study_name: Option<String>,
    #[serde(default)]
    pub library_id: Option<String>,
    #[serde(default)]
    pub library_type: Option<String>,

    /// Any further registry fields, carried through as extension metadata
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Run registry trait
#[async_trait]
pub trait RunRegistry: Send + Sync {
    /// Finds all records satisfying the query
    ///
    /// # Errors
    ///
    /// Returns an error if the registry backend cannot be queried.
    async fn find(&self, query: &RegistryQuery) -> RegistryResult<Vec<RegistryRecord>>;
}
