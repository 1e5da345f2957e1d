//! Metadata resolution
//!
//! Builds the primary (identity) metadata of a published object from the
//! analysis context, and the secondary (provenance) metadata from run
//! registry records.

use crate::adapters::registry::{RegistryQuery, RegistryRecord, RunRegistry};
use crate::domain::analysis::AnalysisContext;
use crate::domain::errors::SeqferryError;
use crate::domain::ids::{ProductId, WellLabel};
use crate::domain::metadata::{DataLevel, MetadataAttribute, MetadataRecord};
use crate::domain::Result;
use serde_json::Value;
use std::sync::Arc;

/// Outcome of a registry lookup that did not fail outright
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryMatch {
    /// Exactly one record matched
    Found(Box<RegistryRecord>),
    /// No record matched; the file is skipped, which is not an error
    NotFound,
}

/// Resolves metadata for files of one analysis
pub struct MetadataResolver {
    registry: Arc<dyn RunRegistry>,
}

impl MetadataResolver {
    /// Creates a resolver backed by `registry`
    pub fn new(registry: Arc<dyn RunRegistry>) -> Self {
        Self { registry }
    }

    /// Looks up the single registry record for a run/well/tag
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error when more than one record matches
    /// and a `Registry` error when the backend fails.
    pub async fn lookup_registry(
        &self,
        run_name: &str,
        well_label: &WellLabel,
        tag_id: Option<&str>,
        plate_number: Option<u8>,
    ) -> Result<RegistryMatch> {
        let query = RegistryQuery {
            run_name: run_name.to_string(),
            well_label: well_label.clone(),
            tag_id: tag_id.map(String::from),
            plate_number,
        };

        let mut records = self.registry.find(&query).await?;
        match records.len() {
            0 => {
                tracing::warn!(
                    run = %run_name,
                    well = %well_label,
                    tag = tag_id.unwrap_or("-"),
                    "No registry record found"
                );
                Ok(RegistryMatch::NotFound)
            }
            1 => Ok(RegistryMatch::Found(Box::new(records.remove(0)))),
            n => Err(SeqferryError::Configuration(format!(
                "Ambiguous registry match: {n} records for run {run_name}, well {well_label}, tag {}",
                tag_id.unwrap_or("-")
            ))),
        }
    }

    /// Identity metadata for one object
    ///
    /// `extra_tags` is merged last (e.g. a primer resolved from the file
    /// name).
    pub fn resolve_primary(
        &self,
        context: &AnalysisContext,
        data_level: DataLevel,
        product_id: &ProductId,
        extra_tags: &MetadataRecord,
        is_target: bool,
    ) -> MetadataRecord {
        let mut record = MetadataRecord::new()
            .with(MetadataAttribute::Run, context.run_name.as_str())
            .with(MetadataAttribute::Well, context.well_label.normalized())
            .with(MetadataAttribute::Movie, context.movie_name.as_str())
            .with(MetadataAttribute::AnalysisId, context.analysis_id.as_str())
            .with(MetadataAttribute::ProductId, product_id.as_str())
            .with(MetadataAttribute::DataLevel, data_level.as_str())
            .with(MetadataAttribute::Target, if is_target { "1" } else { "0" });

        if let Some(plate) = context.plate_number {
            record.insert(MetadataAttribute::PlateNumber, plate.to_string());
        }
        if let Some(tag) = context.tag_id() {
            record.insert(MetadataAttribute::TagId, tag);
        }

        record.merge(extra_tags.clone());
        record
    }

    /// Provenance metadata from registry records
    ///
    /// Unrecognized registry fields become extension attributes; `null`
    /// values are dropped.
    pub fn resolve_secondary(&self, records: &[RegistryRecord]) -> MetadataRecord {
        let mut metadata = MetadataRecord::new();

        for record in records {
            let known = [
                (MetadataAttribute::SampleName, &record.sample_name),
                (MetadataAttribute::SampleId, &record.sample_id),
                (MetadataAttribute::StudyId, &record.study_id),
                (MetadataAttribute::StudyName, &record.study_name),
                (MetadataAttribute::LibraryId, &record.library_id),
                (MetadataAttribute::LibraryType, &record.library_type),
            ];
            for (attribute, value) in known {
                if let Some(value) = value {
                    metadata.insert(attribute, value.as_str());
                }
            }

            for (name, value) in &record.extra {
                match value {
                    Value::Null => {}
                    Value::String(s) => metadata.insert_extension(name.as_str(), s.as_str()),
                    other => metadata.insert_extension(name.as_str(), other.to_string()),
                }
            }
        }

        metadata
    }
}
