//! Metadata records attached to published objects
//!
//! A [`MetadataRecord`] is a typed attribute/value mapping. Recognized
//! attribute names are the fixed [`MetadataAttribute`] set; anything the
//! registry supplies beyond that goes in the extension map so new registry
//! fields can be carried without a code change.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Recognized metadata attribute names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataAttribute {
    // Primary (identity)
    Run,
    Well,
    PlateNumber,
    Movie,
    AnalysisId,
    ProductId,
    DataLevel,
    Target,
    TagId,
    Primer,
    FileType,
    // Secondary (provenance)
    SampleName,
    SampleId,
    StudyId,
    StudyName,
    LibraryId,
    LibraryType,
}

impl MetadataAttribute {
    /// Attribute name as stored in the object store
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Well => "well",
            Self::PlateNumber => "plate_number",
            Self::Movie => "movie",
            Self::AnalysisId => "analysis_id",
            Self::ProductId => "product_id",
            Self::DataLevel => "data_level",
            Self::Target => "target",
            Self::TagId => "tag_id",
            Self::Primer => "primer",
            Self::FileType => "file_type",
            Self::SampleName => "sample_name",
            Self::SampleId => "sample_id",
            Self::StudyId => "study_id",
            Self::StudyName => "study_name",
            Self::LibraryId => "library_id",
            Self::LibraryType => "library_type",
        }
    }
}

impl fmt::Display for MetadataAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data level of a published object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataLevel {
    /// Instrument output (raw reads, run logs)
    Primary,
    /// Output of a secondary analysis
    Secondary,
}

impl DataLevel {
    /// Value stored for the data level attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

/// Attribute/value mapping attached to one published object
///
/// Attributes may carry several values (a pooled library maps to several
/// samples); values are kept sorted and de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(default)]
    attributes: BTreeMap<MetadataAttribute, BTreeSet<String>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    extensions: BTreeMap<String, BTreeSet<String>>,
}

impl MetadataRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value for a recognized attribute
    pub fn insert(&mut self, attribute: MetadataAttribute, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.attributes.entry(attribute).or_default().insert(value);
    }

    /// Builder-style variant of [`MetadataRecord::insert`]
    pub fn with(mut self, attribute: MetadataAttribute, value: impl Into<String>) -> Self {
        self.insert(attribute, value);
        self
    }

    /// Adds a value under an extension (registry-sourced) name
    pub fn insert_extension(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.extensions.entry(name.into()).or_default().insert(value);
    }

    /// All values of an attribute
    pub fn values(&self, attribute: MetadataAttribute) -> Option<&BTreeSet<String>> {
        self.attributes.get(&attribute)
    }

    /// First (lowest sorted) value of an attribute
    pub fn first(&self, attribute: MetadataAttribute) -> Option<&str> {
        self.attributes
            .get(&attribute)
            .and_then(|values| values.iter().next())
            .map(String::as_str)
    }

    /// All values of an extension attribute
    pub fn extension(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.extensions.get(name)
    }

    /// Whether the record carries the attribute
    pub fn contains(&self, attribute: MetadataAttribute) -> bool {
        self.attributes.contains_key(&attribute)
    }

    /// Merges another record into this one
    pub fn merge(&mut self, other: MetadataRecord) {
        for (attribute, values) in other.attributes {
            self.attributes.entry(attribute).or_default().extend(values);
        }
        for (name, values) in other.extensions {
            self.extensions.entry(name).or_default().extend(values);
        }
    }

    /// Number of attribute/value pairs, extensions included
    pub fn len(&self) -> usize {
        self.attributes.values().map(BTreeSet::len).sum::<usize>()
            + self.extensions.values().map(BTreeSet::len).sum::<usize>()
    }

    /// Whether the record is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattened `(name, value)` pairs in a stable order
    pub fn pairs(&self) -> Vec<(String, String)> {
        let recognized = self.attributes.iter().flat_map(|(attribute, values)| {
            values
                .iter()
                .map(move |value| (attribute.as_str().to_string(), value.clone()))
        });
        let extended = self.extensions.iter().flat_map(|(name, values)| {
            values.iter().map(move |value| (name.clone(), value.clone()))
        });
        recognized.chain(extended).collect()
    }
}
