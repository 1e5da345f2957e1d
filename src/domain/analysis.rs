//! Analysis context domain model
//!
//! An [`AnalysisContext`] describes one unit of instrument/pipeline output:
//! the run and well it came from, the movie that produced it, and the
//! barcode that ties it to a registry record. It is derived once from the
//! sidecar descriptors and is read-only for the rest of the run.

use super::ids::{AnalysisId, WellLabel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Identifiers for one analysis, derived from its sidecar descriptors
///
/// # Examples
///
/// ```
/// use seqferry::domain::analysis::AnalysisContextBuilder;
///
/// let context = AnalysisContextBuilder::new()
///     .run_name("TRACTION-RUN-1140")
///     .well_label("A01").unwrap()
///     .movie_name("m84047_230404_172822_s1")
///     .analysis_id("0000021").unwrap()
///     .barcode("bc2001--bc2001")
///     .build()
///     .unwrap();
///
/// assert_eq!(context.marker_file_name(), "0000021.m84047_230404_172822_s1.loaded.txt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisContext {
    /// Run name as recorded by the instrument and the registry
    pub run_name: String,

    /// Well the movie was recorded in
    pub well_label: WellLabel,

    /// Plate number for multi-plate instruments
    pub plate_number: Option<u8>,

    /// Movie (collection context) name
    pub movie_name: String,

    /// Secondary analysis identifier
    pub analysis_id: AnalysisId,

    /// Barcode declared in the metadata XML, if any
    pub barcode: Option<String>,

    /// Whether the library is single-cell (no barcode required)
    pub single_cell: bool,

    /// Sample name to primer name table from the primers report
    pub primers: BTreeMap<String, String>,
}

impl AnalysisContext {
    /// Name of the idempotency marker for this analysis
    pub fn marker_file_name(&self) -> String {
        format!(
            "{}.{}.loaded.txt",
            self.analysis_id.as_str(),
            self.movie_name
        )
    }

    /// Marker path inside a run folder
    pub fn marker_path(&self, runfolder: &Path) -> PathBuf {
        runfolder.join(self.marker_file_name())
    }

    /// Prefix applied to every staged file name
    pub fn staging_prefix(&self) -> String {
        format!("{}.{}.", self.analysis_id.as_str(), self.movie_name)
    }

    /// Destination collection `<dest>/<runName>/<analysisId>`
    pub fn destination(&self, dest_collection: &str) -> String {
        format!(
            "{}/{}/{}",
            dest_collection.trim_end_matches('/'),
            self.run_name,
            self.analysis_id.as_str()
        )
    }

    /// Registry tag identifier for this analysis
    ///
    /// Single-cell analyses are looked up without a tag even when the
    /// descriptor carries a barcode.
    pub fn tag_id(&self) -> Option<&str> {
        if self.single_cell {
            None
        } else {
            self.barcode.as_deref()
        }
    }
}

/// Builder for constructing AnalysisContext instances
#[derive(Debug, Default)]
pub struct AnalysisContextBuilder {
    run_name: Option<String>,
    well_label: Option<WellLabel>,
    plate_number: Option<u8>,
    movie_name: Option<String>,
    analysis_id: Option<AnalysisId>,
    barcode: Option<String>,
    single_cell: bool,
    primers: BTreeMap<String, String>,
}

impl AnalysisContextBuilder {
    /// Creates a new AnalysisContextBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the run name
    pub fn run_name(mut self, run_name: impl Into<String>) -> Self {
        self.run_name = Some(run_name.into());
        self
    }

    /// Sets the well label
    pub fn well_label(mut self, label: impl AsRef<str>) -> Result<Self, String> {
        self.well_label = Some(WellLabel::new(label)?);
        Ok(self)
    }

    /// Sets the plate number
    pub fn plate_number(mut self, plate_number: u8) -> Self {
        self.plate_number = Some(plate_number);
        self
    }

    /// Sets the movie name
    pub fn movie_name(mut self, movie_name: impl Into<String>) -> Self {
        self.movie_name = Some(movie_name.into());
        self
    }

    /// Sets the analysis id
    pub fn analysis_id(mut self, analysis_id: impl Into<String>) -> Result<Self, String> {
        self.analysis_id = Some(AnalysisId::new(analysis_id)?);
        Ok(self)
    }

    /// Sets the barcode
    pub fn barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    /// Sets the single-cell flag
    pub fn single_cell(mut self, single_cell: bool) -> Self {
        self.single_cell = single_cell;
        self
    }

    /// Sets the sample to primer table
    pub fn primers(mut self, primers: BTreeMap<String, String>) -> Self {
        self.primers = primers;
        self
    }

    /// Builds the AnalysisContext
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is missing
    pub fn build(self) -> Result<AnalysisContext, String> {
        let run_name = self.run_name.ok_or("run_name is required")?;
        let movie_name = self.movie_name.ok_or("movie_name is required")?;
        if run_name.trim().is_empty() {
            return Err("run_name cannot be empty".to_string());
        }
        if movie_name.trim().is_empty() || movie_name.contains('/') {
            return Err(format!("movie_name '{movie_name}' is not a valid path component"));
        }

        Ok(AnalysisContext {
            run_name,
            well_label: self.well_label.ok_or("well_label is required")?,
            plate_number: self.plate_number,
            movie_name,
            analysis_id: self.analysis_id.ok_or("analysis_id is required")?,
            barcode: self.barcode.filter(|b| !b.trim().is_empty()),
            single_cell: self.single_cell,
            primers: self.primers,
        })
    }
}
