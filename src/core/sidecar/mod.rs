//! Sidecar descriptors
//!
//! An analysis directory carries a metadata XML (movie, run, well, barcode)
//! and optionally a primers report. Together with the analysis id supplied
//! by the caller they determine the [`AnalysisContext`].

pub mod primers;
pub mod xml;

use crate::config::schema::SidecarConfig;
use crate::domain::analysis::{AnalysisContext, AnalysisContextBuilder};
use crate::domain::context::ResultExt;
use crate::domain::errors::SeqferryError;
use crate::domain::Result;
use regex::Regex;
use std::path::{Path, PathBuf};

pub use primers::parse_primers_report;
pub use xml::{parse_metadata_xml, SidecarMetadata};

/// Paths of the descriptors for one analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarPaths {
    pub metadata_xml: PathBuf,
    pub primers_report: Option<PathBuf>,
}

/// Finds sidecar descriptors in an analysis directory
#[derive(Debug, Clone)]
pub struct SidecarLocator {
    metadata_pattern: Regex,
    primers_pattern: Regex,
}

impl SidecarLocator {
    /// Creates a locator from configured patterns
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if a pattern does not compile
    pub fn from_config(config: &SidecarConfig) -> Result<Self> {
        Ok(Self {
            metadata_pattern: Regex::new(&config.metadata_pattern)?,
            primers_pattern: Regex::new(&config.primers_report_pattern)?,
        })
    }

    /// Resolves descriptor paths, searching `analysis_dir` for any not given
    ///
    /// # Errors
    ///
    /// Returns a `Sidecar` error if no metadata XML is found or several
    /// candidates match a pattern, and an `Io` error if the directory
    /// cannot be read
    pub async fn locate(
        &self,
        analysis_dir: &Path,
        metadata_xml: Option<&Path>,
        primers_report: Option<&Path>,
    ) -> Result<SidecarPaths> {
        let names = if metadata_xml.is_none() || primers_report.is_none() {
            list_file_names(analysis_dir).await?
        } else {
            Vec::new()
        };

        let metadata_xml = match metadata_xml {
            Some(path) => path.to_path_buf(),
            None => single_match(&names, &self.metadata_pattern, "metadata XML")?
                .map(|name| analysis_dir.join(name))
                .ok_or_else(|| {
                    SeqferryError::Sidecar(format!(
                        "No metadata XML found in {}",
                        analysis_dir.display()
                    ))
                })?,
        };

        let primers_report = match primers_report {
            Some(path) => Some(path.to_path_buf()),
            None => single_match(&names, &self.primers_pattern, "primers report")?
                .map(|name| analysis_dir.join(name)),
        };

        tracing::debug!(
            metadata_xml = %metadata_xml.display(),
            primers_report = ?primers_report,
            "Located sidecar descriptors"
        );

        Ok(SidecarPaths {
            metadata_xml,
            primers_report,
        })
    }
}

/// Reads the descriptors and builds the analysis context
///
/// # Errors
///
/// Returns a `Sidecar` error if a descriptor cannot be read or parsed, or
/// if the identifiers it carries are invalid
pub async fn load_analysis_context(
    paths: &SidecarPaths,
    analysis_id: &str,
) -> Result<AnalysisContext> {
    let xml = tokio::fs::read_to_string(&paths.metadata_xml)
        .await
        .map_err(|e| {
            SeqferryError::Sidecar(format!(
                "Cannot read metadata XML {}: {}",
                paths.metadata_xml.display(),
                e
            ))
        })?;
    let metadata = parse_metadata_xml(&xml)
        .with_context(|| format!("{}", paths.metadata_xml.display()))?;

    let primers = match &paths.primers_report {
        Some(path) => {
            let json = tokio::fs::read_to_string(path).await.map_err(|e| {
                SeqferryError::Sidecar(format!(
                    "Cannot read primers report {}: {}",
                    path.display(),
                    e
                ))
            })?;
            parse_primers_report(&json).with_context(|| format!("{}", path.display()))?
        }
        None => Default::default(),
    };

    build_context(metadata, analysis_id, primers)
}

fn build_context(
    metadata: SidecarMetadata,
    analysis_id: &str,
    primers: std::collections::BTreeMap<String, String>,
) -> Result<AnalysisContext> {
    let mut builder = AnalysisContextBuilder::new()
        .run_name(metadata.run_name)
        .well_label(&metadata.well_label)
        .map_err(SeqferryError::Sidecar)?
        .movie_name(metadata.movie_name)
        .analysis_id(analysis_id)
        .map_err(SeqferryError::Configuration)?
        .single_cell(metadata.single_cell)
        .primers(primers);

    if let Some(plate) = metadata.plate_number {
        builder = builder.plate_number(plate);
    }
    if let Some(barcode) = metadata.barcode {
        builder = builder.barcode(barcode);
    }

    builder.build().map_err(SeqferryError::Sidecar)
}

async fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Cannot read directory {}", dir.display()))?;

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

fn single_match<'a>(names: &'a [String], pattern: &Regex, what: &str) -> Result<Option<&'a str>> {
    let mut matches = names.iter().filter(|name| pattern.is_match(name));
    let first = matches.next();
    if let Some(second) = matches.next() {
        return Err(SeqferryError::Sidecar(format!(
            "Several {what} candidates ({}, {second}, ...); pass the path explicitly",
            first.map(String::as_str).unwrap_or_default()
        )));
    }
    Ok(first.map(String::as_str))
}
