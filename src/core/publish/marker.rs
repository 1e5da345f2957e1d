//! Completion marker
//!
//! The marker `<runfolder>/<analysisId>.<movie>.loaded.txt` records that an
//! analysis was published in full. It is written to a temporary sibling and
//! renamed into place, so it is either absent or complete.

use super::result::PublishResult;
use crate::domain::analysis::AnalysisContext;
use crate::domain::errors::SeqferryError;
use crate::domain::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of a completion marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishMarker {
    pub analysis_id: String,
    pub movie_name: String,
    pub run_name: String,
    pub destination: String,
    pub files_seen: usize,
    pub files_processed: usize,
    pub loaded_at: DateTime<Utc>,
}

impl PublishMarker {
    /// Marker for a completed publish of `context`
    pub fn new(context: &AnalysisContext, destination: &str, result: &PublishResult) -> Self {
        Self {
            analysis_id: context.analysis_id.to_string(),
            movie_name: context.movie_name.clone(),
            run_name: context.run_name.clone(),
            destination: destination.to_string(),
            files_seen: result.files_seen,
            files_processed: result.files_processed,
            loaded_at: Utc::now(),
        }
    }
}

/// Whether a marker exists at `path`
pub async fn marker_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Writes the marker atomically
///
/// # Errors
///
/// Returns an `Io` error if the marker cannot be written
pub async fn write_marker(path: &Path, marker: &PublishMarker) -> Result<()> {
    let json = serde_json::to_vec_pretty(marker)?;
    let tmp = temp_path(path);

    let written = async {
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(SeqferryError::Io(format!(
            "Cannot write marker {}: {}",
            path.display(),
            e
        )));
    }

    tracing::debug!(marker = %path.display(), "Wrote completion marker");
    Ok(())
}

/// Reads a marker back
///
/// # Errors
///
/// Returns an `Io` error if the file cannot be read, or a
/// `Serialization` error if it is not a marker document
pub async fn read_marker(path: &Path) -> Result<PublishMarker> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| SeqferryError::Io(format!("Cannot read marker {}: {}", path.display(), e)))?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}
