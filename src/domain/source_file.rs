//! Candidate files found during classification

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Classification of a candidate file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Sequence data (reads, mapped reads, FASTA)
    Sequence,
    /// Anything else that is not excluded (reports, indexes, descriptors)
    NonSequence,
    /// Matched the exclusion pattern; never published
    Excluded,
}

/// A classified file
///
/// Immutable once classified. `relative_path` is the path below the scanned
/// root and equals the base name for a flat scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    path: PathBuf,
    relative_path: PathBuf,
    kind: FileKind,
}

impl SourceFile {
    /// Creates a classified file
    pub fn new(path: PathBuf, relative_path: PathBuf, kind: FileKind) -> Self {
        Self {
            path,
            relative_path,
            kind,
        }
    }

    /// Absolute path on the local filesystem
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the scanned root
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Inferred kind
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Base name of the file
    pub fn base_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        let file = SourceFile::new(
            PathBuf::from("/data/outputs/m84047.hifi_reads.bam"),
            PathBuf::from("m84047.hifi_reads.bam"),
            FileKind::Sequence,
        );
        assert_eq!(file.base_name(), "m84047.hifi_reads.bam");
        assert_eq!(file.kind(), FileKind::Sequence);
    }

    #[test]
    fn test_classified_names_sort_by_name_then_kind() {
        let mut classified = vec![
            ("b.bam".to_string(), FileKind::Excluded),
            ("a.json".to_string(), FileKind::NonSequence),
            ("b.bam".to_string(), FileKind::Sequence),
        ];
        classified.sort();

        assert_eq!(
            classified,
            vec![
                ("a.json".to_string(), FileKind::NonSequence),
                ("b.bam".to_string(), FileKind::Sequence),
                ("b.bam".to_string(), FileKind::Excluded),
            ]
        );
    }
}
