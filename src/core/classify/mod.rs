//! File classification
//!
//! Partitions the files of a directory into sequence data, non-sequence
//! files and excluded files using base-name patterns. The flat mode is used
//! for analysis output directories; the recursive mode collects run log
//! trees for archiving, where "sequence" simply means "included".

pub mod rules;

use crate::config::schema::ClassificationConfig;
use crate::domain::errors::SeqferryError;
use crate::domain::source_file::{FileKind, SourceFile};
use crate::domain::Result;
use regex::Regex;
use rules::RuleSet;
use std::path::{Path, PathBuf};

pub use rules::{ClassificationRule, NamePredicate};

/// Result of classifying a directory
///
/// The three lists are disjoint, each sorted by relative path, and their
/// union is every file found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub sequence: Vec<SourceFile>,
    pub non_sequence: Vec<SourceFile>,
    pub excluded: Vec<SourceFile>,
}

impl Partition {
    /// Total number of files across all three lists
    pub fn len(&self) -> usize {
        self.sequence.len() + self.non_sequence.len() + self.excluded.len()
    }

    /// Whether no files were found
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Files that will be published (sequence and non-sequence)
    pub fn candidates(&self) -> usize {
        self.sequence.len() + self.non_sequence.len()
    }

    fn push(&mut self, file: SourceFile) {
        match file.kind() {
            FileKind::Sequence => self.sequence.push(file),
            FileKind::NonSequence => self.non_sequence.push(file),
            FileKind::Excluded => self.excluded.push(file),
        }
    }
}

/// Name-pattern file classifier
#[derive(Debug)]
pub struct FileClassifier {
    rules: RuleSet,
}

impl FileClassifier {
    /// Creates a classifier from include/exclude regular expressions
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if either pattern does not compile
    pub fn new(include_pattern: &str, exclude_pattern: &str) -> Result<Self> {
        let include = Regex::new(include_pattern)?;
        let exclude = Regex::new(exclude_pattern)?;
        Ok(Self::with_rules(RuleSet::include_exclude(include, exclude)))
    }

    /// Creates a classifier from an explicit rule set
    pub fn with_rules(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Classifier for analysis output directories
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if a pattern does not compile
    pub fn for_analysis(config: &ClassificationConfig) -> Result<Self> {
        Self::new(&config.sequence_pattern, &config.exclude_pattern)
    }

    /// Classifier for run log trees
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if a pattern does not compile
    pub fn for_logs(config: &ClassificationConfig) -> Result<Self> {
        Self::new(&config.log_include_pattern, &config.log_exclude_pattern)
    }

    /// Kind of a single base name
    pub fn kind_of(&self, name: &str) -> FileKind {
        self.rules.kind_of(name)
    }

    /// Classifies base names without touching the filesystem
    ///
    /// Output is sorted by name.
    pub fn classify_names<I, S>(&self, names: I) -> Vec<(String, FileKind)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classified: Vec<(String, FileKind)> = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_string(), self.kind_of(name))
            })
            .collect();
        classified.sort_by(|a, b| a.0.cmp(&b.0));
        classified
    }

    /// Classifies the regular files directly in `directory`
    ///
    /// Symlinks are followed; sub-directories and dangling links are not
    /// entries.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the directory cannot be read
    pub async fn classify(&self, directory: &Path) -> Result<Partition> {
        let mut files = Vec::new();
        for path in read_dir_sorted(directory).await? {
            if !is_regular_file(&path).await {
                continue;
            }
            let Some(name) = path.file_name().map(PathBuf::from) else {
                continue;
            };
            files.push((path, name));
        }

        let partition = self.partition(files);
        tracing::debug!(
            directory = %directory.display(),
            sequence = partition.sequence.len(),
            non_sequence = partition.non_sequence.len(),
            excluded = partition.excluded.len(),
            "Classified directory"
        );
        Ok(partition)
    }

    /// Classifies every regular file below `root`
    ///
    /// Each file records its path relative to `root`. Symlinked files are
    /// followed; symlinked directories are not descended into.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if any directory cannot be read
    pub async fn classify_tree(&self, root: &Path) -> Result<Partition> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            for path in read_dir_sorted(&dir).await? {
                let link_meta = tokio::fs::symlink_metadata(&path).await?;
                if link_meta.is_dir() {
                    pending.push(path);
                    continue;
                }
                if !is_regular_file(&path).await {
                    continue;
                }
                let relative = path
                    .strip_prefix(root)
                    .map(Path::to_path_buf)
                    .map_err(|e| SeqferryError::Io(format!("{}: {}", path.display(), e)))?;
                files.push((path, relative));
            }
        }

        let partition = self.partition(files);
        tracing::debug!(
            root = %root.display(),
            included = partition.sequence.len(),
            excluded = partition.excluded.len(),
            "Classified tree"
        );
        Ok(partition)
    }

    fn partition(&self, mut files: Vec<(PathBuf, PathBuf)>) -> Partition {
        files.sort_by(|a, b| a.1.cmp(&b.1));

        let mut partition = Partition::default();
        for (path, relative) in files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let kind = self.kind_of(&name);
            partition.push(SourceFile::new(path, relative, kind));
        }
        partition
    }
}

/// Classifies `directory` with ad-hoc patterns
///
/// # Errors
///
/// Returns a `Configuration` error for bad patterns or an `Io` error if the
/// directory cannot be read
pub async fn classify(
    directory: &Path,
    include_pattern: &str,
    exclude_pattern: &str,
) -> Result<Partition> {
    FileClassifier::new(include_pattern, exclude_pattern)?
        .classify(directory)
        .await
}

/// Recursive variant of [`classify`]
///
/// # Errors
///
/// Same as [`classify`]
pub async fn classify_tree(
    root: &Path,
    include_pattern: &str,
    exclude_pattern: &str,
) -> Result<Partition> {
    FileClassifier::new(include_pattern, exclude_pattern)?
        .classify_tree(root)
        .await
}

async fn read_dir_sorted(directory: &Path) -> Result<Vec<PathBuf>> {
    let unreadable =
        |e: std::io::Error| SeqferryError::Io(format!("Cannot read directory {}: {}", directory.display(), e));

    let mut entries = tokio::fs::read_dir(directory).await.map_err(unreadable)?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

async fn is_regular_file(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_file(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn classifier() -> FileClassifier {
        FileClassifier::for_analysis(&ClassificationConfig::default()).unwrap()
    }

    #[test]
    fn test_classify_names_is_sorted_and_complete() {
        let names = [
            "m84047.segmented.hifi_reads.bam",
            "m84047.hifi_reads.bam",
            "m84047.hifi_reads.bam.pbi",
            "m84047.ccs_report.json",
        ];
        let classified = classifier().classify_names(names);

        assert_eq!(classified.len(), names.len());
        assert_eq!(
            classified,
            vec![
                ("m84047.ccs_report.json".to_string(), FileKind::NonSequence),
                ("m84047.hifi_reads.bam".to_string(), FileKind::Sequence),
                ("m84047.hifi_reads.bam.pbi".to_string(), FileKind::NonSequence),
                ("m84047.segmented.hifi_reads.bam".to_string(), FileKind::Excluded),
            ]
        );
    }

    #[test]
    fn test_bad_pattern_is_configuration_error() {
        let result = FileClassifier::new("(", "x");
        assert!(matches!(result, Err(SeqferryError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_classify_empty_directory() {
        let dir = TempDir::new().unwrap();
        let partition = classifier().classify(dir.path()).await.unwrap();
        assert!(partition.is_empty());
    }

    #[tokio::test]
    async fn test_classify_missing_directory_is_io_error() {
        let result = classifier()
            .classify(Path::new("/nonexistent/seqferry/dir"))
            .await;
        assert!(matches!(result, Err(SeqferryError::Io(_))));
    }

    #[tokio::test]
    async fn test_classify_skips_subdirectories() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("m1.hifi_reads.bam"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("m1.reads.bam"), b"x").unwrap();

        let partition = classifier().classify(dir.path()).await.unwrap();
        assert_eq!(partition.len(), 1);
        assert_eq!(partition.sequence[0].relative_path(), Path::new("m1.hifi_reads.bam"));
    }

    #[tokio::test]
    async fn test_classify_tree_records_relative_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("top.log"), b"x").unwrap();
        std::fs::write(dir.path().join("a/b/deep.log"), b"x").unwrap();

        let partition = classify_tree(dir.path(), ".", "^$").await.unwrap();
        let relative: Vec<_> = partition
            .sequence
            .iter()
            .map(|f| f.relative_path().to_path_buf())
            .collect();
        assert_eq!(relative, vec![PathBuf::from("a/b/deep.log"), PathBuf::from("top.log")]);
    }
}
