//! Compressed log bundles
//!
//! An [`ArchiveBundle`] is a `.tar.gz` built in its own temporary
//! directory; dropping the bundle deletes it.

use crate::domain::errors::SeqferryError;
use crate::domain::source_file::SourceFile;
use crate::domain::Result;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;

/// A built archive and the member names it is expected to hold
#[derive(Debug)]
pub struct ArchiveBundle {
    _dir: TempDir,
    path: PathBuf,
    members: BTreeSet<String>,
}

impl ArchiveBundle {
    /// Builds `<top_dir>_logs.tgz` holding every file as `<top_dir>/<relative path>`
    ///
    /// # Errors
    ///
    /// Returns an `Archive` error if the archive cannot be written
    pub async fn build(scratch_root: &Path, top_dir: &str, files: &[SourceFile]) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("seqferry-archive-")
            .tempdir_in(scratch_root)
            .map_err(|e| {
                SeqferryError::Archive(format!(
                    "Cannot create archive directory in {}: {}",
                    scratch_root.display(),
                    e
                ))
            })?;
        let path = dir.path().join(format!("{top_dir}_logs.tgz"));

        let entries: Vec<(PathBuf, String)> = files
            .iter()
            .map(|file| {
                let name = format!("{top_dir}/{}", member_path(file.relative_path()));
                (file.path().to_path_buf(), name)
            })
            .collect();
        let members: BTreeSet<String> = entries.iter().map(|(_, name)| name.clone()).collect();

        let target = path.clone();
        tokio::task::spawn_blocking(move || write_archive(&target, &entries))
            .await
            .map_err(|e| SeqferryError::Archive(format!("archive task failed: {e}")))?
            .map_err(|e| SeqferryError::Archive(format!("Cannot write {}: {}", path.display(), e)))?;

        tracing::debug!(archive = %path.display(), members = members.len(), "Built archive");
        Ok(Self {
            _dir: dir,
            path,
            members,
        })
    }

    /// Archive location on the local filesystem
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Archive file name
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Member names the archive was built from
    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    /// Checks that the archive holds exactly the expected members
    ///
    /// # Errors
    ///
    /// Returns an `Archive` error naming the first missing or unexpected
    /// member
    pub async fn verify(&self) -> Result<()> {
        let path = self.path.clone();
        let actual = tokio::task::spawn_blocking(move || list_members(&path))
            .await
            .map_err(|e| SeqferryError::Archive(format!("archive task failed: {e}")))?
            .map_err(|e| {
                SeqferryError::Archive(format!("Cannot read {}: {}", self.path.display(), e))
            })?;

        if let Some(missing) = self.members.difference(&actual).next() {
            return Err(SeqferryError::Archive(format!(
                "{} is missing member {}",
                self.file_name(),
                missing
            )));
        }
        if let Some(extra) = actual.difference(&self.members).next() {
            return Err(SeqferryError::Archive(format!(
                "{} has unexpected member {}",
                self.file_name(),
                extra
            )));
        }
        Ok(())
    }
}

/// Member names of a `.tar.gz`
pub fn list_members(path: &Path) -> std::io::Result<BTreeSet<String>> {
    let mut archive = tar::Archive::new(GzDecoder::new(File::open(path)?));
    let mut names = BTreeSet::new();
    for entry in archive.entries()? {
        let entry = entry?;
        names.insert(member_path(&entry.path()?));
    }
    Ok(names)
}

fn write_archive(target: &Path, entries: &[(PathBuf, String)]) -> std::io::Result<()> {
    let encoder = GzEncoder::new(File::create(target)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(true);
    for (source, name) in entries {
        builder.append_path_with_name(source, name)?;
    }
    builder.into_inner()?.finish()?.sync_all()
}

/// Relative path with `/` separators
fn member_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
