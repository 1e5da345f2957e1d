//! Staging steps
//!
//! Each step takes the current path of a file in the batch directory and
//! returns its path after the step. Steps that do not apply to a file
//! return the path unchanged.

use crate::domain::errors::SeqferryError;
use crate::domain::Result;
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const COPY_CHUNK_BYTES: usize = 64 * 1024;

/// Where a batch is being staged
#[derive(Debug, Clone)]
pub struct StepContext {
    /// Batch output directory
    pub batch_dir: PathBuf,
    /// Prefix prepended to staged file names
    pub prefix: String,
}

/// One transform applied to every file of a batch, in order
#[async_trait]
pub trait StagingStep: Send + Sync {
    /// Step name used in logs and diagnostics
    fn name(&self) -> &'static str;

    /// Applies the step and returns the file's new path
    ///
    /// # Errors
    ///
    /// Returns an error if the step fails; the whole batch is then
    /// discarded.
    async fn apply(&self, current: &Path, ctx: &StepContext) -> Result<PathBuf>;
}

/// Copies the source into the batch directory under its prefixed name
///
/// Symlinks are followed. The copy rate is capped at
/// `bandwidth_limit_kbps` KiB/s; zero means unlimited.
#[derive(Debug, Clone)]
pub struct Copy {
    bandwidth_limit_kbps: u64,
}

impl Copy {
    pub fn new(bandwidth_limit_kbps: u64) -> Self {
        Self {
            bandwidth_limit_kbps,
        }
    }
}

#[async_trait]
impl StagingStep for Copy {
    fn name(&self) -> &'static str {
        "copy"
    }

    async fn apply(&self, current: &Path, ctx: &StepContext) -> Result<PathBuf> {
        let base_name = current
            .file_name()
            .ok_or_else(|| SeqferryError::Staging(format!("{} has no file name", current.display())))?
            .to_string_lossy();
        let target = ctx.batch_dir.join(format!("{}{}", ctx.prefix, base_name));

        let copied = throttled_copy(current, &target, self.bandwidth_limit_kbps)
            .await
            .map_err(|e| {
                SeqferryError::Staging(format!(
                    "copy {} -> {} failed\n{}",
                    current.display(),
                    target.display(),
                    e
                ))
            })?;

        tracing::trace!(
            source = %current.display(),
            target = %target.display(),
            bytes = copied,
            "Copied file"
        );
        Ok(target)
    }
}

async fn throttled_copy(source: &Path, target: &Path, limit_kbps: u64) -> std::io::Result<u64> {
    let mut reader = tokio::fs::File::open(source).await?;
    let mut writer = tokio::fs::File::create(target).await?;
    let mut buffer = vec![0u8; COPY_CHUNK_BYTES];
    let bytes_per_sec = limit_kbps.saturating_mul(1024);
    let started = Instant::now();
    let mut copied: u64 = 0;

    loop {
        let n = reader.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buffer[..n]).await?;
        copied += n as u64;

        if bytes_per_sec > 0 {
            let due = Duration::from_secs_f64(copied as f64 / bytes_per_sec as f64);
            let elapsed = started.elapsed();
            if due > elapsed {
                tokio::time::sleep(due - elapsed).await;
            }
        }
    }

    writer.flush().await?;
    Ok(copied)
}

/// Gzips `.fasta` files to `.fasta.gz`
#[derive(Debug, Clone, Default)]
pub struct CompressSequenceText;

#[async_trait]
impl StagingStep for CompressSequenceText {
    fn name(&self) -> &'static str {
        "compress-sequence-text"
    }

    async fn apply(&self, current: &Path, _ctx: &StepContext) -> Result<PathBuf> {
        gzip_if_suffix(current, ".fasta").await
    }
}

/// Gzips `.gff` files to `.gff.gz`
#[derive(Debug, Clone, Default)]
pub struct CompressAnnotation;

#[async_trait]
impl StagingStep for CompressAnnotation {
    fn name(&self) -> &'static str {
        "compress-annotation"
    }

    async fn apply(&self, current: &Path, _ctx: &StepContext) -> Result<PathBuf> {
        gzip_if_suffix(current, ".gff").await
    }
}

/// Raises its flag when dropped
///
/// Blocking compression is not aborted when the batch timeout drops the
/// step future; it polls this flag between chunks and stops instead.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Replaces `path` with `path.gz` when its name ends with `suffix`
async fn gzip_if_suffix(path: &Path, suffix: &str) -> Result<PathBuf> {
    let applies = path
        .file_name()
        .map(|name| name.to_string_lossy().ends_with(suffix))
        .unwrap_or(false);
    if !applies {
        return Ok(path.to_path_buf());
    }

    let source = path.to_path_buf();
    let mut target = source.clone().into_os_string();
    target.push(".gz");
    let target = PathBuf::from(target);

    let cancelled = Arc::new(AtomicBool::new(false));
    let _cancel = CancelOnDrop(cancelled.clone());
    let output = target.clone();
    tokio::task::spawn_blocking(move || gzip_file(&source, &output, &cancelled))
        .await
        .map_err(|e| SeqferryError::Staging(format!("compression task failed: {e}")))?
        .map_err(|e| {
            SeqferryError::Staging(format!("gzip {} failed\n{}", path.display(), e))
        })?;

    Ok(target)
}

/// Gzips `source` into `target` and removes `source`
///
/// On failure or cancellation `target` is removed and `source` is kept.
fn gzip_file(source: &Path, target: &Path, cancelled: &AtomicBool) -> std::io::Result<()> {
    if let Err(e) = compress_into(source, target, cancelled) {
        if let Err(cleanup) = std::fs::remove_file(target) {
            if cleanup.kind() != ErrorKind::NotFound {
                tracing::warn!(
                    path = %target.display(),
                    error = %cleanup,
                    "Failed to remove partial output"
                );
            }
        }
        return Err(e);
    }
    std::fs::remove_file(source)
}

fn compress_into(source: &Path, target: &Path, cancelled: &AtomicBool) -> std::io::Result<()> {
    let mut input = std::fs::File::open(source)?;
    let mut encoder = GzEncoder::new(std::fs::File::create(target)?, Compression::default());
    let mut buffer = vec![0u8; COPY_CHUNK_BYTES];

    loop {
        if cancelled.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(ErrorKind::Interrupted, "staging cancelled"));
        }
        let n = input.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        encoder.write_all(&buffer[..n])?;
    }

    encoder.finish()?.sync_all()
}
