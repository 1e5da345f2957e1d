//! Staging transformer
//!
//! Copies a batch of files into a scratch directory, renames them with the
//! analysis prefix and compresses text formats. A batch is all-or-nothing:
//! if any step fails, or the batch runs past its timeout, the batch
//! directory is removed and a single `Staging` error is returned.

pub mod steps;

use crate::config::schema::StagingConfig;
use crate::domain::analysis::AnalysisContext;
use crate::domain::errors::SeqferryError;
use crate::domain::source_file::SourceFile;
use crate::domain::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use steps::{CompressAnnotation, CompressSequenceText, StagingStep, StepContext};

/// Ordered staging pipeline
pub struct StagingTransformer {
    steps: Vec<Box<dyn StagingStep>>,
    timeout: Duration,
}

impl StagingTransformer {
    /// Standard pipeline: copy, then compress FASTA, then compress GFF
    pub fn new(config: &StagingConfig) -> Self {
        Self::with_steps(
            vec![
                Box::new(steps::Copy::new(config.bandwidth_limit_kbps)),
                Box::new(CompressSequenceText),
                Box::new(CompressAnnotation),
            ],
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Custom pipeline
    pub fn with_steps(steps: Vec<Box<dyn StagingStep>>, timeout: Duration) -> Self {
        Self { steps, timeout }
    }

    /// Names of the steps in order
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Stages `files` into `batch_dir`
    ///
    /// On success the returned paths correspond 1:1, in order, with
    /// `files`.
    ///
    /// # Errors
    ///
    /// Returns a `Staging` error carrying the last line of the failing
    /// step's diagnostic; `batch_dir` has been removed by then.
    pub async fn stage(
        &self,
        batch_dir: &Path,
        files: &[SourceFile],
        context: &AnalysisContext,
    ) -> Result<Vec<PathBuf>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let ctx = StepContext {
            batch_dir: batch_dir.to_path_buf(),
            prefix: context.staging_prefix(),
        };

        let outcome = match tokio::time::timeout(self.timeout, self.run_batch(files, &ctx)).await {
            Ok(result) => result,
            Err(_) => Err(SeqferryError::Staging(format!(
                "staging timed out after {:?}",
                self.timeout
            ))),
        };

        match outcome {
            Ok(staged) => {
                tracing::debug!(
                    batch = %batch_dir.display(),
                    files = staged.len(),
                    "Staged batch"
                );
                Ok(staged)
            }
            Err(e) => {
                discard_batch(batch_dir).await;
                Err(SeqferryError::Staging(last_line(&e.to_string())))
            }
        }
    }

    async fn run_batch(&self, files: &[SourceFile], ctx: &StepContext) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(&ctx.batch_dir).await.map_err(|e| {
            SeqferryError::Staging(format!(
                "cannot create {}: {}",
                ctx.batch_dir.display(),
                e
            ))
        })?;

        let mut staged = Vec::with_capacity(files.len());
        for file in files {
            let mut current = file.path().to_path_buf();
            for step in &self.steps {
                current = step.apply(&current, ctx).await.map_err(|e| {
                    SeqferryError::Staging(format!(
                        "{} step failed on {}\n{}",
                        step.name(),
                        file.base_name(),
                        e
                    ))
                })?;
            }
            staged.push(current);
        }
        Ok(staged)
    }
}

async fn discard_batch(batch_dir: &Path) {
    match tokio::fs::remove_dir_all(batch_dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(batch = %batch_dir.display(), error = %e, "Failed to remove staged batch");
        }
    }
}

/// Last non-empty line of a diagnostic
fn last_line(message: &str) -> String {
    message
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or(message)
        .to_string()
}
