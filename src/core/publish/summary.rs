//! Publish summary and reporting

use super::result::PublishResult;
use serde::Serialize;
use std::time::Duration;

/// How a publish run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOutcome {
    /// Marker already present; nothing was done
    AlreadyLoaded,
    /// Everything published and the marker written
    Complete,
    /// Everything published, but too few files to earn the marker
    Unmarked,
    /// Some files were skipped or failed; no marker
    Partial,
    /// Dry run; nothing was written to the store
    DryRun,
}

/// Summary of one analysis publish
#[derive(Debug, Clone, Serialize)]
pub struct PublishSummary {
    /// Analysis identifier
    pub analysis_id: String,

    /// Destination collection (empty when the run was skipped)
    pub destination: String,

    /// Counters
    pub result: PublishResult,

    /// Outcome
    pub outcome: PublishOutcome,

    /// Duration of the run
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl PublishSummary {
    /// Creates a summary
    pub fn new(
        analysis_id: impl Into<String>,
        destination: impl Into<String>,
        result: PublishResult,
        outcome: PublishOutcome,
    ) -> Self {
        Self {
            analysis_id: analysis_id.into(),
            destination: destination.into(),
            result,
            outcome,
            duration: Duration::ZERO,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Check if the run left nothing to retry
    pub fn is_successful(&self) -> bool {
        matches!(
            self.outcome,
            PublishOutcome::AlreadyLoaded
                | PublishOutcome::Complete
                | PublishOutcome::Unmarked
                | PublishOutcome::DryRun
        )
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            analysis_id = %self.analysis_id,
            destination = %self.destination,
            outcome = ?self.outcome,
            files_seen = self.result.files_seen,
            files_processed = self.result.files_processed,
            errors = self.result.errors,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.result.success_rate()),
            "Publish completed"
        );

        if self.outcome == PublishOutcome::Partial {
            tracing::warn!(
                analysis_id = %self.analysis_id,
                unpublished = self.result.files_seen - self.result.files_processed,
                errors = self.result.errors,
                "Publish incomplete; the analysis will be retried on the next run"
            );
        }
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }
}
