//! Publish counters
//!
//! [`PublishResult`] is a plain value: each step returns one and the caller
//! merges it into its running total.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// `(files_seen, files_processed, errors)` for one or more files
///
/// `files_processed <= files_seen` always holds for results built through
/// the constructors below.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    pub files_seen: usize,
    pub files_processed: usize,
    pub errors: usize,
}

impl PublishResult {
    /// Creates a result from raw counts
    pub fn new(files_seen: usize, files_processed: usize, errors: usize) -> Self {
        debug_assert!(files_processed <= files_seen);
        Self {
            files_seen,
            files_processed,
            errors,
        }
    }

    /// One file published
    pub fn published() -> Self {
        Self::new(1, 1, 0)
    }

    /// One file failed
    pub fn failed() -> Self {
        Self::new(1, 0, 1)
    }

    /// One file skipped without error (no registry record)
    pub fn skipped() -> Self {
        Self::new(1, 0, 0)
    }

    /// `files` seen but none published, counted as a single error
    pub fn failed_batch(files: usize) -> Self {
        Self::new(files, 0, 1)
    }

    /// `files` seen and each one failed
    pub fn failed_files(files: usize) -> Self {
        Self::new(files, 0, files)
    }

    /// Adds another result into this one
    pub fn merge(&mut self, other: PublishResult) {
        self.files_seen += other.files_seen;
        self.files_processed += other.files_processed;
        self.errors += other.errors;
    }

    /// Every file seen was processed and nothing failed
    pub fn is_complete(&self) -> bool {
        self.files_processed == self.files_seen && self.errors == 0
    }

    /// At least one file was published and nothing was left behind
    pub fn is_fully_published(&self) -> bool {
        self.files_processed > 0 && self.is_complete()
    }

    /// Whether this outcome earns the completion marker
    pub fn qualifies_for_marker(&self) -> bool {
        self.files_processed > 1 && self.is_complete()
    }

    /// Success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.files_seen == 0 {
            return 100.0;
        }
        (self.files_processed as f64 / self.files_seen as f64) * 100.0
    }
}

impl Add for PublishResult {
    type Output = PublishResult;

    fn add(mut self, rhs: PublishResult) -> PublishResult {
        self.merge(rhs);
        self
    }
}

impl AddAssign for PublishResult {
    fn add_assign(&mut self, rhs: PublishResult) {
        self.merge(rhs);
    }
}

impl std::iter::Sum for PublishResult {
    fn sum<I: Iterator<Item = PublishResult>>(iter: I) -> Self {
        iter.fold(PublishResult::default(), Add::add)
    }
}

impl std::fmt::Display for PublishResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "seen={} processed={} errors={}",
            self.files_seen, self.files_processed, self.errors
        )
    }
}
