//! Analysis publishing
//!
//! - [`orchestrator`] - the [`AnalysisPublisher`] state machine
//! - [`result`] - mergeable `(seen, processed, errors)` counters
//! - [`summary`] - end-of-run reporting
//! - [`marker`] - the completion marker that makes reruns no-ops

pub mod marker;
pub mod orchestrator;
pub mod result;
pub mod summary;

pub use marker::{marker_exists, read_marker, write_marker, PublishMarker};
pub use orchestrator::{AnalysisPublisher, PublishRequest};
pub use result::PublishResult;
pub use summary::{PublishOutcome, PublishSummary};
