//! Run log archiving
//!
//! [`LogArchiver`] collects a run folder's log tree into a verified
//! `.tar.gz` [`ArchiveBundle`] and publishes it as one object.

pub mod archiver;
pub mod bundle;

pub use archiver::LogArchiver;
pub use bundle::{list_members, ArchiveBundle};
