//! Core data structures for bitharvest.
//!
//! This module contains the foundational types used throughout the pipeline:
//! - Parsed package identifiers
//! - Targets and build log entries
//! - Manifest resolution

pub mod metadata;
pub mod package_id;
pub mod target;

pub use metadata::MetadataError;
pub use package_id::PackageId;
pub use target::{BuildLog, BuildLogEntry, PackageMap, Target, TargetKind};
