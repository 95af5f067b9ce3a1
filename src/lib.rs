//! Bitharvest - build orchestration and LLVM bitcode extraction for Cargo
//! source trees.
//!
//! This crate provides the core library functionality: resolving a source
//! tree's packages and targets, scheduling isolated per-package builds with
//! bounded parallelism, and harvesting the emitted bitcode into a corpus
//! directory with a manifest.

pub mod builder;
pub mod core;
pub mod corpus;
pub mod sources;
pub mod util;

pub use crate::core::{
    metadata::packages_or_empty, BuildLog, BuildLogEntry, MetadataError, PackageId, PackageMap,
    Target, TargetKind,
};

pub use builder::{build_all_targets, BuildOptions};
pub use corpus::{CorpusDir, CorpusManifest};
