//! Per-package build task.
//!
//! Targets within one package share a build-output cache, so they build
//! sequentially; parallelism lives one level up, across packages.

use std::path::Path;

use anyhow::Result;

use crate::builder::executor::perform_build;
use crate::builder::BuildOptions;
use crate::core::target::{BuildLogEntry, Target};
use crate::corpus::{extract_ir, CorpusDir};
use crate::util::fs::remove_dir_all_if_exists;

/// Build every target of one package, then extract its IR artifacts.
///
/// Returns one log entry per target, in resolver order. Build failures are
/// recorded in the entries; extraction failures propagate, since a corpus
/// silently missing artifacts is worse than a failed task.
pub fn build_package(
    source_dir: &Path,
    build_dir: &Path,
    corpus: &CorpusDir,
    targets: &[Target],
    opts: &BuildOptions,
) -> Result<Vec<BuildLogEntry>> {
    let mut build_log = Vec::with_capacity(targets.len());
    for target in targets {
        build_log.push(perform_build(
            source_dir,
            build_dir,
            corpus.root(),
            target,
            opts,
        ));
    }

    extract_ir(corpus, build_dir, "")?;

    if opts.cleanup {
        // Best effort; a leftover build directory is not worth failing over.
        if let Err(e) = remove_dir_all_if_exists(build_dir) {
            tracing::warn!(
                "failed to clean up build directory {}: {:#}",
                build_dir.display(),
                e
            );
        }
    }

    Ok(build_log)
}
