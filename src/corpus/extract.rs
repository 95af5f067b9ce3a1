//! IR artifact extraction.
//!
//! Scans a package's build output tree for bitcode files, copies them into
//! the corpus directory preserving their relative layout, and records the
//! extracted modules in the corpus manifest. Extraction is idempotent per
//! build directory: re-running it yields the same relative-path set and
//! overwrites prior copies in place.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::corpus::CorpusDir;
use crate::util::fs::{ensure_dir, relative_path};

/// File extension of IR artifacts.
const BITCODE_EXTENSION: &str = "bc";

/// Discover bitcode files under a build directory.
///
/// Returns paths relative to `build_dir`, sorted for deterministic manifest
/// content.
pub fn discover_bitcode(build_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut relative = Vec::new();

    for entry in WalkDir::new(build_dir) {
        let entry = entry.with_context(|| {
            format!("failed to walk build directory: {}", build_dir.display())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().is_some_and(|e| e == BITCODE_EXTENSION) {
            relative.push(relative_path(build_dir, entry.path()));
        }
    }

    relative.sort();
    Ok(relative)
}

/// Copy discovered bitcode files into the corpus directory, preserving
/// their relative layout.
pub fn copy_bitcode(relative: &[PathBuf], build_dir: &Path, corpus_dir: &Path) -> Result<()> {
    for rel in relative {
        let src = build_dir.join(rel);
        let dst = corpus_dir.join(rel);
        if let Some(parent) = dst.parent() {
            ensure_dir(parent)?;
        }
        fs::copy(&src, &dst)
            .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;
    }
    Ok(())
}

/// Extract all IR artifacts from a build directory into the corpus.
///
/// Returns the relative paths copied in this invocation. Filesystem failures
/// propagate: a corpus silently missing artifacts is worse than a failed
/// package task.
pub fn extract_ir(corpus: &CorpusDir, build_dir: &Path, label: &str) -> Result<Vec<PathBuf>> {
    let relative = discover_bitcode(build_dir)?;
    tracing::info!(
        "extracting {} bitcode file(s) from {}",
        relative.len(),
        build_dir.display()
    );

    copy_bitcode(&relative, build_dir, corpus.root())?;

    let modules: Vec<String> = relative
        .iter()
        .map(|rel| {
            rel.with_extension("")
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    corpus.record_modules(&modules, label)?;

    Ok(relative)
}
