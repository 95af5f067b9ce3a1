//! The shared corpus directory.
//!
//! Every package task extracts into the same corpus directory. Bitcode
//! copies land on disjoint relative paths by construction (one build
//! directory per package), so the only mutation that needs coordination is
//! the manifest read-union-write, guarded by a mutex on this handle.

pub mod extract;
pub mod manifest;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;

use crate::util::fs::ensure_dir;

pub use extract::{copy_bitcode, discover_bitcode, extract_ir};
pub use manifest::{CorpusManifest, MANIFEST_FILE_NAME};

/// Handle to a corpus directory, shared across package tasks.
#[derive(Debug)]
pub struct CorpusDir {
    root: PathBuf,
    manifest_lock: Mutex<()>,
}

impl CorpusDir {
    /// Open (creating if needed) a corpus directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(CorpusDir {
            root,
            manifest_lock: Mutex::new(()),
        })
    }

    /// The corpus directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Union a set of extracted modules into the on-disk manifest.
    pub fn record_modules(&self, modules: &[String], label: &str) -> Result<()> {
        let _guard = self.manifest_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut manifest = CorpusManifest::load(&self.root)?.unwrap_or_default();
        if !label.is_empty() {
            manifest.label = label.to_string();
        }
        manifest.merge_modules(modules.iter().cloned());
        manifest.save(&self.root)
    }
}
