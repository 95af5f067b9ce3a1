//! The corpus manifest.
//!
//! A corpus directory carries a single `corpus_description.json` listing
//! every extracted module (relative path, `.bc` suffix stripped). Each
//! extraction invocation unions its modules into the on-disk state, so the
//! manifest reflects every package extracted into the directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Manifest file name inside a corpus directory.
pub const MANIFEST_FILE_NAME: &str = "corpus_description.json";

/// Persisted description of a corpus directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusManifest {
    /// Sorted relative module paths, without the `.bc` suffix.
    pub modules: Vec<String>,

    /// Optional source label; empty when none was supplied.
    #[serde(default)]
    pub label: String,
}

impl CorpusManifest {
    /// Path of the manifest file inside `corpus_dir`.
    pub fn path_in(corpus_dir: &Path) -> PathBuf {
        corpus_dir.join(MANIFEST_FILE_NAME)
    }

    /// Load the manifest from a corpus directory, if present.
    pub fn load(corpus_dir: &Path) -> Result<Option<Self>> {
        let path = Self::path_in(corpus_dir);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;
        let manifest = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))?;
        Ok(Some(manifest))
    }

    /// Write the manifest into a corpus directory.
    pub fn save(&self, corpus_dir: &Path) -> Result<()> {
        let path = Self::path_in(corpus_dir);
        let contents = serde_json::to_string_pretty(self)
            .context("failed to serialize corpus manifest")?;
        fs::write(&path, contents)
            .with_context(|| format!("failed to write manifest: {}", path.display()))
    }

    /// Union a set of modules into this manifest, keeping the list sorted
    /// and free of duplicates.
    pub fn merge_modules<I, S>(&mut self, modules: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules.extend(modules.into_iter().map(Into::into));
        self.modules.sort();
        self.modules.dedup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_merge_modules_sorted_dedup() {
        let mut manifest = CorpusManifest::default();
        manifest.merge_modules(["debug/deps/b", "debug/deps/a"]);
        manifest.merge_modules(["debug/deps/a", "debug/deps/c"]);

        assert_eq!(
            manifest.modules,
            ["debug/deps/a", "debug/deps/b", "debug/deps/c"]
        );
    }

    #[test]
    fn test_save_load_roundtrip() {
        let tmp = TempDir::new().unwrap();

        let mut manifest = CorpusManifest {
            modules: vec![],
            label: "spack".to_string(),
        };
        manifest.merge_modules(["debug/deps/foo"]);
        manifest.save(tmp.path()).unwrap();

        let loaded = CorpusManifest::load(tmp.path()).unwrap().unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn test_load_missing_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(CorpusManifest::load(tmp.path()).unwrap().is_none());
    }
}
