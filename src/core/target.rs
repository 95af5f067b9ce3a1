//! Build targets and per-target build log entries.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The kind of target reported by the package metadata.
///
/// Only the five recognized kinds map onto a build invocation; anything else
/// the metadata can report (`proc-macro`, `custom-build`, ...) is carried
/// through as [`TargetKind::Other`] and skipped at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Lib,
    Test,
    Bench,
    Bin,
    Example,
    #[serde(untagged)]
    Other(String),
}

impl TargetKind {
    /// Parse a kind string as reported by the metadata query.
    pub fn from_metadata(kind: &str) -> Self {
        match kind {
            "lib" => TargetKind::Lib,
            "test" => TargetKind::Test,
            "bench" => TargetKind::Bench,
            "bin" => TargetKind::Bin,
            "example" => TargetKind::Example,
            other => TargetKind::Other(other.to_string()),
        }
    }

    /// The kind string, as used in log file names.
    pub fn as_str(&self) -> &str {
        match self {
            TargetKind::Lib => "lib",
            TargetKind::Test => "test",
            TargetKind::Bench => "bench",
            TargetKind::Bin => "bin",
            TargetKind::Example => "example",
            TargetKind::Other(s) => s,
        }
    }

    /// Whether this kind maps onto a build invocation.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, TargetKind::Other(_))
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One independently buildable unit within a package.
///
/// Immutable once resolved from the package metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Target name.
    pub name: String,

    /// Target kind.
    pub kind: TargetKind,

    /// On-disk locator of the owning package, passed to `-p`.
    pub spec: String,

    /// Name of the owning package.
    pub package: String,
}

impl Target {
    /// The `<name>.<kind>` identifier used in build logs.
    pub fn log_name(&self) -> String {
        format!("{}.{}", self.name, self.kind)
    }

    /// The per-target build log path inside the corpus directory.
    pub fn build_log_path(&self, corpus_dir: &Path) -> PathBuf {
        corpus_dir.join(format!("{}.build.log", self.log_name()))
    }
}

/// The result of one attempted target build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLogEntry {
    /// Whether the build invocation succeeded.
    pub success: bool,

    /// Path to the captured build log. The file only exists if a build was
    /// actually attempted.
    pub build_log: PathBuf,

    /// `<target name>.<kind>`. Unique within a package, not globally.
    pub name: String,
}

/// The aggregate build log across all packages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildLog {
    pub targets: Vec<BuildLogEntry>,
}

impl BuildLog {
    /// Number of attempted target builds.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether any targets were attempted.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of successful target builds.
    pub fn successes(&self) -> usize {
        self.targets.iter().filter(|t| t.success).count()
    }
}

/// Mapping from package name to its targets, in metadata order.
pub type PackageMap = BTreeMap<String, Vec<Target>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_metadata() {
        assert_eq!(TargetKind::from_metadata("lib"), TargetKind::Lib);
        assert_eq!(TargetKind::from_metadata("bin"), TargetKind::Bin);
        assert_eq!(
            TargetKind::from_metadata("proc-macro"),
            TargetKind::Other("proc-macro".to_string())
        );
        assert!(!TargetKind::from_metadata("custom-build").is_recognized());
    }

    #[test]
    fn test_log_name_and_path() {
        let target = Target {
            name: "mypkg".to_string(),
            kind: TargetKind::Lib,
            spec: "/home/u/mypkg".to_string(),
            package: "mypkg".to_string(),
        };

        assert_eq!(target.log_name(), "mypkg.lib");
        assert_eq!(
            target.build_log_path(Path::new("/corpus")),
            Path::new("/corpus/mypkg.lib.build.log")
        );
    }

    #[test]
    fn test_build_log_counts() {
        let log = BuildLog {
            targets: vec![
                BuildLogEntry {
                    success: true,
                    build_log: PathBuf::from("/corpus/a.lib.build.log"),
                    name: "a.lib".to_string(),
                },
                BuildLogEntry {
                    success: false,
                    build_log: PathBuf::from("/corpus/x.bin.build.log"),
                    name: "x.bin".to_string(),
                },
            ],
        };

        assert_eq!(log.len(), 2);
        assert_eq!(log.successes(), 1);
    }
}
