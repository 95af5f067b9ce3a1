//! Manifest resolution via the package manager's metadata query.
//!
//! Runs `cargo metadata --no-deps` in a source tree and normalizes the
//! output into a package → targets mapping. Resolution failures carry an
//! explicit error kind; orchestration callers use [`packages_or_empty`] to
//! degrade any failure into "nothing to build" instead of halting.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::core::package_id::{PackageId, PackageIdError};
use crate::core::target::{PackageMap, Target, TargetKind};
use crate::util::ProcessBuilder;

/// Errors produced while resolving a source tree's package metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to run `{command}`: {source}")]
    Invocation {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("`{command}` exited unsuccessfully:\n{stderr}")]
    QueryFailed { command: String, stderr: String },

    #[error("failed to parse metadata output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    PackageId(#[from] PackageIdError),

    #[error("package `{0}` reported a target with no kind")]
    MissingKind(String),
}

#[derive(Debug, Deserialize)]
struct MetadataOutput {
    packages: Vec<MetadataPackage>,
}

#[derive(Debug, Deserialize)]
struct MetadataPackage {
    name: String,
    id: String,
    targets: Vec<MetadataTarget>,
}

#[derive(Debug, Deserialize)]
struct MetadataTarget {
    name: String,
    kind: Vec<String>,
}

/// Query a source tree for its buildable packages and targets.
///
/// `cargo_program` is the build tool to invoke (normally `cargo`). Target
/// order within each package follows the metadata output.
pub fn query_packages(cargo_program: &Path, source_dir: &Path) -> Result<PackageMap, MetadataError> {
    let cmd = ProcessBuilder::new(cargo_program)
        .args(["metadata", "--no-deps", "--format-version", "1"])
        .cwd(source_dir);

    let output = cmd.exec().map_err(|e| MetadataError::Invocation {
        command: cmd.display_command(),
        source: e,
    })?;

    if !output.status.success() {
        return Err(MetadataError::QueryFailed {
            command: cmd.display_command(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    parse_packages(&String::from_utf8_lossy(&output.stdout))
}

/// Parse a metadata JSON document into a package map.
pub fn parse_packages(json: &str) -> Result<PackageMap, MetadataError> {
    let metadata: MetadataOutput = serde_json::from_str(json)?;

    let mut packages = PackageMap::new();
    for package in metadata.packages {
        let id: PackageId = package.id.parse()?;
        let spec = id.locator().display().to_string();

        let mut targets = Vec::with_capacity(package.targets.len());
        for target in package.targets {
            let kind = target
                .kind
                .first()
                .ok_or_else(|| MetadataError::MissingKind(package.name.clone()))?;

            targets.push(Target {
                name: target.name,
                kind: TargetKind::from_metadata(kind),
                spec: spec.clone(),
                package: package.name.clone(),
            });
        }
        packages.insert(package.name, targets);
    }

    Ok(packages)
}

/// Resolve packages, degrading any failure to an empty map.
///
/// The pipeline proceeds with zero packages rather than halting; the error
/// kind is preserved in the warning for debugging.
pub fn packages_or_empty(cargo_program: &Path, source_dir: &Path) -> PackageMap {
    match query_packages(cargo_program, source_dir) {
        Ok(packages) => packages,
        Err(e) => {
            tracing::warn!(
                "could not resolve package metadata in {}: {}",
                source_dir.display(),
                e
            );
            PackageMap::new()
        }
    }
}
