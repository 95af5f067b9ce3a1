//! Package identifier parsing.
//!
//! `cargo metadata` reports each package id as an opaque string of the shape
//! `<name> <version> (<source-kind>+<scheme>://<path>)`, for example
//! `mypkg 0.1.0 (path+file:///home/u/mypkg)`. The build invocation needs the
//! on-disk locator (`/home/u/mypkg`) out of that string, so we parse the full
//! grammar instead of slicing at fixed offsets.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use semver::Version;
use thiserror::Error;

/// Errors produced while parsing a package identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackageIdError {
    #[error("package id `{0}` has no `(source)` section")]
    MissingSource(String),

    #[error("package id `{0}` has no version segment")]
    MissingVersion(String),

    #[error("package id `{0}` has an invalid version: {1}")]
    InvalidVersion(String, String),

    #[error("package id `{0}` has a malformed source `{1}` (expected `<kind>+<scheme>://<path>`)")]
    MalformedSource(String, String),
}

/// A parsed package identifier.
///
/// Only the `path+file` source kind has been observed in practice; the parser
/// accepts any `<kind>+<scheme>` pair so other source kinds at least parse
/// into something inspectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageId {
    name: String,
    version: Version,
    source_kind: String,
    scheme: String,
    locator: PathBuf,
}

impl PackageId {
    /// Package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Source kind tag, e.g. `path`.
    pub fn source_kind(&self) -> &str {
        &self.source_kind
    }

    /// URL scheme, e.g. `file`.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The on-disk locator for the package, e.g. `/home/u/mypkg`.
    pub fn locator(&self) -> &Path {
        &self.locator
    }
}

impl FromStr for PackageId {
    type Err = PackageIdError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let (head, tail) = id
            .split_once('(')
            .ok_or_else(|| PackageIdError::MissingSource(id.to_string()))?;

        let source = tail
            .strip_suffix(')')
            .ok_or_else(|| PackageIdError::MissingSource(id.to_string()))?;

        let mut head_parts = head.split_whitespace();
        let name = head_parts
            .next()
            .ok_or_else(|| PackageIdError::MissingVersion(id.to_string()))?;
        let version_str = head_parts
            .next()
            .ok_or_else(|| PackageIdError::MissingVersion(id.to_string()))?;
        let version = Version::parse(version_str)
            .map_err(|e| PackageIdError::InvalidVersion(id.to_string(), e.to_string()))?;

        let (source_kind, url) = source
            .split_once('+')
            .ok_or_else(|| PackageIdError::MalformedSource(id.to_string(), source.to_string()))?;
        let (scheme, path) = url
            .split_once("://")
            .ok_or_else(|| PackageIdError::MalformedSource(id.to_string(), source.to_string()))?;

        if source_kind.is_empty() || scheme.is_empty() || path.is_empty() {
            return Err(PackageIdError::MalformedSource(
                id.to_string(),
                source.to_string(),
            ));
        }

        Ok(PackageId {
            name: name.to_string(),
            version,
            source_kind: source_kind.to_string(),
            scheme: scheme.to_string(),
            locator: PathBuf::from(path),
        })
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}+{}://{})",
            self.name,
            self.version,
            self.source_kind,
            self.scheme,
            self.locator.display()
        )
    }
}
