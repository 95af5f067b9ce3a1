//! Tar archive source acquisition.
//!
//! Downloads a `.tar.gz` archive, extracts it into a scratch directory, and
//! moves its single top-level directory into place under the requested
//! name. Errors carry their kind so callers can tell a network fault from a
//! malformed archive, even when they ultimately degrade to "skip this
//! source".

use std::fs::File;
use std::io;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;
use tempfile::TempDir;
use thiserror::Error;
use url::Url;

/// Errors produced while acquiring a source archive.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid archive url `{0}`: {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("failed to download {0}: {1}")]
    Download(Url, #[source] reqwest::Error),

    #[error("download of {0} failed: HTTP {1}")]
    HttpStatus(Url, reqwest::StatusCode),

    #[error("failed to unpack archive: {0}")]
    Archive(#[source] io::Error),

    #[error("archive has {0} top-level entries, expected exactly one directory")]
    AmbiguousLayout(usize),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Download an archive and install its contents as `base_dir/<name>`.
pub fn download_source_code(
    archive_url: &str,
    base_dir: &Path,
    source_folder_name: &str,
) -> Result<(), SourceError> {
    let url = Url::parse(archive_url)
        .map_err(|e| SourceError::InvalidUrl(archive_url.to_string(), e))?;

    tracing::info!("downloading source archive from {}", url);

    let download_dir = TempDir::new()?;
    let archive_path = download_dir.path().join("tar-source-download.tar.gz");

    let mut response = reqwest::blocking::get(url.clone())
        .map_err(|e| SourceError::Download(url.clone(), e))?;
    if !response.status().is_success() {
        return Err(SourceError::HttpStatus(url, response.status()));
    }

    let mut archive_file = File::create(&archive_path)?;
    response
        .copy_to(&mut archive_file)
        .map_err(|e| SourceError::Download(url, e))?;
    drop(archive_file);

    install_archive(&archive_path, base_dir, source_folder_name)
}

/// Extract an on-disk archive and move its single top-level directory to
/// `base_dir/<name>`.
///
/// Split out from the download so the unpack-and-rename step is testable
/// without a network.
pub fn install_archive(
    archive_path: &Path,
    base_dir: &Path,
    source_folder_name: &str,
) -> Result<(), SourceError> {
    let scratch = TempDir::new()?;

    let archive_file = File::open(archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(archive_file));
    archive
        .unpack(scratch.path())
        .map_err(SourceError::Archive)?;

    let mut entries: Vec<_> = std::fs::read_dir(scratch.path())?
        .collect::<Result<_, _>>()?;
    if entries.len() != 1 || !entries[0].path().is_dir() {
        return Err(SourceError::AmbiguousLayout(entries.len()));
    }
    let extracted_root = entries.remove(0).path();

    crate::util::fs::ensure_dir(base_dir).map_err(SourceError::Other)?;
    let dest = base_dir.join(source_folder_name);
    crate::util::fs::move_dir(&extracted_root, &dest).map_err(SourceError::Other)?;

    tracing::info!("installed source tree at {}", dest.display());
    Ok(())
}
