//! Source acquisition.
//!
//! Sources bring a buildable tree onto disk before the pipeline runs.
//! Only tar archives are supported.

pub mod tar;

pub use tar::{download_source_code, install_archive, SourceError};
