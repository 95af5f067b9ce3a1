//! Build orchestration.
//!
//! One package task per discovered package, fanned out onto a bounded
//! worker pool; within a package, targets build sequentially because they
//! share a build-output cache.

pub mod executor;
pub mod package;
pub mod scheduler;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub use executor::perform_build;
pub use package::build_package;
pub use scheduler::build_all_targets;

/// Global build parameters, shared by every package task.
///
/// An immutable record: the ambient process environment is never mutated,
/// overrides are applied per-invocation.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// The build tool to invoke. Overridable for toolchain pinning.
    pub cargo_program: PathBuf,

    /// Per-task CPU reservation hint, also passed to the build tool as its
    /// parallelism budget. Advisory, not OS-enforced.
    pub threads: usize,

    /// Extra environment variable overrides; win over the ambient
    /// environment on conflict.
    pub extra_env: BTreeMap<String, String>,

    /// Delete each package's build directory after extraction.
    pub cleanup: bool,

    /// Bounded execution time per build invocation. A timeout becomes a
    /// failed log entry rather than hanging the scheduler.
    pub timeout: Option<Duration>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            cargo_program: PathBuf::from("cargo"),
            threads: default_threads(),
            extra_env: BTreeMap::new(),
            cleanup: false,
            timeout: None,
        }
    }
}

/// Available hardware parallelism on the dispatching host.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
