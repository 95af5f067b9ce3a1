//! Package fan-out and join.
//!
//! One task per package on a dedicated worker pool. Each task reserves
//! `threads` CPUs, so the pool admits `total_cpus / threads` tasks at once;
//! excess packages queue until a reservation frees up. The join collects
//! every package's contribution; a catastrophic failure inside one task
//! (panic, extraction error) is isolated to that package.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::builder::package::build_package;
use crate::builder::{default_threads, BuildOptions};
use crate::core::target::{BuildLog, BuildLogEntry, PackageMap};
use crate::corpus::CorpusDir;

/// The dedicated build directory for one package.
///
/// Derived from the shared base path plus the package name, which keeps
/// build directories disjoint across packages.
pub fn package_build_dir(build_base: &Path, package: &str) -> PathBuf {
    let mut dir = build_base.as_os_str().to_os_string();
    dir.push("-");
    dir.push(package);
    PathBuf::from(dir)
}

/// Build every package's targets and join the per-package logs.
///
/// Always returns an aggregate log, possibly empty or partially populated;
/// failures surface as `success = false` entries or missing package
/// contributions, never as an error from this call.
pub fn build_all_targets(
    source_dir: &Path,
    build_base: &Path,
    corpus: &CorpusDir,
    packages: &PackageMap,
    opts: &BuildOptions,
) -> BuildLog {
    let workers = (default_threads() / opts.threads.max(1)).max(1);
    tracing::info!(
        "scheduling {} package build(s) on {} worker(s), {} thread(s) each",
        packages.len(),
        workers,
        opts.threads
    );

    let pb = ProgressBar::new(packages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let run_one = |(package, targets): (&String, &Vec<_>)| -> Vec<BuildLogEntry> {
        let build_dir = package_build_dir(build_base, package);
        let result = catch_unwind(AssertUnwindSafe(|| {
            build_package(source_dir, &build_dir, corpus, targets, opts)
        }));
        pb.inc(1);

        match result {
            Ok(Ok(entries)) => entries,
            Ok(Err(e)) => {
                tracing::error!("package {} failed: {:#}", package, e);
                Vec::new()
            }
            Err(_) => {
                tracing::error!("package {} build task panicked", package);
                Vec::new()
            }
        }
    };

    let results: Vec<Vec<BuildLogEntry>> = match rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
    {
        Ok(pool) => pool.install(|| packages.par_iter().map(run_one).collect()),
        Err(e) => {
            tracing::warn!("could not create worker pool ({}), building serially", e);
            packages.iter().map(run_one).collect()
        }
    };

    pb.finish_and_clear();

    BuildLog {
        targets: results.concat(),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::target::{Target, TargetKind};
    use crate::corpus::CorpusManifest;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn target(name: &str, kind: TargetKind, package: &str) -> Target {
        Target {
            name: name.to_string(),
            kind,
            spec: format!("/src/{}", package),
            package: package.to_string(),
        }
    }

    /// A build tool that fails for `--bin x`, succeeds otherwise, and drops
    /// a bitcode file named after the build directory so per-package
    /// extraction sets stay disjoint.
    fn fake_cargo(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-cargo");
        let script = "#!/bin/sh\n\
                      case \"$*\" in *\"--bin x\"*) exit 1;; esac\n\
                      mkdir -p \"$CARGO_TARGET_DIR/debug/deps\"\n\
                      touch \"$CARGO_TARGET_DIR/debug/deps/$(basename \"$CARGO_TARGET_DIR\").bc\"\n\
                      exit 0\n";
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_package_build_dir_disjoint() {
        let base = Path::new("/tmp/build");
        assert_eq!(package_build_dir(base, "a"), Path::new("/tmp/build-a"));
        assert_eq!(package_build_dir(base, "b"), Path::new("/tmp/build-b"));
    }

    #[test]
    fn test_two_package_scenario() {
        let tmp = TempDir::new().unwrap();
        let corpus = CorpusDir::new(tmp.path().join("corpus")).unwrap();
        let build_base = tmp.path().join("build");

        let mut packages = PackageMap::new();
        packages.insert(
            "a".to_string(),
            vec![
                target("a", TargetKind::Lib, "a"),
                target("x", TargetKind::Bin, "a"),
            ],
        );
        packages.insert(
            "b".to_string(),
            vec![target("y", TargetKind::Test, "b")],
        );

        let opts = BuildOptions {
            cargo_program: fake_cargo(tmp.path()),
            cleanup: true,
            ..BuildOptions::default()
        };
        let log = build_all_targets(tmp.path(), &build_base, &corpus, &packages, &opts);

        // Aggregate length equals the total target count.
        assert_eq!(log.len(), 3);

        // Within-package order is preserved; packages themselves are
        // unordered, so look entries up by name.
        let by_name = |name: &str| log.targets.iter().find(|e| e.name == name).unwrap();
        assert!(by_name("a.lib").success);
        assert!(!by_name("x.bin").success);
        assert!(by_name("y.test").success);

        let a_lib = log.targets.iter().position(|e| e.name == "a.lib").unwrap();
        let x_bin = log.targets.iter().position(|e| e.name == "x.bin").unwrap();
        assert!(a_lib < x_bin);

        // Extraction ran once per package, into disjoint relative paths.
        let manifest = CorpusManifest::load(corpus.root()).unwrap().unwrap();
        assert_eq!(manifest.modules, ["debug/deps/build-a", "debug/deps/build-b"]);
        assert!(corpus.root().join("debug/deps/build-a.bc").exists());
        assert!(corpus.root().join("debug/deps/build-b.bc").exists());

        // Cleanup removed exactly the two package build directories.
        assert!(!package_build_dir(&build_base, "a").exists());
        assert!(!package_build_dir(&build_base, "b").exists());
    }

    #[test]
    fn test_failed_task_is_isolated() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let corpus = CorpusDir::new(tmp.path().join("corpus")).unwrap();
        let build_base = tmp.path().join("build");

        // For package `bad` the tool never creates a build directory, so
        // extraction fails; `good` proceeds normally.
        let cargo = tmp.path().join("fake-cargo");
        let script = "#!/bin/sh\n\
                      case \"$*\" in *\"/src/bad\"*) exit 0;; esac\n\
                      mkdir -p \"$CARGO_TARGET_DIR/debug/deps\"\n\
                      touch \"$CARGO_TARGET_DIR/debug/deps/good.bc\"\n\
                      exit 0\n";
        fs::write(&cargo, script).unwrap();
        fs::set_permissions(&cargo, fs::Permissions::from_mode(0o755)).unwrap();

        let mut packages = PackageMap::new();
        packages.insert("bad".to_string(), vec![target("bad", TargetKind::Lib, "bad")]);
        packages.insert(
            "good".to_string(),
            vec![target("good", TargetKind::Lib, "good")],
        );

        let opts = BuildOptions {
            cargo_program: cargo,
            ..BuildOptions::default()
        };
        let log = build_all_targets(tmp.path(), &build_base, &corpus, &packages, &opts);

        // The failed package contributes nothing; the join still completes
        // and the healthy package's results survive.
        assert_eq!(log.len(), 1);
        assert_eq!(log.targets[0].name, "good.lib");
        assert!(log.targets[0].success);
    }

    #[test]
    fn test_empty_package_map() {
        let tmp = TempDir::new().unwrap();
        let corpus = CorpusDir::new(tmp.path().join("corpus")).unwrap();

        let log = build_all_targets(
            tmp.path(),
            &tmp.path().join("build"),
            &corpus,
            &PackageMap::new(),
            &BuildOptions::default(),
        );

        assert!(log.is_empty());
    }
}
