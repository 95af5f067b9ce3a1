//! Single-target build execution.
//!
//! Runs exactly one build invocation per target and converts every failure
//! mode (unrecognized kind, spawn failure, non-zero exit, timeout) into a
//! `success = false` log entry. Nothing escapes this boundary.

use std::path::Path;

use crate::builder::BuildOptions;
use crate::core::target::{BuildLogEntry, Target, TargetKind};
use crate::util::{ExecOutcome, ProcessBuilder};

/// Build one target into the package's build directory.
///
/// Stdout and stderr of the invocation are captured in
/// `<corpus_dir>/<name>.<kind>.build.log`. Unrecognized target kinds are
/// skipped with a warning and create no log file.
pub fn perform_build(
    source_dir: &Path,
    build_dir: &Path,
    corpus_dir: &Path,
    target: &Target,
    opts: &BuildOptions,
) -> BuildLogEntry {
    let log_path = target.build_log_path(corpus_dir);
    let name = target.log_name();

    tracing::info!(
        "building target {} of kind {} from package {}",
        target.name,
        target.kind,
        target.package
    );

    let mut cmd = ProcessBuilder::new(&opts.cargo_program)
        .args(["rustc", "-p"])
        .arg(&target.spec)
        .arg("-j")
        .arg(opts.threads.to_string());

    cmd = match &target.kind {
        TargetKind::Lib => cmd.arg("--lib"),
        TargetKind::Test => cmd.args(["--test", &target.name]),
        TargetKind::Bench => cmd.args(["--bench", &target.name]),
        TargetKind::Bin => cmd.args(["--bin", &target.name]),
        TargetKind::Example => cmd.args(["--example", &target.name]),
        TargetKind::Other(kind) => {
            tracing::warn!(
                "unrecognized target kind `{}` for {}, not building",
                kind,
                target.name
            );
            return BuildLogEntry {
                success: false,
                build_log: log_path,
                name,
            };
        }
    };

    cmd = cmd
        .args(["--", "--emit=llvm-bc"])
        .cwd(source_dir)
        .env("CARGO_TARGET_DIR", build_dir.to_string_lossy())
        .envs(&opts.extra_env);

    let success = match cmd.exec_to_log(&log_path, opts.timeout) {
        Ok(ExecOutcome::Exited(true)) => true,
        Ok(ExecOutcome::Exited(false)) => {
            tracing::warn!("failed to build target {}, see {}", name, log_path.display());
            false
        }
        Ok(ExecOutcome::TimedOut) => {
            tracing::warn!("build of target {} timed out", name);
            false
        }
        Err(e) => {
            tracing::warn!("could not run build for target {}: {:#}", name, e);
            false
        }
    };

    tracing::info!(
        "finished building target {} of kind {} from package {}",
        target.name,
        target.kind,
        target.package
    );

    BuildLogEntry {
        success,
        build_log: log_path,
        name,
    }
}
