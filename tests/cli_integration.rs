//! CLI integration tests for bitharvest.
//!
//! The build tool is stubbed with a shell script so the full pipeline
//! (resolve, schedule, build, extract, manifest) runs without a real
//! toolchain.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the bitharvest binary command.
fn bitharvest() -> Command {
    Command::cargo_bin("bitharvest").unwrap()
}

const METADATA_JSON: &str = r#"{
  "packages": [
    {
      "name": "demo",
      "id": "demo 0.1.0 (path+file:///src/demo)",
      "targets": [
        {"name": "demo", "kind": ["lib"]},
        {"name": "tool", "kind": ["bin"]},
        {"name": "build-script-build", "kind": ["custom-build"]}
      ]
    }
  ]
}"#;

/// Install a stub build tool that answers the metadata query with a fixture
/// document and drops a bitcode file for every build invocation.
fn stub_cargo(dir: &Path) -> PathBuf {
    let json_path = dir.join("metadata.json");
    fs::write(&json_path, METADATA_JSON).unwrap();

    let path = dir.join("stub-cargo");
    let script = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = metadata ]; then\n\
           cat {}\n\
           exit 0\n\
         fi\n\
         mkdir -p \"$CARGO_TARGET_DIR/debug/deps\"\n\
         printf BC > \"$CARGO_TARGET_DIR/debug/deps/demo.bc\"\n\
         exit 0\n",
        json_path.display()
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_list_resolves_fixture() {
    let tmp = TempDir::new().unwrap();
    let cargo = stub_cargo(tmp.path());

    bitharvest()
        .args(["list", "--source-dir"])
        .arg(tmp.path())
        .arg("--cargo")
        .arg(&cargo)
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"))
        .stdout(predicate::str::contains("tool [bin]"))
        .stdout(predicate::str::contains("build-script-build [custom-build] (skipped)"));
}

#[test]
fn test_list_fails_without_metadata() {
    let tmp = TempDir::new().unwrap();

    bitharvest()
        .args(["list", "--source-dir"])
        .arg(tmp.path())
        .args(["--cargo", "definitely-not-a-real-tool"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to resolve packages"));
}

#[test]
fn test_build_full_pipeline() {
    let tmp = TempDir::new().unwrap();
    let cargo = stub_cargo(tmp.path());
    let corpus_dir = tmp.path().join("corpus");

    bitharvest()
        .args(["build", "--source-dir"])
        .arg(tmp.path())
        .arg("--build-dir")
        .arg(tmp.path().join("build"))
        .arg("--corpus-dir")
        .arg(&corpus_dir)
        .arg("--cargo")
        .arg(&cargo)
        .args(["--threads", "2", "--cleanup"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Finished 2/3 target(s)"));

    // Bitcode landed in the corpus, relative layout preserved.
    assert!(corpus_dir.join("debug/deps/demo.bc").exists());

    // Per-target build logs for the attempted kinds only.
    assert!(corpus_dir.join("demo.lib.build.log").exists());
    assert!(corpus_dir.join("tool.bin.build.log").exists());
    assert!(!corpus_dir
        .join("build-script-build.custom-build.build.log")
        .exists());

    // Corpus manifest records the extracted module.
    let manifest = fs::read_to_string(corpus_dir.join("corpus_description.json")).unwrap();
    assert!(manifest.contains("debug/deps/demo"));

    // Aggregate build log includes the skipped kind as a failure.
    let build_log = fs::read_to_string(corpus_dir.join("build.log.json")).unwrap();
    assert!(build_log.contains("demo.lib"));
    assert!(build_log.contains("build-script-build.custom-build"));

    // Cleanup removed the per-package build directory.
    assert!(!tmp.path().join("build-demo").exists());
}

#[test]
fn test_build_degrades_to_empty() {
    let tmp = TempDir::new().unwrap();

    bitharvest()
        .args(["build", "--source-dir"])
        .arg(tmp.path())
        .arg("--build-dir")
        .arg(tmp.path().join("build"))
        .arg("--corpus-dir")
        .arg(tmp.path().join("corpus"))
        .args(["--cargo", "definitely-not-a-real-tool"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Resolved 0 packages"));
}

#[test]
fn test_build_rejects_malformed_env_override() {
    let tmp = TempDir::new().unwrap();

    bitharvest()
        .args(["build", "--source-dir"])
        .arg(tmp.path())
        .arg("--build-dir")
        .arg(tmp.path().join("build"))
        .arg("--corpus-dir")
        .arg(tmp.path().join("corpus"))
        .args(["--env", "NOVALUE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}
