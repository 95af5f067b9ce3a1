//! `bitharvest build` command

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::cli::BuildArgs;
use bitharvest::builder::{build_all_targets, default_threads, BuildOptions};
use bitharvest::core::metadata::packages_or_empty;
use bitharvest::corpus::CorpusDir;
use bitharvest::util::process::find_executable;

pub fn execute(args: BuildArgs) -> Result<()> {
    let extra_env = parse_env_overrides(&args.env)?;

    let opts = BuildOptions {
        cargo_program: args
            .cargo
            .or_else(|| find_executable("cargo"))
            .unwrap_or_else(|| "cargo".into()),
        threads: args.threads.unwrap_or_else(default_threads),
        extra_env,
        cleanup: args.cleanup,
        timeout: args.timeout.map(Duration::from_secs),
    };

    let packages = packages_or_empty(&opts.cargo_program, &args.source_dir);
    if packages.is_empty() {
        eprintln!("    Resolved 0 packages, nothing to build");
    }

    let corpus = CorpusDir::new(&args.corpus_dir)?;
    let build_log = build_all_targets(&args.source_dir, &args.build_dir, &corpus, &packages, &opts);

    // Persist the aggregate log next to the corpus manifest.
    let log_path = corpus.root().join("build.log.json");
    let contents =
        serde_json::to_string_pretty(&build_log).context("failed to serialize build log")?;
    std::fs::write(&log_path, contents)
        .with_context(|| format!("failed to write build log: {}", log_path.display()))?;

    eprintln!(
        "    Finished {}/{} target(s) across {} package(s), log at {}",
        build_log.successes(),
        build_log.len(),
        packages.len(),
        log_path.display()
    );

    Ok(())
}

/// Parse `KEY=VALUE` override pairs.
fn parse_env_overrides(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut env = BTreeMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("invalid --env value `{}`, expected KEY=VALUE", pair);
        };
        env.insert(key.to_string(), value.to_string());
    }
    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_overrides() {
        let env = parse_env_overrides(&[
            "RUSTFLAGS=-Cdebuginfo=0".to_string(),
            "CARGO_HOME=/tmp/home".to_string(),
        ])
        .unwrap();

        assert_eq!(env["RUSTFLAGS"], "-Cdebuginfo=0");
        assert_eq!(env["CARGO_HOME"], "/tmp/home");
    }

    #[test]
    fn test_parse_env_overrides_rejects_bare_key() {
        assert!(parse_env_overrides(&["NOVALUE".to_string()]).is_err());
    }
}
