//! `bitharvest list` command

use anyhow::{Context, Result};

use crate::cli::ListArgs;
use bitharvest::core::metadata::query_packages;
use bitharvest::util::process::find_executable;

pub fn execute(args: ListArgs) -> Result<()> {
    let cargo = args
        .cargo
        .or_else(|| find_executable("cargo"))
        .unwrap_or_else(|| "cargo".into());

    // Listing is a debugging aid, so resolution failures surface here
    // instead of degrading to an empty set.
    let packages = query_packages(&cargo, &args.source_dir).with_context(|| {
        format!(
            "failed to resolve packages in {}",
            args.source_dir.display()
        )
    })?;

    for (package, targets) in &packages {
        println!("{}", package);
        for target in targets {
            let marker = if target.kind.is_recognized() { "" } else { " (skipped)" };
            println!("  {} [{}]{}", target.name, target.kind, marker);
        }
    }

    eprintln!("    Resolved {} package(s)", packages.len());
    Ok(())
}
