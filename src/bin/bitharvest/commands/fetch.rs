//! `bitharvest fetch` command

use anyhow::{Context, Result};

use crate::cli::FetchArgs;
use bitharvest::sources::download_source_code;

pub fn execute(args: FetchArgs) -> Result<()> {
    download_source_code(&args.url, &args.base_dir, &args.name)
        .with_context(|| format!("failed to fetch source archive from {}", args.url))?;

    eprintln!(
        "    Installed {}",
        args.base_dir.join(&args.name).display()
    );
    Ok(())
}
