//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Bitharvest - build Cargo source trees and harvest their LLVM bitcode
#[derive(Parser)]
#[command(name = "bitharvest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build every package in a source tree and extract its bitcode
    Build(BuildArgs),

    /// List the buildable packages and targets of a source tree
    List(ListArgs),

    /// Download and install a tar source archive
    Fetch(FetchArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Source tree to build
    #[arg(long)]
    pub source_dir: PathBuf,

    /// Base path for per-package build directories
    #[arg(long)]
    pub build_dir: PathBuf,

    /// Corpus directory receiving bitcode, logs, and the manifest
    #[arg(long)]
    pub corpus_dir: PathBuf,

    /// CPU reservation per package task (defaults to all hardware threads)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Extra environment overrides for build invocations
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Delete each package's build directory after extraction
    #[arg(long)]
    pub cleanup: bool,

    /// Kill a build invocation after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Build tool to invoke instead of `cargo`
    #[arg(long, value_name = "PATH")]
    pub cargo: Option<PathBuf>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Source tree to inspect
    #[arg(long)]
    pub source_dir: PathBuf,

    /// Build tool to invoke instead of `cargo`
    #[arg(long, value_name = "PATH")]
    pub cargo: Option<PathBuf>,
}

#[derive(Args)]
pub struct FetchArgs {
    /// URL of a .tar.gz source archive
    pub url: String,

    /// Directory to install the source tree under
    #[arg(long)]
    pub base_dir: PathBuf,

    /// Name for the installed source directory
    #[arg(long)]
    pub name: String,
}
