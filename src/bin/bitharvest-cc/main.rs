//! Compiler wrapper that archives the sources of every compilation.
//!
//! Drop-in replacement for the C/C++ compiler driver: for each recognized
//! source file in the invocation it saves a copy (`<output>.<stem>.source`)
//! and its preprocessed form (`<output>.<stem>.preprocessed_source`) next
//! to the normal output, then performs the real compilation unmodified.
//! Arguments are passed through verbatim, so this is deliberately not a
//! clap CLI.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;

use bitharvest::util::ProcessBuilder;

const RECOGNIZED_SOURCE_EXTENSIONS: &[&str] = &[".c", ".cc", ".cpp", ".cxx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    C,
    Cxx,
}

impl Mode {
    fn compiler(self) -> &'static str {
        match self {
            Mode::C => "clang",
            Mode::Cxx => "clang++",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct ParsedInvocation {
    output: String,
    output_index: usize,
    sources: Vec<String>,
    mode: Mode,
}

/// Locate the output path and recognized source files in a compiler
/// argument list. `argv0` is the name this wrapper was invoked as; a `++`
/// suffix selects C++ mode.
///
/// Returns `None` when no `-o <path>` pair is present, in which case the
/// caller falls through to a plain compilation with no archival.
fn parse_invocation(argv0: &str, args: &[String]) -> Option<ParsedInvocation> {
    let output_index = args.iter().position(|a| a == "-o")? + 1;
    let output = args.get(output_index)?.clone();

    let sources = args
        .iter()
        .filter(|arg| {
            RECOGNIZED_SOURCE_EXTENSIONS
                .iter()
                .any(|ext| arg.ends_with(ext))
        })
        .cloned()
        .collect();

    let mode = if argv0.ends_with("++") {
        Mode::Cxx
    } else {
        Mode::C
    };

    Some(ParsedInvocation {
        output,
        output_index,
        sources,
        mode,
    })
}

fn run_compiler(mode: Mode, args: &[String]) -> Result<ExitCode> {
    let status = ProcessBuilder::new(mode.compiler()).args(args).status()?;
    Ok(ExitCode::from(status.code().unwrap_or(1) as u8))
}

/// The stem of a source file name, up to its first dot.
fn source_stem(source: &str) -> String {
    Path::new(source)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Run just the preprocessor, writing to `<output>.<stem>.preprocessed_source`.
fn save_preprocessed_source(parsed: &ParsedInvocation, args: &[String], stem: &str) -> Result<()> {
    let mut preprocess_args = args.to_vec();
    preprocess_args[parsed.output_index] = format!("{}.{}.preprocessed_source", parsed.output, stem);
    preprocess_args.push("-E".to_string());

    ProcessBuilder::new(parsed.mode.compiler())
        .args(&preprocess_args)
        .status()?;
    Ok(())
}

/// Archive every recognized source file and its preprocessed form.
fn save_sources(parsed: &ParsedInvocation, args: &[String]) {
    for source in &parsed.sources {
        let stem = source_stem(source);
        let copy_path = format!("{}.{}.source", parsed.output, stem);

        // Archival failure must not break the real compilation.
        if let Err(e) = std::fs::copy(source, &copy_path) {
            eprintln!("bitharvest-cc: warning: failed to save {}: {}", source, e);
            continue;
        }
        if let Err(e) = save_preprocessed_source(parsed, args, &stem) {
            eprintln!(
                "bitharvest-cc: warning: failed to preprocess {}: {:#}",
                source, e
            );
        }
    }
}

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();
    let argv0 = argv.first().map(String::as_str).unwrap_or("bitharvest-cc");
    let args = &argv[1..];

    let fallback_mode = if argv0.ends_with("++") { Mode::Cxx } else { Mode::C };

    let parsed = match parse_invocation(argv0, args) {
        Some(parsed) => parsed,
        None => {
            // No output path found; compile unmodified with no archival.
            return run_compiler(fallback_mode, args).unwrap_or_else(|e| {
                eprintln!("bitharvest-cc: error: {:#}", e);
                ExitCode::FAILURE
            });
        }
    };

    save_sources(&parsed, args);

    run_compiler(parsed.mode, args).unwrap_or_else(|e| {
        eprintln!("bitharvest-cc: error: {:#}", e);
        ExitCode::FAILURE
    })
}
