//! `nnvg` binary entry point (spec §6 CLI surface). Thin by design: parse
//! arguments, configure logging, hand off to [`nunavut_driver::generate`]
//! and translate its result into the stable exit-code contract.
//!
//! A real DSDL grammar parser is a collaborator this crate does not ship
//! (spec §1 "Deliberately out of scope"); until one is wired in, this binary
//! resolves an empty in-memory namespace via [`FixedNamespace`] so the rest
//! of the pipeline — configuration, dependency analysis, support-library
//! emission, post-processing, manifest — is exercisable end to end today,
//! the same way the teacher's own compiler driver separates its `compile()`
//! entry point (testable against an in-memory `Project`) from the thin
//! `main()` that only owns `std::env::args()` and the process exit code.

use std::process::ExitCode;

use clap::Parser;
use nunavut::dsdl::FixedNamespace;
use nunavut_driver::{generate, CliArgs};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.tracing_level())
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let front_end = FixedNamespace::new(Vec::new());
    match generate(&args, &front_end) {
        Ok(outcome) => {
            tracing::info!(wrote = outcome.written.len(), "generation complete");
            ExitCode::SUCCESS
        }
        Err(diagnostics) => {
            for diagnostic in &diagnostics {
                eprintln!("error: {diagnostic}");
            }
            let code = diagnostics.first().map(|d| d.exit_code()).unwrap_or(1);
            ExitCode::from(code.clamp(1, 255) as u8)
        }
    }
}
