//! Generation driver (spec §4): wires the CLI surface, the configuration
//! store, the namespace resolver, the template environment, the support
//! emitter and the post-processor chain into one pipeline, and exposes the
//! dependency analyzer that backs both `--dry-run` and `--list-outputs`.

pub mod analyzer;
pub mod cli;
pub mod manifest;
pub mod pipeline;

use diagnostics::Diagnostic;
use nunavut::dsdl::FrontEnd;

pub use cli::CliArgs;
pub use manifest::Manifest;
pub use pipeline::GenerationOutcome;

/// The single entry point both `nnvg` and any embedding caller use:
/// parses nothing itself, just runs the pipeline against an already-parsed
/// [`CliArgs`] and a caller-supplied DSDL front end.
pub fn generate(args: &CliArgs, front_end: &dyn FrontEnd) -> Result<GenerationOutcome, Vec<Diagnostic>> {
    pipeline::run(args, front_end)
}
