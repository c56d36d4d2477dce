//! Command-line surface (spec §6).

use std::path::PathBuf;

use clap::Parser;
use diagnostics::Diagnostic;
use nunavut::LanguageId;
use support::GenerateSupportPolicy;

use crate::manifest::ListFormat;

#[derive(Parser, Debug)]
#[clap(name = "nnvg", about = "Generates source code from DSDL type definitions")]
pub struct CliArgs {
    /// Root directories to search for DSDL namespaces.
    #[clap(long = "root-namespace", required = true)]
    pub roots: Vec<PathBuf>,

    /// Target language, e.g. "c" or "cpp".
    #[clap(short = 't', long = "target-language")]
    pub target_language: String,

    /// Allows generating into languages not yet stabilized.
    #[clap(long)]
    pub include_experimental_languages: bool,

    /// Directory generated files are written under.
    #[clap(short = 'O', long = "outdir", default_value = "nunavut_out")]
    pub outdir: PathBuf,

    /// One or more user configuration files, applied in order after the
    /// built-in defaults and the language sheet.
    #[clap(long = "configuration")]
    pub configuration_files: Vec<PathBuf>,

    /// `path=value` configuration overrides, applied after every file.
    #[clap(long = "set")]
    pub overrides: Vec<String>,

    /// Computes inputs/outputs/manifest without writing any file.
    #[clap(long)]
    pub dry_run: bool,

    /// Whether and when to emit the support library: only, never, as-needed.
    #[clap(long = "generate-support", default_value = "as-needed")]
    pub generate_support: String,

    /// Repeat for more verbose logging (maps to tracing levels).
    #[clap(short, long, parse(from_occurrences))]
    pub verbose: u8,

    /// Prints the list of every input file consulted to stdout.
    #[clap(long)]
    pub list_inputs: bool,

    /// Prints the list of every output file this run writes (or would, under
    /// `--dry-run`) to stdout.
    #[clap(long)]
    pub list_outputs: bool,

    /// Prints the finalized configuration store to stdout.
    #[clap(long)]
    pub list_configuration: bool,

    /// Format for `--list-inputs`/`--list-outputs`/`--list-configuration`.
    #[clap(long = "list-format", default_value = "json-pretty")]
    pub list_format: String,
}

impl CliArgs {
    pub fn language_id(&self) -> Result<LanguageId, Diagnostic> {
        let id = LanguageId::parse(&self.target_language)
            .ok_or_else(|| Diagnostic::UnknownLanguage { tag: self.target_language.clone() })?;
        if id.is_experimental() && !self.include_experimental_languages {
            return Err(Diagnostic::ExperimentalLanguageNotEnabled { tag: self.target_language.clone() });
        }
        Ok(id)
    }

    pub fn generate_support_policy(&self) -> Result<GenerateSupportPolicy, Diagnostic> {
        GenerateSupportPolicy::parse(&self.generate_support)
            .ok_or_else(|| Diagnostic::param_error(format!("unknown --generate-support policy '{}'", self.generate_support)))
    }

    pub fn list_format(&self) -> Result<ListFormat, Diagnostic> {
        ListFormat::parse(&self.list_format).ok_or_else(|| Diagnostic::param_error(format!("unknown --list-format '{}'", self.list_format)))
    }

    pub fn tracing_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
