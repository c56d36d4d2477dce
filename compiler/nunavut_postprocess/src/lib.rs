//! Post-processor chain (spec §4.I): a fixed, declared-order sequence of
//! pure `(path, bytes, config) -> bytes` transforms applied to every
//! rendered file right before it's written. Each processor is individually
//! idempotent; running the whole chain twice over its own output is a
//! no-op (spec §8 P2).

use std::io::Write as _;
use std::path::Path;
use std::process::Command;

use diagnostics::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

/// What the driver configures the chain with (spec §4.I option table).
#[derive(Debug, Clone)]
pub struct PostProcessConfig {
    pub license_header: Option<String>,
    pub line_ending: LineEnding,
    pub external_formatter_command: Option<String>,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        PostProcessConfig { license_header: None, line_ending: LineEnding::Lf, external_formatter_command: None }
    }
}

/// A single named transform in the chain.
pub trait PostProcessor {
    fn name(&self) -> &'static str;
    fn process(&self, path: &Path, content: Vec<u8>, config: &PostProcessConfig) -> Result<Vec<u8>, Diagnostic>;
}

struct LicenseHeader;
impl PostProcessor for LicenseHeader {
    fn name(&self) -> &'static str {
        "license_header"
    }

    fn process(&self, _path: &Path, content: Vec<u8>, config: &PostProcessConfig) -> Result<Vec<u8>, Diagnostic> {
        let Some(header) = &config.license_header else { return Ok(content) };
        if content.starts_with(header.as_bytes()) {
            return Ok(content);
        }
        let mut out = Vec::with_capacity(header.len() + 1 + content.len());
        out.extend_from_slice(header.as_bytes());
        if !header.ends_with('\n') {
            out.push(b'\n');
        }
        out.extend_from_slice(&content);
        Ok(out)
    }
}

struct TrailingNewline;
impl PostProcessor for TrailingNewline {
    fn name(&self) -> &'static str {
        "trailing_newline"
    }

    fn process(&self, _path: &Path, mut content: Vec<u8>, _config: &PostProcessConfig) -> Result<Vec<u8>, Diagnostic> {
        while content.last() == Some(&b'\n') {
            content.pop();
        }
        content.push(b'\n');
        Ok(content)
    }
}

struct NormalizeLineEnding;
impl PostProcessor for NormalizeLineEnding {
    fn name(&self) -> &'static str {
        "line_ending"
    }

    fn process(&self, _path: &Path, content: Vec<u8>, config: &PostProcessConfig) -> Result<Vec<u8>, Diagnostic> {
        let text = String::from_utf8_lossy(&content);
        let normalized = text.replace("\r\n", "\n");
        let out = match config.line_ending {
            LineEnding::Lf => normalized,
            LineEnding::CrLf => normalized.replace('\n', "\r\n"),
        };
        Ok(out.into_bytes())
    }
}

struct ExternalFormatter;
impl PostProcessor for ExternalFormatter {
    fn name(&self) -> &'static str {
        "external_formatter"
    }

    fn process(&self, path: &Path, content: Vec<u8>, config: &PostProcessConfig) -> Result<Vec<u8>, Diagnostic> {
        let Some(command_line) = &config.external_formatter_command else { return Ok(content) };
        let parts = shell_words::split(command_line)
            .map_err(|e| Diagnostic::param_error(format!("external_formatter command '{command_line}' could not be parsed: {e}")))?;
        let Some((program, args)) = parts.split_first() else { return Ok(content) };
        if which::which(program).is_err() {
            // A formatter the operator configured but didn't install is a
            // config error the CLI should surface, not a silent no-op.
            return Err(Diagnostic::param_error(format!("external formatter '{program}' not found on PATH")));
        }

        let mut tmp = tempfile::NamedTempFile::new()
            .map_err(Diagnostic::from)?;
        tmp.write_all(&content).map_err(Diagnostic::from)?;
        let tmp_path = tmp.path().to_path_buf();

        let mut full_args: Vec<String> = args.to_vec();
        full_args.push(tmp_path.display().to_string());
        let status = Command::new(program).args(&full_args).status().map_err(Diagnostic::from)?;
        if !status.success() {
            return Err(Diagnostic::PostProcessorError {
                processor: self.name().to_string(),
                path: path.display().to_string(),
                message: format!("{program} exited with {status}"),
            });
        }

        std::fs::read(&tmp_path).map_err(Diagnostic::from)
    }
}

/// The chain in its fixed, declared order (spec §4.I: "processors run in
/// declared order, always the same order, regardless of configuration").
pub fn default_chain() -> Vec<Box<dyn PostProcessor>> {
    vec![Box::new(LicenseHeader), Box::new(TrailingNewline), Box::new(NormalizeLineEnding), Box::new(ExternalFormatter)]
}

pub fn run_chain(chain: &[Box<dyn PostProcessor>], path: &Path, mut content: Vec<u8>, config: &PostProcessConfig) -> Result<Vec<u8>, Diagnostic> {
    for processor in chain {
        content = processor.process(path, content, config)?;
    }
    Ok(content)
}
