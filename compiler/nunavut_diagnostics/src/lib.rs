//! The generator's error taxonomy (see spec §7) realized as real types, plus a
//! small sink (`Diagnostician`) for phases that accumulate more than one
//! diagnostic before reporting (validation-shaped phases) instead of bailing
//! on the first error.

use std::path::PathBuf;

/// Coarse category a `Diagnostic` belongs to, used to pick a CLI exit code
/// (spec §6: "non-zero with stable error categories for {config, parse,
/// resolve, render, postprocess, io}").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCategory {
    Config,
    Parse,
    Resolve,
    Render,
    Postprocess,
    Io,
}

#[derive(thiserror::Error, Debug)]
pub enum Diagnostic {
    #[error("configuration layer could not be parsed: {source_path}: {message}")]
    ConfigParse { source_path: String, message: String },

    #[error("configuration path '{path}' has no value")]
    ConfigMissing { path: String },

    #[error("configuration path '{path}' is not a {expected}")]
    ConfigType { path: String, expected: &'static str },

    #[error("unknown target language '{tag}'")]
    UnknownLanguage { tag: String },

    #[error("target language '{tag}' is experimental and --include-experimental-languages was not passed")]
    ExperimentalLanguageNotEnabled { tag: String },

    #[error("language '{tag}' does not support standard '{standard}'")]
    UnsupportedStandard { tag: String, standard: String },

    #[error("DSDL parse error in {path}: {message}")]
    DsdlParse { path: String, message: String },

    #[error("unresolved dependency: {full_name} referenced from {referrer}")]
    MissingDependency { full_name: String, referrer: String },

    #[error("name collision in namespace '{namespace}': '{name}' is used more than once")]
    NameCollision { namespace: String, name: String },

    #[error("template error in '{template}'{}: {message}", line.map(|l| format!(" line {l}")).unwrap_or_default())]
    TemplateError { template: String, line: Option<usize>, message: String },

    #[error("buffer too small: need {needed_bits} bits at offset {offset_bit}, have {available_bits}")]
    BufferTooSmall { offset_bit: usize, needed_bits: usize, available_bits: usize },

    #[error("invalid union tag {tag}: option count is {option_count}")]
    InvalidTag { tag: u64, option_count: usize },

    #[error("bad delimiter header: claims {claimed_bytes} bytes but only {remaining_bytes} remain")]
    BadDelimiterHeader { claimed_bytes: u64, remaining_bytes: usize },

    #[error("post-processor '{processor}' failed on {path}: {message}")]
    PostProcessorError { processor: String, path: String, message: String },

    #[error("I/O error{}: {source}", path.as_ref().map(|p| format!(" ({})", p.display())).unwrap_or_default())]
    Io { path: Option<PathBuf>, #[source] source: std::io::Error },

    #[error("{0}")]
    ParamError(String),
}

impl Diagnostic {
    pub fn param_error(message: impl Into<String>) -> Self {
        Diagnostic::ParamError(message.into())
    }

    pub fn io_read_error(path: &str, source: &std::io::Error) -> Self {
        Diagnostic::Io { path: Some(PathBuf::from(path)), source: std::io::Error::new(source.kind(), source.to_string()) }
    }

    pub fn name_collision(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Diagnostic::NameCollision { namespace: namespace.into(), name: name.into() }
    }

    pub fn missing_dependency(full_name: impl Into<String>, referrer: impl Into<String>) -> Self {
        Diagnostic::MissingDependency { full_name: full_name.into(), referrer: referrer.into() }
    }

    /// The exit-code bucket this diagnostic belongs to (spec §6).
    pub fn category(&self) -> ExitCategory {
        match self {
            Diagnostic::ConfigParse { .. }
            | Diagnostic::ConfigMissing { .. }
            | Diagnostic::ConfigType { .. }
            | Diagnostic::UnknownLanguage { .. }
            | Diagnostic::ExperimentalLanguageNotEnabled { .. }
            | Diagnostic::UnsupportedStandard { .. }
            | Diagnostic::ParamError(_) => ExitCategory::Config,
            Diagnostic::DsdlParse { .. } => ExitCategory::Parse,
            Diagnostic::MissingDependency { .. } | Diagnostic::NameCollision { .. } => ExitCategory::Resolve,
            Diagnostic::TemplateError { .. }
            | Diagnostic::BufferTooSmall { .. }
            | Diagnostic::InvalidTag { .. }
            | Diagnostic::BadDelimiterHeader { .. } => ExitCategory::Render,
            Diagnostic::PostProcessorError { .. } => ExitCategory::Postprocess,
            Diagnostic::Io { .. } => ExitCategory::Io,
        }
    }

    /// Stable, non-zero process exit code for this diagnostic's category.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ExitCategory::Config => 1,
            ExitCategory::Parse => 2,
            ExitCategory::Resolve => 3,
            ExitCategory::Render => 4,
            ExitCategory::Postprocess => 5,
            ExitCategory::Io => 6,
        }
    }
}

impl From<std::io::Error> for Diagnostic {
    fn from(source: std::io::Error) -> Self {
        Diagnostic::Io { path: None, source }
    }
}

impl From<serde_json::Error> for Diagnostic {
    fn from(err: serde_json::Error) -> Self {
        Diagnostic::ConfigParse { source_path: "<json>".into(), message: err.to_string() }
    }
}

impl From<regex::Error> for Diagnostic {
    fn from(err: regex::Error) -> Self {
        Diagnostic::ParamError(format!("invalid regular expression: {err}"))
    }
}

impl From<serde_yaml::Error> for Diagnostic {
    fn from(err: serde_yaml::Error) -> Self {
        Diagnostic::ConfigParse { source_path: "<yaml>".into(), message: err.to_string() }
    }
}

impl From<handlebars::RenderError> for Diagnostic {
    fn from(err: handlebars::RenderError) -> Self {
        let template = err.template_name.clone().unwrap_or_else(|| "<handlebars>".to_string());
        let line = err.line_no;
        Diagnostic::TemplateError { template, line, message: err.to_string() }
    }
}

/// Accumulates diagnostics for a phase that wants to report everything it
/// finds (e.g. validation) instead of stopping at the first error, and also
/// offers a `Diagnostician::default()` / `null_diagnostician()` pair so test
/// code can run the pipeline without caring where diagnostics end up.
#[derive(Default)]
pub struct Diagnostician {
    sink: Option<std::sync::Mutex<Vec<Diagnostic>>>,
}

impl Diagnostician {
    /// A diagnostician that records everything handed to it.
    pub fn recording() -> Self {
        Diagnostician { sink: Some(std::sync::Mutex::new(Vec::new())) }
    }

    /// A diagnostician that discards everything handed to it (useful in
    /// tests that only care about the `Result` returned by the pipeline).
    pub fn null_diagnostician() -> Self {
        Diagnostician { sink: None }
    }

    pub fn handle(&self, diagnostics: Vec<Diagnostic>) {
        if let Some(sink) = &self.sink {
            sink.lock().unwrap().extend(diagnostics);
        }
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        self.handle(vec![diagnostic]);
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        self.sink.as_ref().map(|s| std::mem::take(&mut s.lock().unwrap())).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.sink.as_ref().map(|s| s.lock().unwrap().is_empty()).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable_per_category() {
        assert_eq!(Diagnostic::ConfigMissing { path: "a.b".into() }.exit_code(), 1);
        assert_eq!(Diagnostic::MissingDependency { full_name: "a".into(), referrer: "b".into() }.exit_code(), 3);
        assert_eq!(Diagnostic::InvalidTag { tag: 9, option_count: 3 }.exit_code(), 4);
    }

    #[test]
    fn recording_diagnostician_accumulates() {
        let d = Diagnostician::recording();
        d.report(Diagnostic::ParamError("one".into()));
        d.report(Diagnostic::ParamError("two".into()));
        assert_eq!(d.take().len(), 2);
        assert!(d.is_empty());
    }

    #[test]
    fn null_diagnostician_discards() {
        let d = Diagnostician::null_diagnostician();
        d.report(Diagnostic::ParamError("ignored".into()));
        assert!(d.is_empty());
    }

    #[test]
    fn yaml_error_becomes_config_parse() {
        let err: serde_yaml::Error = serde_yaml::from_str::<serde_yaml::Value>(":\n  - [").unwrap_err();
        assert!(matches!(Diagnostic::from(err), Diagnostic::ConfigParse { .. }));
    }

    #[test]
    fn handlebars_render_error_becomes_template_error() {
        let err = handlebars::RenderError::new("boom");
        assert!(matches!(Diagnostic::from(err), Diagnostic::TemplateError { .. }));
    }
}
