//! Support-library emitter (spec §4.G): writes the one bit-level
//! serialization runtime header a target language needs, once per output
//! root, idempotently — re-running generation with unchanged inputs must
//! not touch the file's mtime (spec §8 P2).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use diagnostics::Diagnostic;
use nunavut::LanguageId;

const C_SOURCE: &str = include_str!("assets/c/serialization.h");
const CPP_SOURCE: &str = include_str!("assets/cpp/serialization.hpp");

/// When the generation driver decides whether to emit the support library
/// at all (spec §3.2 "generate_support": "only, never, as-needed").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateSupportPolicy {
    /// Emit only the support library; skip every composite (used to
    /// refresh a vendored runtime without touching generated types).
    Only,
    Never,
    /// Emit it if and only if at least one planned output actually
    /// `#include`s it.
    AsNeeded,
}

impl GenerateSupportPolicy {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "only" => Some(GenerateSupportPolicy::Only),
            "never" => Some(GenerateSupportPolicy::Never),
            "as-needed" => Some(GenerateSupportPolicy::AsNeeded),
            _ => None,
        }
    }
}

fn source_for(language_id: LanguageId) -> &'static str {
    match language_id {
        LanguageId::C => C_SOURCE,
        LanguageId::Cpp => CPP_SOURCE,
    }
}

/// Path, relative to an output root, that the support header is written to
/// and `#include`d from.
pub fn support_relative_path(language_id: LanguageId) -> &'static str {
    match language_id {
        LanguageId::C => "_nunavut/serialization.h",
        LanguageId::Cpp => "_nunavut/serialization.hpp",
    }
}

/// Writes the support header for `language_id` under `output_root` unless
/// it's already there with identical content, and returns the path written
/// (relative to `output_root`) either way.
pub fn emit(language_id: LanguageId, output_root: &Path) -> Result<PathBuf, Diagnostic> {
    let relative = support_relative_path(language_id);
    let full_path = output_root.join(relative);
    let source = source_for(language_id);

    if let Ok(existing) = fs::read_to_string(&full_path) {
        if existing == source {
            return Ok(PathBuf::from(relative));
        }
    }

    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let parent = full_path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(source.as_bytes())?;
    tmp.persist(&full_path).map_err(|e| Diagnostic::from(e.error))?;

    Ok(PathBuf::from(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_c_support_header_under_output_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = emit(LanguageId::C, dir.path()).unwrap();
        assert_eq!(path, PathBuf::from("_nunavut/serialization.h"));
        assert!(dir.path().join(&path).exists());
    }

    #[test]
    fn re_emitting_unchanged_source_does_not_bump_mtime() {
        let dir = tempfile::tempdir().unwrap();
        emit(LanguageId::Cpp, dir.path()).unwrap();
        let full_path = dir.path().join(support_relative_path(LanguageId::Cpp));
        let before = fs::metadata(&full_path).unwrap().modified().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        emit(LanguageId::Cpp, dir.path()).unwrap();
        let after = fs::metadata(&full_path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn policy_parses_known_tags_only() {
        assert_eq!(GenerateSupportPolicy::parse("as-needed"), Some(GenerateSupportPolicy::AsNeeded));
        assert_eq!(GenerateSupportPolicy::parse("sometimes"), None);
    }
}
