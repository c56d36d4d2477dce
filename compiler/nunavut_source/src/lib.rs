//! A small abstraction over "a thing that can be loaded as text", shared by
//! the configuration loader, the DSDL front-end collaborator, and the
//! template loader, so none of them has to care whether their input lives on
//! disk or in memory (the latter matters a lot for tests).

use std::path::{Path, PathBuf};

use diagnostics::Diagnostic;

/// What kind of file a [`SourceContainer`] points at. Informs the dependency
/// analyzer (spec §4.D) which bucket a discovered input falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Dsdl,
    Template,
    Config,
    Unknown,
}

impl SourceType {
    pub fn from_extension(ext: Option<&str>) -> Self {
        match ext {
            Some("dsdl") => SourceType::Dsdl,
            Some("hbs" | "tmpl" | "j2") => SourceType::Template,
            Some("yaml" | "yml" | "json") => SourceType::Config,
            _ => SourceType::Unknown,
        }
    }
}

pub struct LoadedSource {
    pub source: String,
    location: String,
}

impl LoadedSource {
    pub fn get_location_str(&self) -> &str {
        &self.location
    }
}

/// Something the generator can read the full text of and identify by a
/// stable location string (a path, or `<memory>` for in-memory fixtures).
pub trait SourceContainer {
    fn load_source(&self) -> Result<LoadedSource, Diagnostic>;
    fn get_location(&self) -> &Path;
    fn get_type(&self) -> SourceType;
}

impl SourceContainer for PathBuf {
    fn load_source(&self) -> Result<LoadedSource, Diagnostic> {
        let source = std::fs::read_to_string(self)
            .map_err(|err| Diagnostic::io_read_error(&self.to_string_lossy(), &err))?;
        Ok(LoadedSource { source, location: self.to_string_lossy().into_owned() })
    }

    fn get_location(&self) -> &Path {
        self.as_path()
    }

    fn get_type(&self) -> SourceType {
        SourceType::from_extension(self.extension().and_then(|it| it.to_str()))
    }
}

/// An in-memory source, used by tests that want to exercise the pipeline
/// without touching the filesystem.
#[derive(Debug, Clone)]
pub struct MemorySource {
    pub name: String,
    pub content: String,
    kind: SourceType,
    path: PathBuf,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, content: impl Into<String>, kind: SourceType) -> Self {
        let name = name.into();
        let path = PathBuf::from(format!("<memory>/{name}"));
        MemorySource { name, content: content.into(), kind, path }
    }
}

impl SourceContainer for MemorySource {
    fn load_source(&self) -> Result<LoadedSource, Diagnostic> {
        Ok(LoadedSource { source: self.content.clone(), location: self.path.to_string_lossy().into_owned() })
    }

    fn get_location(&self) -> &Path {
        &self.path
    }

    fn get_type(&self) -> SourceType {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn path_buf_loads_real_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "hello").unwrap();
        let path = file.path().to_path_buf();
        let loaded = path.load_source().unwrap();
        assert_eq!(loaded.source, "hello");
    }

    #[test]
    fn memory_source_round_trips() {
        let src = MemorySource::new("a.dsdl", "uint8 value", SourceType::Dsdl);
        assert_eq!(src.get_type(), SourceType::Dsdl);
        assert_eq!(src.load_source().unwrap().source, "uint8 value");
    }
}
