//! The JSON manifest emitted at the end of a generation run (spec §4.F
//! "Manifest" stage): every input consulted and every output written (or,
//! on `--dry-run`, that would have been written), so a build system can
//! wire up its own dependency tracking without re-invoking the generator.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    pub inputs: Vec<PathBuf>,
    pub outputs: Vec<PathBuf>,
}

/// Which of the two list formats §6 (`--list-format {json,json-pretty}`)
/// and §4.D ("Two list formats: compact and pretty; both are
/// round-trippable") asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Json,
    JsonPretty,
}

impl ListFormat {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "json" => Some(ListFormat::Json),
            "json-pretty" => Some(ListFormat::JsonPretty),
            _ => None,
        }
    }
}

impl Manifest {
    /// Serializes in `format`; both outputs are round-trippable via
    /// [`Manifest::from_json`] since they differ only in whitespace.
    pub fn to_json(&self, format: ListFormat) -> String {
        match format {
            ListFormat::Json => serde_json::to_string(self).expect("Manifest contains only serializable path data"),
            ListFormat::JsonPretty => serde_json::to_string_pretty(self).expect("Manifest contains only serializable path data"),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_and_pretty_round_trip_to_the_same_manifest() {
        let manifest = Manifest { inputs: vec![PathBuf::from("a.dsdl")], outputs: vec![PathBuf::from("a.h"), PathBuf::from("_nunavut/serialization.h")] };
        let compact = Manifest::from_json(&manifest.to_json(ListFormat::Json)).unwrap();
        let pretty = Manifest::from_json(&manifest.to_json(ListFormat::JsonPretty)).unwrap();
        assert_eq!(compact, manifest);
        assert_eq!(pretty, manifest);
    }

    #[test]
    fn list_format_parses_known_tags_only() {
        assert_eq!(ListFormat::parse("json"), Some(ListFormat::Json));
        assert_eq!(ListFormat::parse("json-pretty"), Some(ListFormat::JsonPretty));
        assert_eq!(ListFormat::parse("yaml"), None);
    }
}
