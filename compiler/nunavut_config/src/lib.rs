//! Layered configuration store (spec §4.A): built-in defaults, then one
//! language sheet, then zero or more user-supplied files, then CLI
//! `--set path=value` overrides, each layer able to shadow any key the
//! layers below it set. Lookups always walk layers last-to-first and stop
//! at the first one that defines the path.

use diagnostics::Diagnostic;
use indexmap::IndexMap;

const DEFAULTS_SHEET: &str = include_str!("sheets/defaults.yaml");
const C_SHEET: &str = include_str!("sheets/c.yaml");
const CPP_SHEET: &str = include_str!("sheets/cpp.yaml");

/// The built-in per-language sheet for `language_tag`, if this port ships
/// one (spec §4.A: "one sheet per supported language"). Kept here rather
/// than in `nunavut_driver` so the store has no runtime dependency on
/// install-time data files (SPEC_FULL.md §1.3).
fn builtin_language_sheet(language_tag: &str) -> Option<&'static str> {
    match language_tag {
        "c" => Some(C_SHEET),
        "cpp" | "c++" => Some(CPP_SHEET),
        _ => None,
    }
}

/// A configuration value. Mirrors the shape YAML/JSON can express; kept as
/// our own type rather than `serde_yaml::Value` directly so callers outside
/// this crate don't need to depend on `serde_yaml` just to build overrides.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    fn get_path<'a>(&'a self, segments: &[&str]) -> Option<&'a Value> {
        match segments.split_first() {
            None => Some(self),
            Some((head, rest)) => match self {
                Value::Mapping(map) => map.get(*head).and_then(|v| v.get_path(rest)),
                _ => None,
            },
        }
    }

    fn set_path(&mut self, segments: &[&str], value: Value) {
        match segments.split_first() {
            None => *self = value,
            Some((head, rest)) => {
                if !matches!(self, Value::Mapping(_)) {
                    *self = Value::Mapping(IndexMap::new());
                }
                if let Value::Mapping(map) = self {
                    map.entry(head.to_string()).or_insert_with(|| Value::Mapping(IndexMap::new())).set_path(rest, value);
                }
            }
        }
    }
}

/// Best-effort parse of a CLI `--set` value's right-hand side: `true`/`false`
/// become booleans, a parseable integer or float becomes a number, anything
/// else is kept as a string (spec §6 "CLI override grammar").
fn parse_scalar(raw: &str) -> Value {
    if raw == "true" {
        return Value::Boolean(true);
    }
    if raw == "false" {
        return Value::Boolean(false);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::Float(f);
    }
    Value::String(raw.to_string())
}

/// Merges `overlay` into `base` in place: nested mappings merge key by key;
/// any other value (or a leaf shadowing a mapping, or vice versa) is
/// replaced wholesale, matching the per-path shadowing `ConfigStore::get`
/// already implements.
fn merge_into(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (k, v) in overlay_map {
                match base_map.get_mut(k) {
                    Some(existing) => merge_into(existing, v),
                    None => {
                        base_map.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => *base_slot = overlay_value.clone(),
    }
}

/// One source of configuration: a name for diagnostics and the value tree
/// it contributed.
#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub value: Value,
}

impl Layer {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Layer { name: name.into(), value }
    }

    /// Parses a YAML document into a layer (spec §4.A: language sheets and
    /// user config files are YAML).
    pub fn from_yaml_str(name: impl Into<String>, text: &str) -> Result<Self, Diagnostic> {
        let name = name.into();
        let value: Value = serde_yaml::from_str(text).map_err(|e| Diagnostic::ConfigParse { source_path: name.clone(), message: e.to_string() })?;
        Ok(Layer { name, value })
    }
}

/// An ordered stack of [`Layer`]s. Built-in defaults go in first; each
/// subsequent layer (language sheet, user files in the order given on the
/// command line, then CLI overrides) can shadow any path a previous layer
/// set (spec §4.A: "later layers shadow earlier ones at the leaf level").
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    layers: Vec<Layer>,
}

impl ConfigStore {
    pub fn new() -> Self {
        ConfigStore { layers: Vec::new() }
    }

    /// The lowest two layers of every run (spec §4.A resolution order):
    /// the built-in defaults, then `language_tag`'s built-in sheet if one
    /// ships. Caller pushes user files and `--set` overrides on top.
    pub fn with_builtin_defaults(language_tag: &str) -> Result<Self, Diagnostic> {
        let mut store = ConfigStore::new();
        store.push_layer(Layer::from_yaml_str("<built-in defaults>", DEFAULTS_SHEET)?);
        if let Some(sheet) = builtin_language_sheet(language_tag) {
            store.push_layer(Layer::from_yaml_str(format!("<built-in {language_tag} sheet>"), sheet)?);
        }
        Ok(store)
    }

    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Applies a `path=value` CLI override as a new top layer (spec §6
    /// `--set path=value`).
    pub fn apply_override(&mut self, assignment: &str) -> Result<(), Diagnostic> {
        let (path, raw_value) = assignment
            .split_once('=')
            .ok_or_else(|| Diagnostic::param_error(format!("--set argument '{assignment}' is not of the form path=value")))?;
        let mut root = Value::Mapping(IndexMap::new());
        let segments: Vec<&str> = path.split('.').collect();
        root.set_path(&segments, parse_scalar(raw_value));
        self.layers.push(Layer::new(format!("--set {path}"), root));
        Ok(())
    }

    fn resolve(&self, path: &str) -> Option<&Value> {
        let segments: Vec<&str> = path.split('.').collect();
        self.layers.iter().rev().find_map(|layer| layer.value.get_path(&segments))
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.resolve(path)
    }

    pub fn get_str(&self, path: &str) -> Result<&str, Diagnostic> {
        self.resolve(path)
            .ok_or_else(|| Diagnostic::ConfigMissing { path: path.to_string() })?
            .as_str()
            .ok_or_else(|| Diagnostic::ConfigType { path: path.to_string(), expected: "string" })
    }

    pub fn get_bool(&self, path: &str) -> Result<bool, Diagnostic> {
        self.resolve(path)
            .ok_or_else(|| Diagnostic::ConfigMissing { path: path.to_string() })?
            .as_bool()
            .ok_or_else(|| Diagnostic::ConfigType { path: path.to_string(), expected: "boolean" })
    }

    pub fn get_str_or(&self, path: &str, default: &'static str) -> String {
        self.get_str(path).map(|s| s.to_string()).unwrap_or_else(|_| default.to_string())
    }

    pub fn get_bool_or(&self, path: &str, default: bool) -> bool {
        self.get_bool(path).unwrap_or(default)
    }

    /// The fully merged configuration tree across every layer, later layers
    /// shadowing earlier ones at the leaf level (spec §4.A, and §6's
    /// optional `configuration` manifest key for `--list-configuration`).
    pub fn finalized(&self) -> Value {
        let mut merged = Value::Mapping(IndexMap::new());
        for layer in &self.layers {
            merge_into(&mut merged, &layer.value);
        }
        merged
    }

    /// A snapshot of everything under `prefix` (one level deep), the way a
    /// language implementation reads its whole option block at once rather
    /// than key by key. Preserves declaration order within a layer rather
    /// than sorting keys alphabetically (spec §4.A: "enumeration preserves
    /// declaration order within a layer").
    pub fn section(&self, prefix: &str) -> IndexMap<String, Value> {
        let mut merged = IndexMap::new();
        for layer in &self.layers {
            let segments: Vec<&str> = prefix.split('.').collect();
            if let Some(Value::Mapping(map)) = layer.value.get_path(&segments) {
                for (k, v) in map {
                    merged.insert(k.clone(), v.clone());
                }
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layer_shadows_earlier_one() {
        let mut store = ConfigStore::new();
        store.push_layer(Layer::from_yaml_str("defaults", "nunavut:\n  language: c\n").unwrap());
        store.push_layer(Layer::from_yaml_str("user", "nunavut:\n  language: cpp\n").unwrap());
        assert_eq!(store.get_str("nunavut.language").unwrap(), "cpp");
    }

    #[test]
    fn cli_override_wins_over_every_file_layer() {
        let mut store = ConfigStore::new();
        store.push_layer(Layer::from_yaml_str("defaults", "nunavut:\n  language: c\n").unwrap());
        store.apply_override("nunavut.language=cpp").unwrap();
        assert_eq!(store.get_str("nunavut.language").unwrap(), "cpp");
    }

    #[test]
    fn missing_path_is_config_missing() {
        let store = ConfigStore::new();
        assert!(matches!(store.get_str("nunavut.language"), Err(Diagnostic::ConfigMissing { .. })));
    }

    #[test]
    fn wrong_type_is_config_type() {
        let mut store = ConfigStore::new();
        store.push_layer(Layer::from_yaml_str("defaults", "nunavut:\n  enable_serialization_asserts: yes\n").unwrap());
        assert!(matches!(store.get_str("nunavut.enable_serialization_asserts"), Err(Diagnostic::ConfigType { .. })));
    }

    #[test]
    fn override_parses_booleans_and_integers() {
        let mut store = ConfigStore::new();
        store.apply_override("nunavut.enable_override_variable_array_capacity=true").unwrap();
        store.apply_override("nunavut.max_emit_modulo=4").unwrap();
        assert_eq!(store.get_bool("nunavut.enable_override_variable_array_capacity").unwrap(), true);
        assert_eq!(store.get("nunavut.max_emit_modulo").unwrap().as_i64(), Some(4));
    }

    #[test]
    fn section_merges_across_layers() {
        let mut store = ConfigStore::new();
        store.push_layer(Layer::from_yaml_str("defaults", "nunavut:\n  cpp:\n    std_variant: true\n").unwrap());
        store.push_layer(Layer::from_yaml_str("user", "nunavut:\n  cpp:\n    ctor_convention: implicit\n").unwrap());
        let section = store.section("nunavut.cpp");
        assert_eq!(section.len(), 2);
    }

    #[test]
    fn builtin_defaults_load_the_matching_language_sheet() {
        let store = ConfigStore::with_builtin_defaults("cpp").unwrap();
        assert_eq!(store.get_str("nunavut.language").unwrap(), "cpp");
        assert_eq!(store.get_str("nunavut.cpp.standard").unwrap(), "c++17");
        assert_eq!(store.get_bool("nunavut.enable_serialization_asserts").unwrap(), false);
    }

    #[test]
    fn builtin_defaults_with_unknown_language_tag_still_loads_defaults() {
        let store = ConfigStore::with_builtin_defaults("rust").unwrap();
        assert_eq!(store.get_bool("postprocess.crlf").unwrap(), false);
        assert!(store.get_str("nunavut.language").is_err());
    }

    #[test]
    fn finalized_merges_nested_mappings_across_layers() {
        let mut store = ConfigStore::new();
        store.push_layer(Layer::from_yaml_str("defaults", "nunavut:\n  language: c\n  cpp:\n    std_variant: true\n").unwrap());
        store.push_layer(Layer::from_yaml_str("user", "nunavut:\n  language: cpp\n").unwrap());
        let finalized = store.finalized();
        assert_eq!(finalized.get_path(&["nunavut", "language"]), Some(&Value::String("cpp".to_string())));
        assert_eq!(finalized.get_path(&["nunavut", "cpp", "std_variant"]), Some(&Value::Boolean(true)));
    }

    #[test]
    fn user_layer_can_override_a_builtin_sheet_value() {
        let mut store = ConfigStore::with_builtin_defaults("c").unwrap();
        store.push_layer(Layer::from_yaml_str("user", "nunavut:\n  c:\n    standard: c17\n").unwrap());
        assert_eq!(store.get_str("nunavut.c.standard").unwrap(), "c17");
    }
}
