//! The generation pipeline (spec §4.F): Configure -> Resolve -> Plan ->
//! Render -> Support -> Post-process -> Manifest. Each stage gets its own
//! tracing span so `-vv` shows where a run spent its time, and which stage
//! a diagnostic came from.
//!
//! Render and Post-process are folded into one loop below rather than two
//! passes over every composite: `postprocess::run_chain` is pure in
//! `(path, bytes, config)`, so running it immediately after a composite's
//! bytes are built is equivalent to collecting all rendered bytes first and
//! post-processing them in a second pass, and needs one fewer allocation
//! per file.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use config::{ConfigStore, Layer};
use diagnostics::Diagnostic;
use nunavut::dsdl::{Composite, CompositeKind, FieldType, FrontEnd, TypeRef};
use nunavut::lang::{for_id, Language};
use nunavut::resolve::{resolve, ResolvedComposite};
use postprocess::{default_chain, run_chain, LineEnding, PostProcessConfig};
use templates::TemplateEnvironment;

use crate::analyzer::DependencyAnalyzer;
use crate::cli::CliArgs;
use crate::manifest::{ListFormat, Manifest};

const FIELD_DECL_TEMPLATE: &str = include_str!("templates/field_decl.hbs");

/// What a successful run produced, for callers that want more than the
/// manifest (the CLI binary just prints the manifest; tests check
/// `written` directly against a temp directory).
pub struct GenerationOutcome {
    pub manifest: Manifest,
    pub written: Vec<std::path::PathBuf>,
}

/// Runs the full pipeline against `args`, reading DSDL types from
/// `front_end` rather than a fixed parser so tests can supply composites
/// built in memory (spec §6 "front end is a collaborator, not a fixed
/// grammar this crate ships").
pub fn run(args: &CliArgs, front_end: &dyn FrontEnd) -> Result<GenerationOutcome, Vec<Diagnostic>> {
    // 1: Configure
    let configure_span = tracing::info_span!("configure").entered();
    let language_id = args.language_id().map_err(|e| vec![e])?;
    let support_policy = args.generate_support_policy().map_err(|e| vec![e])?;

    let mut store = ConfigStore::with_builtin_defaults(&args.target_language).map_err(|e| vec![e])?;
    for path in &args.configuration_files {
        let text = fs::read_to_string(path).map_err(|e| vec![Diagnostic::io_read_error(&path.display().to_string(), &e)])?;
        let layer = Layer::from_yaml_str(path.display().to_string(), &text).map_err(|e| vec![e])?;
        store.push_layer(layer);
    }
    for assignment in &args.overrides {
        store.apply_override(assignment).map_err(|e| vec![e])?;
    }

    let post_config = PostProcessConfig {
        license_header: store.get_str("postprocess.license_header").ok().map(str::to_string),
        line_ending: if store.get_bool_or("postprocess.crlf", false) { LineEnding::CrLf } else { LineEnding::Lf },
        external_formatter_command: store.get_str("postprocess.formatter").ok().map(str::to_string),
    };

    let language: Arc<dyn Language> = Arc::from(for_id(language_id));
    drop(configure_span);

    // 2: Resolve
    let resolve_span = tracing::info_span!("resolve").entered();
    let composites = front_end.read_namespace(&args.roots).map_err(|e| vec![e])?;
    let tree = resolve(composites, Vec::new(), language.as_ref())?;
    drop(resolve_span);

    // 3: Plan
    let plan_span = tracing::info_span!("plan").entered();
    let analyzer = DependencyAnalyzer::new(&tree, language_id, &args.roots, support_policy);
    let manifest = analyzer.manifest(&args.outdir);
    if args.list_inputs || args.list_outputs || args.list_configuration {
        let format = args.list_format().map_err(|e| vec![e])?;
        println!("{}", render_listing(args, &manifest, &store, format));
    }
    if args.dry_run {
        return Ok(GenerationOutcome { manifest, written: Vec::new() });
    }
    let should_emit_support = analyzer
        .outputs()
        .iter()
        .any(|p| p.as_os_str() == std::ffi::OsStr::new(support::support_relative_path(language_id)));
    drop(plan_span);

    // 4 & 5: Render, then Post-process each file as it's produced
    let render_span = tracing::info_span!("render").entered();
    let mut env = TemplateEnvironment::new(language.clone());
    env.register_template("field_decl", FIELD_DECL_TEMPLATE).map_err(|e| vec![e])?;
    let chain = default_chain();

    let mut written = Vec::new();
    if support_policy != support::GenerateSupportPolicy::Only {
        for resolved in tree.all_composites() {
            let rendered = render_composite(language.as_ref(), &env, resolved).map_err(|e| vec![e])?;
            let processed = run_chain(&chain, Path::new(&resolved.output_path), rendered.into_bytes(), &post_config).map_err(|e| vec![e])?;
            let out_path = args.outdir.join(&resolved.output_path);
            write_if_changed(&out_path, &processed).map_err(|e| vec![e])?;
            written.push(out_path);
        }
    }
    drop(render_span);

    // 6: Support
    let support_span = tracing::info_span!("support").entered();
    if should_emit_support {
        let support_path = support::emit(language_id, &args.outdir).map_err(|e| vec![e])?;
        written.push(args.outdir.join(support_path));
    }
    drop(support_span);

    Ok(GenerationOutcome { manifest, written })
}

/// Builds the document `--list-inputs`/`--list-outputs`/`--list-configuration`
/// print (spec §6, §4.D): only the requested keys are present, serialized
/// per `--list-format`.
fn render_listing(args: &CliArgs, manifest: &Manifest, store: &ConfigStore, format: ListFormat) -> String {
    let mut doc = serde_json::Map::new();
    if args.list_inputs {
        doc.insert("inputs".to_string(), serde_json::to_value(&manifest.inputs).expect("paths serialize"));
    }
    if args.list_outputs {
        doc.insert("outputs".to_string(), serde_json::to_value(&manifest.outputs).expect("paths serialize"));
    }
    if args.list_configuration {
        doc.insert("configuration".to_string(), serde_json::to_value(store.finalized()).expect("config values serialize"));
    }
    let value = serde_json::Value::Object(doc);
    match format {
        ListFormat::Json => serde_json::to_string(&value).expect("listing document serializes"),
        ListFormat::JsonPretty => serde_json::to_string_pretty(&value).expect("listing document serializes"),
    }
}

fn field_native_type(language: &dyn Language, ty: &FieldType) -> String {
    let scalar_type = |type_ref: &TypeRef| match type_ref {
        TypeRef::Primitive(p) => language.native_type(p),
        TypeRef::Composite(c) => language.full_reference(&c.full_name, c.version),
    };
    match ty {
        FieldType::Scalar(type_ref) => scalar_type(type_ref),
        FieldType::Array(array) => scalar_type(&array.element),
    }
}

fn render_member_decl(env: &TemplateEnvironment, language: &dyn Language, name: &str, ty: &FieldType) -> Result<String, Diagnostic> {
    let context = serde_json::json!({
        "native_type": field_native_type(language, ty),
        "name": name,
        "array_capacity": ty.array_capacity(),
    });
    Ok(format!("{}\n", env.render("field_decl", &context)?))
}

/// Builds one composite's generated header text. This is a minimal stand-in
/// for the real per-language structure/union templates a complete Nunavut
/// port ships (spec §1 Non-goal: "the DSDL grammar and the concrete
/// per-language templates are not in scope"); what the pipeline actually
/// exercises and must get right is everything around this call (atomic
/// writes, idempotence, post-processing, the manifest).
fn render_composite(language: &dyn Language, env: &TemplateEnvironment, resolved: &ResolvedComposite) -> Result<String, Diagnostic> {
    let composite: &Composite = &resolved.composite;
    let mut out = String::new();

    match language.header_guard(&composite.full_name, composite.version) {
        Some(guard) => out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n")),
        None => out.push_str("#pragma once\n\n"),
    }

    let dependencies = composite.direct_dependencies();
    for dependency in &dependencies {
        out.push_str(&format!("#include \"{}\"\n", language.include_for(dependency)));
    }
    if !dependencies.is_empty() {
        out.push('\n');
    }

    out.push_str(&format!("// {}\n", resolved.full_reference));
    match &composite.kind {
        CompositeKind::Structure { fields } => {
            out.push_str(&format!("struct {} {{\n", resolved.full_reference));
            for field in fields {
                out.push_str(&render_member_decl(env, language, &field.name, &field.ty)?);
            }
            out.push_str("};\n");
        }
        CompositeKind::Union { options } => {
            out.push_str(&format!("struct {} {{\n", resolved.full_reference));
            out.push_str("    uint8_t _tag_;\n");
            out.push_str("    union {\n");
            for option in options {
                out.push_str("    ");
                out.push_str(&render_member_decl(env, language, &option.name, &option.ty)?);
            }
            out.push_str("    };\n");
            out.push_str("};\n");
        }
    }

    if let Some(guard) = language.header_guard(&composite.full_name, composite.version) {
        out.push_str(&format!("\n#endif // {guard}\n"));
    }
    Ok(out)
}

/// Writes `content` to `path` only if it differs from what's already
/// there, atomically via a temp file plus rename (spec §4.F "Render" /
/// §8 P2 "idempotent generation must not touch files it would write
/// identically").
fn write_if_changed(path: &Path, content: &[u8]) -> Result<(), Diagnostic> {
    if let Ok(existing) = fs::read(path) {
        if existing == content {
            return Ok(());
        }
    }
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content)?;
    tmp.persist(path).map_err(|e| Diagnostic::from(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nunavut::dsdl::builder::*;
    use nunavut::dsdl::FixedNamespace;
    use nunavut::lang::LanguageId;

    fn args(outdir: &Path) -> CliArgs {
        CliArgs {
            roots: vec![std::path::PathBuf::from("dsdl")],
            target_language: "c".to_string(),
            include_experimental_languages: false,
            outdir: outdir.to_path_buf(),
            configuration_files: vec![],
            overrides: vec![],
            dry_run: false,
            generate_support: "as-needed".to_string(),
            verbose: 0,
            list_inputs: false,
            list_outputs: false,
            list_configuration: false,
            list_format: "json-pretty".to_string(),
        }
    }

    #[test]
    fn renders_a_structure_and_the_support_library() {
        let dir = tempfile::tempdir().unwrap();
        let composite = sealed_structure("uavcan.primitive.Empty", version(1, 0), vec![field("value", uint(8))], 1);
        let front_end = FixedNamespace::new(vec![composite]);
        let outcome = run(&args(dir.path()), &front_end).expect("pipeline succeeds");
        assert_eq!(outcome.written.len(), 2);
        let header = fs::read_to_string(dir.path().join("uavcan/primitive/Empty_1_0.h")).unwrap();
        assert!(header.contains("uavcan_primitive_Empty_1_0"));
        assert!(fs::metadata(dir.path().join("_nunavut/serialization.h")).is_ok());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let composite = sealed_structure("uavcan.primitive.Empty", version(1, 0), vec![field("value", uint(8))], 1);
        let front_end = FixedNamespace::new(vec![composite]);
        let mut cli = args(dir.path());
        cli.dry_run = true;
        let outcome = run(&cli, &front_end).expect("pipeline succeeds");
        assert!(outcome.written.is_empty());
        assert!(!outcome.manifest.outputs.is_empty());
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn regenerating_unchanged_output_does_not_rewrite_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let composite = sealed_structure("uavcan.primitive.Empty", version(1, 0), vec![field("value", uint(8))], 1);
        let front_end = FixedNamespace::new(vec![composite]);
        let cli = args(dir.path());
        run(&cli, &front_end).unwrap();
        let header_path = dir.path().join("uavcan/primitive/Empty_1_0.h");
        let first_written = fs::metadata(&header_path).unwrap().modified().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        run(&cli, &front_end).unwrap();
        let second_written = fs::metadata(&header_path).unwrap().modified().unwrap();
        assert_eq!(first_written, second_written);
    }

    #[test]
    fn generate_support_only_skips_every_composite_output() {
        let dir = tempfile::tempdir().unwrap();
        let composite = sealed_structure("uavcan.primitive.Empty", version(1, 0), vec![field("value", uint(8))], 1);
        let front_end = FixedNamespace::new(vec![composite]);
        let mut cli = args(dir.path());
        cli.generate_support = "only".to_string();
        let outcome = run(&cli, &front_end).unwrap();
        assert_eq!(outcome.written.len(), 1);
        assert!(fs::metadata(dir.path().join("uavcan/primitive/Empty_1_0.h")).is_err());
    }

    #[test]
    fn listing_includes_only_the_requested_keys() {
        let manifest = Manifest { inputs: vec![std::path::PathBuf::from("a.dsdl")], outputs: vec![std::path::PathBuf::from("a.h")] };
        let store = ConfigStore::new();
        let mut cli = args(Path::new("."));
        cli.list_outputs = true;
        let compact = render_listing(&cli, &manifest, &store, ListFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&compact).unwrap();
        assert!(parsed.get("outputs").is_some());
        assert!(parsed.get("inputs").is_none());
        assert!(parsed.get("configuration").is_none());
    }

    #[test]
    fn unknown_language_fails_in_the_configure_stage() {
        let dir = tempfile::tempdir().unwrap();
        let front_end = FixedNamespace::new(vec![]);
        let mut cli = args(dir.path());
        cli.target_language = "rust".to_string();
        let err = run(&cli, &front_end).unwrap_err();
        assert!(matches!(err[0], Diagnostic::UnknownLanguage { .. }));
    }

    #[test]
    fn s6_dry_run_manifest_matches_the_files_a_real_run_writes() {
        let dir = tempfile::tempdir().unwrap();
        let composite = sealed_structure("uavcan.primitive.Empty", version(1, 0), vec![field("value", uint(8))], 1);
        let front_end = FixedNamespace::new(vec![composite]);

        let mut dry = args(dir.path());
        dry.dry_run = true;
        let dry_outcome = run(&dry, &front_end).unwrap();

        let wet_outcome = run(&args(dir.path()), &front_end).unwrap();

        let mut dry_outputs = dry_outcome.manifest.outputs.clone();
        let mut wet_written = wet_outcome.written.clone();
        dry_outputs.sort();
        wet_written.sort();
        assert_eq!(dry_outputs, wet_written);

        // Running again with identical inputs must reproduce the same file
        // set and leave every file byte-identical (spec §8 P2/P3).
        let rerun_outcome = run(&args(dir.path()), &front_end).unwrap();
        let mut rerun_written = rerun_outcome.written.clone();
        rerun_written.sort();
        assert_eq!(wet_written, rerun_written);
    }

    #[test]
    fn cpp_target_renders_pragma_once() {
        let dir = tempfile::tempdir().unwrap();
        let composite = sealed_structure("uavcan.primitive.Empty", version(1, 0), vec![field("value", uint(8))], 1);
        let front_end = FixedNamespace::new(vec![composite]);
        let mut cli = args(dir.path());
        cli.target_language = "cpp".to_string();
        run(&cli, &front_end).unwrap();
        let header = fs::read_to_string(dir.path().join("uavcan/primitive/Empty_1_0.hpp")).unwrap();
        assert!(header.starts_with("#pragma once"));
        let _ = LanguageId::Cpp;
    }
}
