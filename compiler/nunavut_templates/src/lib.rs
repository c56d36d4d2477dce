//! Template environment (spec §4.E): a sandboxed Handlebars registry with a
//! fixed catalog of helpers standing in for the spec's filter/test set
//! (`mangle`, `literal`, `include`, `align_up`/`align_down`, `is_aligned`,
//! `bytes`, `full_reference`, `needs_std`, `is_serializing`/
//! `is_deserializing`). No template is allowed to reach outside this
//! catalog: `strict_mode` plus the lack of any "raw helper"/escape-fn
//! registration keeps rendering a pure function of (template, context).

use std::sync::Arc;

use diagnostics::Diagnostic;
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderError};
use nunavut::lang::{Language, MangleContext};
use nunavut::{CompositeRef, Version};

fn render_error(message: impl Into<String>) -> RenderError {
    RenderError::new(message.into())
}

fn param_str<'a>(h: &'a Helper, index: usize) -> Result<&'a str, handlebars::RenderError> {
    h.param(index).and_then(|p| p.value().as_str()).ok_or_else(|| render_error(format!("helper expects a string at position {index}")))
}

fn param_u64(h: &Helper, index: usize) -> Result<u64, handlebars::RenderError> {
    h.param(index).and_then(|p| p.value().as_u64()).ok_or_else(|| render_error(format!("helper expects an integer at position {index}")))
}

fn mangle_context_of(tag: &str) -> MangleContext {
    match tag {
        "function_name" => MangleContext::FunctionName,
        "macro" => MangleContext::Macro,
        "header_guard" => MangleContext::HeaderGuard,
        "namespace" => MangleContext::Namespace,
        "type_name" => MangleContext::TypeName,
        _ => MangleContext::StructField,
    }
}

/// Bundles the handful of Handlebars helpers that need to consult the
/// target [`Language`]; held behind `Arc` so every helper closure can share
/// one without this environment owning a lifetime parameter.
struct LanguageHelpers(Arc<dyn Language>);

fn register_language_helpers(registry: &mut Handlebars<'static>, language: Arc<dyn Language>) {
    let mangle_lang = LanguageHelpers(language.clone());
    registry.register_helper(
        "mangle",
        Box::new(move |h: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output| -> HelperResult {
            let symbol = param_str(h, 0)?;
            let context = h.param(1).and_then(|p| p.value().as_str()).map(mangle_context_of).unwrap_or(MangleContext::StructField);
            out.write(&mangle_lang.0.mangle(symbol, context))?;
            Ok(())
        }),
    );

    let include_lang = LanguageHelpers(language.clone());
    registry.register_helper(
        "include",
        Box::new(move |h: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output| -> HelperResult {
            let full_name = param_str(h, 0)?;
            let major = param_u64(h, 1)? as u8;
            let minor = param_u64(h, 2)? as u8;
            let reference = CompositeRef { full_name: full_name.to_string(), version: Version { major, minor } };
            out.write(&include_lang.0.include_for(&reference))?;
            Ok(())
        }),
    );

    let full_reference_lang = LanguageHelpers(language.clone());
    registry.register_helper(
        "full_reference",
        Box::new(move |h: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output| -> HelperResult {
            let full_name = param_str(h, 0)?;
            let major = param_u64(h, 1)? as u8;
            let minor = param_u64(h, 2)? as u8;
            out.write(&full_reference_lang.0.full_reference(full_name, Version { major, minor }))?;
            Ok(())
        }),
    );

    let native_type_lang = LanguageHelpers(language.clone());
    registry.register_helper(
        "needs_std",
        Box::new(move |h: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output| -> HelperResult {
            // Only C++'s variable-length arrays and variants need a standard
            // library include; C emits no automatic std includes at all.
            let kind = param_str(h, 0).unwrap_or("");
            let needs = native_type_lang.0.id() == nunavut::LanguageId::Cpp && (kind == "variable_array" || kind == "union");
            out.write(if needs { "true" } else { "" })?;
            Ok(())
        }),
    );
}

fn register_pure_helpers(registry: &mut Handlebars<'static>) {
    registry.register_helper(
        "literal",
        Box::new(|h: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output| -> HelperResult {
            // Rendering a constant's native literal needs the full Language
            // trait object, not just a string tag, so this pure-helper slot
            // only formats the simple numeric/boolean cases directly; the
            // support-library emitter calls `Language::native_value` for
            // anything that needs saturation-aware NaN/Infinity spellings.
            let raw = h.param(0).map(|p| p.value().to_string()).unwrap_or_default();
            out.write(raw.trim_matches('"'))?;
            Ok(())
        }),
    );

    registry.register_helper(
        "align_up",
        Box::new(|h: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output| -> HelperResult {
            let n = param_u64(h, 0)?;
            let alignment = param_u64(h, 1)?;
            let aligned = if alignment == 0 { n } else { n.div_ceil(alignment) * alignment };
            out.write(&aligned.to_string())?;
            Ok(())
        }),
    );

    registry.register_helper(
        "align_down",
        Box::new(|h: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output| -> HelperResult {
            let n = param_u64(h, 0)?;
            let alignment = param_u64(h, 1)?;
            let aligned = if alignment == 0 { n } else { (n / alignment) * alignment };
            out.write(&aligned.to_string())?;
            Ok(())
        }),
    );

    registry.register_helper(
        "is_aligned",
        Box::new(|h: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output| -> HelperResult {
            let n = param_u64(h, 0)?;
            let alignment = param_u64(h, 1)?;
            out.write(if alignment != 0 && n % alignment == 0 { "true" } else { "" })?;
            Ok(())
        }),
    );

    registry.register_helper(
        "bytes",
        Box::new(|h: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output| -> HelperResult {
            let bits = param_u64(h, 0)?;
            out.write(&bits.div_ceil(8).to_string())?;
            Ok(())
        }),
    );

    registry.register_helper(
        "is_serializing",
        Box::new(|h: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output| -> HelperResult {
            out.write(if param_str(h, 0)? == "serialize" { "true" } else { "" })?;
            Ok(())
        }),
    );

    registry.register_helper(
        "is_deserializing",
        Box::new(|h: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output| -> HelperResult {
            out.write(if param_str(h, 0)? == "deserialize" { "true" } else { "" })?;
            Ok(())
        }),
    );
}

/// A registered, ready-to-render template environment bound to one target
/// language. Every render is pure: same (template name, JSON context) in,
/// same bytes out, no helper consults anything other than its arguments and
/// the bound language (spec §4.E "idempotent rendering").
pub struct TemplateEnvironment {
    registry: Handlebars<'static>,
}

impl TemplateEnvironment {
    pub fn new(language: Arc<dyn Language>) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        register_language_helpers(&mut registry, language);
        register_pure_helpers(&mut registry);
        TemplateEnvironment { registry }
    }

    pub fn register_template(&mut self, name: &str, source: &str) -> Result<(), Diagnostic> {
        self.registry
            .register_template_string(name, source)
            .map_err(|e| Diagnostic::TemplateError { template: name.to_string(), line: e.line_no, message: e.to_string() })
    }

    pub fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, Diagnostic> {
        self.registry
            .render(name, context)
            .map_err(|e| Diagnostic::TemplateError { template: name.to_string(), line: e.line_no, message: e.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nunavut::lang::{for_id, LanguageId};
    use serde_json::json;

    #[test]
    fn mangle_helper_strops_reserved_words() {
        let mut env = TemplateEnvironment::new(Arc::from(for_id(LanguageId::C)));
        env.register_template("t", "{{mangle \"register\"}}").unwrap();
        assert_eq!(env.render("t", &json!({})).unwrap(), "_register");
    }

    #[test]
    fn align_up_rounds_to_next_multiple() {
        let env = TemplateEnvironment::new(Arc::from(for_id(LanguageId::C)));
        let mut registry = env;
        registry.register_template("t", "{{align_up 13 8}}").unwrap();
        assert_eq!(registry.render("t", &json!({})).unwrap(), "16");
    }

    #[test]
    fn bytes_rounds_bits_up() {
        let mut env = TemplateEnvironment::new(Arc::from(for_id(LanguageId::C)));
        env.register_template("t", "{{bytes 9}}").unwrap();
        assert_eq!(env.render("t", &json!({})).unwrap(), "2");
    }

    #[test]
    fn full_reference_helper_matches_language_trait() {
        let mut env = TemplateEnvironment::new(Arc::from(for_id(LanguageId::C)));
        env.register_template("t", "{{full_reference \"a.Foo\" 1 0}}").unwrap();
        assert_eq!(env.render("t", &json!({})).unwrap(), "a_Foo_1_0");
    }

    #[test]
    fn unknown_variable_in_strict_mode_is_a_template_error() {
        let mut env = TemplateEnvironment::new(Arc::from(for_id(LanguageId::C)));
        env.register_template("t", "{{nonexistent_field}}").unwrap();
        assert!(env.render("t", &json!({})).is_err());
    }
}
