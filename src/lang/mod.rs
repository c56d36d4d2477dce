//! Language model abstraction (spec §3 "Language" / §4.B). Every target
//! language implements [`Language`]; the resolver and the generation driver
//! only ever talk to this trait, never to a concrete `c`/`cpp` type, so
//! adding a third target is a matter of adding one more module and one more
//! arm in [`for_id`].

pub mod c;
pub mod cpp;
pub mod mangle;
pub mod options;

pub use mangle::{screaming_snake_case, MangleContext, MangleRules};
pub use options::{CStandard, CppOptions, CppStandard, CtorConvention, Endianness};

use crate::dsdl::{CompositeRef, Primitive, Version};

/// Every language this port ships, plus the identifiers accepted-but-gated
/// behind `--experimental-languages` (spec §4.B, §6 `UnknownLanguage` /
/// `ExperimentalLanguageNotEnabled`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    C,
    Cpp,
}

impl LanguageId {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "c" => Some(LanguageId::C),
            "cpp" | "c++" => Some(LanguageId::Cpp),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LanguageId::C => "c",
            LanguageId::Cpp => "cpp",
        }
    }

    /// Languages ship stable by default; this port has none gated behind
    /// `--experimental-languages` yet, but the flag is still threaded through
    /// the driver (spec §4.B) so a future addition only needs an entry here.
    pub fn is_experimental(&self) -> bool {
        false
    }
}

/// What templates and the generation driver need from a target language,
/// independent of any one composite (spec §3 "Language" block).
pub trait Language {
    fn id(&self) -> LanguageId;

    /// `None` means "the standard does not affect code shape", which is true
    /// for neither of the two languages this port ships, but kept `Option`
    /// so a future minimal-config language can omit it.
    fn standard(&self) -> Option<&str>;

    fn endianness(&self) -> Endianness {
        Endianness::Little
    }

    /// Applies this language's reserved-word/pattern stropping for the given
    /// syntactic context (spec §4.B `mangle`).
    fn mangle(&self, symbol: &str, context: MangleContext) -> String;

    /// The native type spelling used to hold a DSDL primitive's value.
    fn native_type(&self, primitive: &Primitive) -> String;

    /// A literal expression for `value`, typed so it won't silently
    /// truncate or promote for `primitive` (e.g. `NAN`/`INFINITY`, integer
    /// and float literal suffixes).
    fn native_value(&self, primitive: &Primitive, value: &crate::dsdl::ConstantValue) -> String;

    /// The `#include`/`#include <...>` path a referencing file needs to see
    /// `reference`'s definition, relative to the language's support root.
    fn include_for(&self, reference: &CompositeRef) -> String;

    /// The fully qualified type name a referencing file should use, e.g.
    /// `uavcan_primitive_Empty_1_0` (C) or `uavcan::primitive::Empty_1_0`
    /// (C++).
    fn full_reference(&self, full_name: &str, version: Version) -> String;

    /// Header-guard macro spelling for a generated header, or `None` for
    /// languages that use `#pragma once` exclusively.
    fn header_guard(&self, full_name: &str, version: Version) -> Option<String>;

    /// File extension (no leading dot) for generated type definition files.
    fn output_extension(&self) -> &'static str;

    /// Path, relative to the language's output root, that a composite's
    /// generated file is written to and `#include`d from. Centralized here
    /// (rather than duplicated between the resolver and `include_for`) so
    /// the two can never disagree about where a file lives (spec §4.C
    /// "output path" / §4.B "include computation").
    fn relative_header_path(&self, full_name: &str, version: Version) -> String {
        let mut parts: Vec<String> = full_name.split('.').map(|s| self.mangle(s, MangleContext::Namespace)).collect();
        if let Some(last) = parts.last_mut() {
            *last = format!("{}_{}_{}.{}", last, version.major, version.minor, self.output_extension());
        }
        parts.join("/")
    }
}

/// Resolves a [`LanguageId`] to its concrete implementation. The driver
/// crate is the only caller that needs this; the rest of the pipeline works
/// against `&dyn Language` or `impl Language` generically.
pub fn for_id(id: LanguageId) -> Box<dyn Language> {
    match id {
        LanguageId::C => Box::new(c::CLanguage::new(CStandard::C11, MangleRules::default_for_c())),
        LanguageId::Cpp => Box::new(cpp::CppLanguage::new(CppStandard::Cpp17, MangleRules::default_for_cpp(), CppOptions::default())),
    }
}
