//! The C++ language model (spec §4.B, target "cpp").

use crate::dsdl::{CompositeRef, ConstantValue, Primitive, PrimitiveKind, Version};

use super::mangle::{screaming_snake_case, MangleContext, MangleRules};
use super::options::{CppOptions, CppStandard};
use super::{Endianness, Language, LanguageId};

pub struct CppLanguage {
    standard: CppStandard,
    rules: MangleRules,
    pub options: CppOptions,
}

impl CppLanguage {
    pub fn new(standard: CppStandard, rules: MangleRules, options: CppOptions) -> Self {
        CppLanguage { standard, rules, options }
    }
}

fn next_power_of_two_width(bits: u8) -> u8 {
    for w in [8u8, 16, 32, 64] {
        if bits <= w {
            return w;
        }
    }
    64
}

impl Language for CppLanguage {
    fn id(&self) -> LanguageId {
        LanguageId::Cpp
    }

    fn standard(&self) -> Option<&str> {
        Some(self.standard.as_str())
    }

    fn endianness(&self) -> Endianness {
        Endianness::Little
    }

    fn mangle(&self, symbol: &str, context: MangleContext) -> String {
        match context {
            MangleContext::Macro | MangleContext::HeaderGuard => self.rules.strop(&screaming_snake_case(symbol)),
            // C++ field members conventionally trail an underscore rather
            // than lead one, matching the mangling style of the teacher's
            // own generated-accessor fields.
            MangleContext::StructField => format!("{}_", self.rules.strop(symbol)),
            _ => self.rules.strop(symbol),
        }
    }

    fn native_type(&self, primitive: &Primitive) -> String {
        match primitive.kind {
            PrimitiveKind::Bool => "bool".to_string(),
            PrimitiveKind::Void => format!("/* void{} */", primitive.bit_length),
            PrimitiveKind::Float => match primitive.bit_length {
                16 => "std::uint16_t".to_string(), // binary16 kept bit-packed, not promoted.
                32 => "float".to_string(),
                64 => "double".to_string(),
                other => panic!("unsupported float width {other}"),
            },
            PrimitiveKind::UnsignedInt => format!("std::uint{}_t", next_power_of_two_width(primitive.bit_length)),
            PrimitiveKind::SignedInt => format!("std::int{}_t", next_power_of_two_width(primitive.bit_length)),
        }
    }

    fn native_value(&self, primitive: &Primitive, value: &ConstantValue) -> String {
        let cpp_float_type = if primitive.bit_length == 64 { "double" } else { "float" };
        match (primitive.kind, value) {
            (PrimitiveKind::Float, ConstantValue::Float(f)) if f.is_nan() => {
                format!("std::numeric_limits<{cpp_float_type}>::quiet_NaN()")
            }
            (PrimitiveKind::Float, ConstantValue::Float(f)) if f.is_infinite() && *f > 0.0 => {
                format!("std::numeric_limits<{cpp_float_type}>::infinity()")
            }
            (PrimitiveKind::Float, ConstantValue::Float(f)) if f.is_infinite() => {
                format!("(-std::numeric_limits<{cpp_float_type}>::infinity())")
            }
            (PrimitiveKind::Float, ConstantValue::Float(f)) if primitive.bit_length == 64 => format!("{f}"),
            (PrimitiveKind::Float, ConstantValue::Float(f)) => format!("{f}F"),
            (PrimitiveKind::UnsignedInt, ConstantValue::Integer(i)) => format!("{i}U"),
            (PrimitiveKind::SignedInt, ConstantValue::Integer(i)) => format!("{i}"),
            (PrimitiveKind::Bool, ConstantValue::Integer(i)) => if *i != 0 { "true".to_string() } else { "false".to_string() },
            (_, ConstantValue::Text(s)) => format!("{s:?}"),
            (kind, value) => panic!("native_value: {kind:?} is incompatible with {value:?}"),
        }
    }

    fn include_for(&self, reference: &CompositeRef) -> String {
        self.relative_header_path(&reference.full_name, reference.version)
    }

    fn full_reference(&self, full_name: &str, version: Version) -> String {
        let segments: Vec<&str> = full_name.split('.').collect();
        let (short_name, namespace) = segments.split_last().expect("full_name has at least one segment");
        let mut mangled: Vec<String> = namespace.iter().map(|s| self.mangle(s, MangleContext::Namespace)).collect();
        mangled.push(format!("{}_{}_{}", self.mangle(short_name, MangleContext::TypeName), version.major, version.minor));
        mangled.join("::")
    }

    fn header_guard(&self, _full_name: &str, _version: Version) -> Option<String> {
        // C++ headers use `#pragma once` (spec §4.B default for cpp).
        None
    }

    fn output_extension(&self) -> &'static str {
        "hpp"
    }
}
