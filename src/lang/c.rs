//! The C language model (spec §4.B, target "c").

use crate::dsdl::{CompositeRef, ConstantValue, Primitive, PrimitiveKind, Version};

use super::mangle::{screaming_snake_case, MangleContext, MangleRules};
use super::options::CStandard;
use super::{Endianness, Language, LanguageId};

pub struct CLanguage {
    standard: CStandard,
    rules: MangleRules,
}

impl CLanguage {
    pub fn new(standard: CStandard, rules: MangleRules) -> Self {
        CLanguage { standard, rules }
    }
}

/// Smallest of 8/16/32/64 that can hold `bits`.
fn next_power_of_two_width(bits: u8) -> u8 {
    for w in [8u8, 16, 32, 64] {
        if bits <= w {
            return w;
        }
    }
    64
}

impl Language for CLanguage {
    fn id(&self) -> LanguageId {
        LanguageId::C
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
            _ => self.rules.strop(symbol),
        }
    }

    fn native_type(&self, primitive: &Primitive) -> String {
        match primitive.kind {
            PrimitiveKind::Bool => "bool".to_string(),
            PrimitiveKind::Void => format!("/* void{} */", primitive.bit_length),
            PrimitiveKind::Float => match primitive.bit_length {
                16 => "float".to_string(), // storage-only: no native C binary16.
                32 => "float".to_string(),
                64 => "double".to_string(),
                other => panic!("unsupported float width {other}"),
            },
            PrimitiveKind::UnsignedInt => format!("uint{}_t", next_power_of_two_width(primitive.bit_length)),
            PrimitiveKind::SignedInt => format!("int{}_t", next_power_of_two_width(primitive.bit_length)),
        }
    }

    fn native_value(&self, primitive: &Primitive, value: &ConstantValue) -> String {
        match (primitive.kind, value) {
            (PrimitiveKind::Float, ConstantValue::Float(f)) if f.is_nan() => "NAN".to_string(),
            (PrimitiveKind::Float, ConstantValue::Float(f)) if f.is_infinite() && *f > 0.0 => "INFINITY".to_string(),
            (PrimitiveKind::Float, ConstantValue::Float(f)) if f.is_infinite() => "(-INFINITY)".to_string(),
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
        let mangled: Vec<String> = full_name.split('.').map(|s| self.mangle(s, MangleContext::TypeName)).collect();
        format!("{}_{}_{}", mangled.join("_"), version.major, version.minor)
    }

    fn header_guard(&self, full_name: &str, version: Version) -> Option<String> {
        Some(screaming_snake_case(&format!("{}_INCLUDED", self.full_reference(full_name, version))))
    }

    fn output_extension(&self) -> &'static str {
        "h"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsdl::CastMode;

    fn lang() -> CLanguage {
        CLanguage::new(CStandard::C11, MangleRules::default_for_c())
    }

    #[test]
    fn u8_native_type_is_uint8_t() {
        let p = Primitive::new(PrimitiveKind::UnsignedInt, 8, CastMode::Saturated);
        assert_eq!(lang().native_type(&p), "uint8_t");
    }

    #[test]
    fn u9_native_type_widens_to_uint16_t() {
        let p = Primitive::new(PrimitiveKind::UnsignedInt, 9, CastMode::Saturated);
        assert_eq!(lang().native_type(&p), "uint16_t");
    }

    #[test]
    fn reserved_field_name_is_stropped() {
        assert_eq!(lang().mangle("register", MangleContext::StructField), "_register");
    }

    #[test]
    fn full_reference_joins_namespace_and_version() {
        assert_eq!(lang().full_reference("uavcan.primitive.Empty", Version { major: 1, minor: 0 }), "uavcan_primitive_Empty_1_0");
    }

    #[test]
    fn nan_literal_is_nan_macro() {
        let p = Primitive::new(PrimitiveKind::Float, 32, CastMode::Saturated);
        assert_eq!(lang().native_value(&p, &ConstantValue::Float(f64::NAN)), "NAN");
    }
}
