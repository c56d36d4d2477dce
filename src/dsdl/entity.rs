//! The DSDL entity sum types the front-end collaborator must produce (spec
//! §3 "DSDL entity (from external parser)"). A real DSDL grammar parser is
//! out of scope (spec §1); this module only fixes the shape its output must
//! have so the rest of the pipeline (namespace resolver, language model,
//! templates) has something concrete and exhaustively matchable to work
//! against (spec §9: "AST node polymorphism -> a sum type ... with
//! exhaustive pattern matching").

use std::fmt;

/// A DSDL `major.minor` version pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    UnsignedInt,
    SignedInt,
    Float,
    Bool,
    Void,
}

/// Saturation policy applied when a field's value exceeds its declared
/// range at serialization time (spec §4.H "Saturation on serialization").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastMode {
    Saturated,
    Truncated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    /// 1..=64 for non-void primitives; a multiple of 8 for void (padding).
    pub bit_length: u8,
    pub cast_mode: CastMode,
}

impl Primitive {
    pub fn new(kind: PrimitiveKind, bit_length: u8, cast_mode: CastMode) -> Self {
        Primitive { kind, bit_length, cast_mode }
    }

    pub fn boolean() -> Self {
        Primitive::new(PrimitiveKind::Bool, 1, CastMode::Saturated)
    }

    pub fn void(bit_length: u8) -> Self {
        Primitive::new(PrimitiveKind::Void, bit_length, CastMode::Saturated)
    }

    pub fn is_signed(&self) -> bool {
        matches!(self.kind, PrimitiveKind::SignedInt)
    }

    /// Inclusive range of representable values for integer primitives, used
    /// to implement saturation (spec §8 P5).
    pub fn integer_range(&self) -> Option<(i128, i128)> {
        match self.kind {
            PrimitiveKind::UnsignedInt => Some((0, (1i128 << self.bit_length) - 1)),
            PrimitiveKind::SignedInt => {
                let half = 1i128 << (self.bit_length - 1);
                Some((-half, half - 1))
            }
            PrimitiveKind::Bool | PrimitiveKind::Float | PrimitiveKind::Void => None,
        }
    }
}

/// A reference to another composite type by full name and exact version;
/// resolved against the namespace tree by the resolver (spec §4.C:
/// "A type references another by full-name-and-version; unresolved
/// references fail with MissingDependency").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeRef {
    pub full_name: String,
    pub version: Version,
}

impl fmt::Display for CompositeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.full_name, self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(Primitive),
    Composite(CompositeRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    Fixed,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayType {
    pub element: Box<TypeRef>,
    pub kind: ArrayKind,
    pub capacity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(TypeRef),
    Array(ArrayType),
}

impl FieldType {
    /// Compile-time constant `ARRAY_CAPACITY_` (spec §3 invariants); `None`
    /// for non-array fields, which have no capacity constant.
    pub fn array_capacity(&self) -> Option<u64> {
        match self {
            FieldType::Array(a) => Some(a.capacity),
            FieldType::Scalar(_) => None,
        }
    }

    /// Compile-time constant `ARRAY_IS_VARIABLE_LENGTH_`.
    pub fn array_is_variable_length(&self) -> bool {
        matches!(self, FieldType::Array(ArrayType { kind: ArrayKind::Variable, .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionOption {
    pub name: String,
    pub ty: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositeKind {
    Structure { fields: Vec<Field> },
    Union { options: Vec<UnionOption> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sealing {
    Sealed,
    Delimited,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composite {
    /// Dotted full name, e.g. `uavcan.primitive.Empty`.
    pub full_name: String,
    pub version: Version,
    pub kind: CompositeKind,
    pub fixed_port_id: Option<u32>,
    /// Declared maximum serialized size in bytes (spec glossary: Extent).
    pub extent_bytes: u64,
    pub sealing: Sealing,
}

impl Composite {
    pub fn short_name(&self) -> &str {
        self.full_name.rsplit('.').next().unwrap_or(&self.full_name)
    }

    pub fn namespace_components(&self) -> Vec<&str> {
        let mut parts: Vec<&str> = self.full_name.split('.').collect();
        parts.pop();
        parts
    }

    pub fn has_fixed_port_id(&self) -> bool {
        self.fixed_port_id.is_some()
    }

    pub fn is_union(&self) -> bool {
        matches!(self.kind, CompositeKind::Union { .. })
    }

    /// `UNION_OPTION_COUNT_`; `None` for structures.
    pub fn union_option_count(&self) -> Option<usize> {
        match &self.kind {
            CompositeKind::Union { options } => Some(options.len()),
            CompositeKind::Structure { .. } => None,
        }
    }

    /// Every composite directly referenced by a field or option of this
    /// composite, used by both the resolver (to check for missing
    /// dependencies) and the dependency analyzer (to compute closures).
    pub fn direct_dependencies(&self) -> Vec<&CompositeRef> {
        let type_refs: Vec<&FieldType> = match &self.kind {
            CompositeKind::Structure { fields } => fields.iter().map(|f| &f.ty).collect(),
            CompositeKind::Union { options } => options.iter().map(|o| &o.ty).collect(),
        };
        type_refs
            .into_iter()
            .filter_map(|ty| match ty {
                FieldType::Scalar(TypeRef::Composite(c)) => Some(c),
                FieldType::Array(ArrayType { element, .. }) => match element.as_ref() {
                    TypeRef::Composite(c) => Some(c),
                    TypeRef::Primitive(_) => None,
                },
                FieldType::Scalar(TypeRef::Primitive(_)) => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub full_name: String,
    pub version: Version,
    pub request: Composite,
    pub response: Composite,
    pub fixed_port_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Integer(i128),
    Float(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: String,
    pub ty: Primitive,
    pub value: ConstantValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_is_last_dotted_segment() {
        let c = Composite {
            full_name: "uavcan.primitive.Empty".into(),
            version: Version { major: 1, minor: 0 },
            kind: CompositeKind::Structure { fields: vec![] },
            fixed_port_id: None,
            extent_bytes: 0,
            sealing: Sealing::Sealed,
        };
        assert_eq!(c.short_name(), "Empty");
        assert_eq!(c.namespace_components(), vec!["uavcan", "primitive"]);
    }

    #[test]
    fn saturated_u8_range_is_0_to_255() {
        let p = Primitive::new(PrimitiveKind::UnsignedInt, 8, CastMode::Saturated);
        assert_eq!(p.integer_range(), Some((0, 255)));
    }

    #[test]
    fn saturated_i8_range_is_symmetric_two_complement() {
        let p = Primitive::new(PrimitiveKind::SignedInt, 8, CastMode::Saturated);
        assert_eq!(p.integer_range(), Some((-128, 127)));
    }
}
