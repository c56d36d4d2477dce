//! The collaborator interface the generator requires from a DSDL parser
//! (spec §6): `read_namespace(roots) -> iterable of composite`. The actual
//! grammar is out of scope (spec §1); this crate ships one concrete, minimal
//! implementation that builds composites directly in memory, the way the
//! teacher's own test suite calls its parser on in-memory strings rather
//! than maintaining fixture files on disk for every test case.

use std::path::PathBuf;

use diagnostics::Diagnostic;

use super::entity::Composite;

/// What the rest of the pipeline needs from a DSDL front-end.
pub trait FrontEnd {
    /// Parses every DSDL file reachable from `roots` and returns the
    /// composites it defines, in file-declaration order (the resolver is
    /// responsible for imposing the deterministic ordering templates rely
    /// on, per spec §4.F).
    fn read_namespace(&self, roots: &[PathBuf]) -> Result<Vec<Composite>, Diagnostic>;
}

/// An in-memory "front end" that already has its composites: used by tests
/// and by callers that built their types with [`builder`] instead of parsing
/// DSDL text.
pub struct FixedNamespace {
    composites: Vec<Composite>,
}

impl FixedNamespace {
    pub fn new(composites: Vec<Composite>) -> Self {
        FixedNamespace { composites }
    }
}

impl FrontEnd for FixedNamespace {
    fn read_namespace(&self, _roots: &[PathBuf]) -> Result<Vec<Composite>, Diagnostic> {
        Ok(self.composites.clone())
    }
}

/// Ergonomic constructors for the DSDL entity sum types, for tests and for
/// embedding fixed type definitions (the "seed scenarios" of spec §8) rather
/// than round-tripping them through a parser this crate doesn't ship.
pub mod builder {
    use crate::dsdl::entity::*;

    pub fn version(major: u8, minor: u8) -> Version {
        Version { major, minor }
    }

    pub fn uint(bits: u8) -> Primitive {
        Primitive::new(PrimitiveKind::UnsignedInt, bits, CastMode::Saturated)
    }

    pub fn int(bits: u8) -> Primitive {
        Primitive::new(PrimitiveKind::SignedInt, bits, CastMode::Saturated)
    }

    pub fn truncated_uint(bits: u8) -> Primitive {
        Primitive::new(PrimitiveKind::UnsignedInt, bits, CastMode::Truncated)
    }

    pub fn float32() -> Primitive {
        Primitive::new(PrimitiveKind::Float, 32, CastMode::Saturated)
    }

    pub fn float16() -> Primitive {
        Primitive::new(PrimitiveKind::Float, 16, CastMode::Saturated)
    }

    pub fn field(name: &str, ty: Primitive) -> Field {
        Field { name: name.into(), ty: FieldType::Scalar(TypeRef::Primitive(ty)) }
    }

    pub fn composite_field(name: &str, full_name: &str, version: Version) -> Field {
        Field {
            name: name.into(),
            ty: FieldType::Scalar(TypeRef::Composite(CompositeRef { full_name: full_name.into(), version })),
        }
    }

    pub fn variable_array_field(name: &str, element: Primitive, capacity: u64) -> Field {
        Field {
            name: name.into(),
            ty: FieldType::Array(ArrayType {
                element: Box::new(TypeRef::Primitive(element)),
                kind: ArrayKind::Variable,
                capacity,
            }),
        }
    }

    pub fn fixed_array_field(name: &str, element: Primitive, capacity: u64) -> Field {
        Field {
            name: name.into(),
            ty: FieldType::Array(ArrayType {
                element: Box::new(TypeRef::Primitive(element)),
                kind: ArrayKind::Fixed,
                capacity,
            }),
        }
    }

    pub fn union_option(name: &str, ty: Primitive) -> UnionOption {
        UnionOption { name: name.into(), ty: FieldType::Scalar(TypeRef::Primitive(ty)) }
    }

    /// Builds a sealed structure, computing its extent from the given
    /// fields' own declared widths (callers needing the full resolved
    /// bit-length-set based extent should use
    /// [`crate::dsdl::bit_length::serialization_buffer_size_bytes`] after
    /// resolution instead; this is a convenience for tests with no
    /// dependencies).
    pub fn sealed_structure(full_name: &str, version: Version, fields: Vec<Field>, extent_bytes: u64) -> Composite {
        Composite {
            full_name: full_name.into(),
            version,
            kind: CompositeKind::Structure { fields },
            fixed_port_id: None,
            extent_bytes,
            sealing: Sealing::Sealed,
        }
    }

    pub fn delimited_structure(full_name: &str, version: Version, fields: Vec<Field>, extent_bytes: u64) -> Composite {
        Composite {
            full_name: full_name.into(),
            version,
            kind: CompositeKind::Structure { fields },
            fixed_port_id: None,
            extent_bytes,
            sealing: Sealing::Delimited,
        }
    }

    /// Builds a tagged union; fails (`Diagnostic::ParamError`) if fewer than
    /// two options are given (spec §3 invariant: "Tagged unions have at
    /// least two options").
    pub fn union(
        full_name: &str,
        version: Version,
        options: Vec<UnionOption>,
        extent_bytes: u64,
    ) -> Result<Composite, diagnostics::Diagnostic> {
        if options.len() < 2 {
            return Err(diagnostics::Diagnostic::param_error(format!(
                "tagged union '{full_name}' must declare at least two options, found {}",
                options.len()
            )));
        }
        Ok(Composite {
            full_name: full_name.into(),
            version,
            kind: CompositeKind::Union { options },
            fixed_port_id: None,
            extent_bytes,
            sealing: Sealing::Sealed,
        })
    }

    pub fn with_fixed_port_id(mut composite: Composite, port_id: u32) -> Composite {
        composite.fixed_port_id = Some(port_id);
        composite
    }
}
