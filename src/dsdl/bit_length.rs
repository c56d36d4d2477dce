//! `bit_length_set(type) -> set of integers` (spec §6, DSDL front-end
//! interface) implemented as a pure function over the AST: the set of
//! serialized bit lengths a composite can take is fully determined by its
//! field types and the namespace's other composites, so this does not need
//! to live inside a concrete DSDL grammar parser.

use std::collections::BTreeSet;

use super::entity::{ArrayKind, Composite, CompositeKind, CompositeRef, FieldType, Sealing, TypeRef};

/// A set of possible serialized bit lengths for a type. Kept as an exact
/// (deduplicated) set rather than just min/max so delimited-header framing
/// and implicit zero-extension reasoning (spec §4.H, §8 P4) can be checked
/// against every length a value could actually take, not just the extremes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitLengthSet(BTreeSet<u64>);

impl BitLengthSet {
    pub fn single(n: u64) -> Self {
        BitLengthSet(BTreeSet::from([n]))
    }

    pub fn max(&self) -> u64 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    pub fn min(&self) -> u64 {
        self.0.iter().copied().min().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.iter().copied()
    }

    /// Minkowski sum: every length reachable by picking one value from each
    /// operand and adding them, i.e. the bit length of `self` immediately
    /// followed by `other` (struct field concatenation).
    pub fn concat(&self, other: &Self) -> Self {
        let mut out = BTreeSet::new();
        for a in &self.0 {
            for b in &other.0 {
                out.insert(a + b);
            }
        }
        if out.is_empty() {
            out.insert(0);
        }
        BitLengthSet(out)
    }

    /// Union of alternatives (tagged-union option payloads after the tag).
    pub fn union(sets: impl IntoIterator<Item = BitLengthSet>) -> Self {
        let mut out = BTreeSet::new();
        for s in sets {
            out.extend(s.0);
        }
        BitLengthSet(out)
    }

    /// `self` concatenated with itself `times` times (fixed-length array).
    pub fn repeat(&self, times: u64) -> Self {
        let mut acc = BitLengthSet::single(0);
        for _ in 0..times {
            acc = acc.concat(self);
        }
        acc
    }

    fn plus_scalar(&self, n: u64) -> Self {
        BitLengthSet(self.0.iter().map(|x| x + n).collect())
    }
}

/// Looks up a composite by full name and version; the index that results
/// from the namespace resolver (spec §4.C) implements this.
pub trait CompositeLookup {
    fn lookup(&self, reference: &CompositeRef) -> Option<&Composite>;
}

/// Bit width of the smallest unsigned integer that can index `option_count`
/// options, rounded up to a byte boundary (spec §4.H: tagged-union tag
/// "minimum width to represent the option count, rounded up to a byte").
pub fn union_tag_bit_length(option_count: usize) -> u64 {
    let bits_needed = if option_count <= 1 { 1 } else { (usize::BITS - (option_count - 1).leading_zeros()) as u64 };
    ((bits_needed + 7) / 8) * 8
}

fn bit_length_of_type_ref(ty: &TypeRef, index: &dyn CompositeLookup) -> BitLengthSet {
    match ty {
        TypeRef::Primitive(p) => BitLengthSet::single(p.bit_length as u64),
        TypeRef::Composite(reference) => bit_length_of_reference(reference, index),
    }
}

fn bit_length_of_reference(reference: &CompositeRef, index: &dyn CompositeLookup) -> BitLengthSet {
    match index.lookup(reference) {
        Some(composite) => {
            let inner = compute_bit_length_set(composite, index);
            match composite.sealing {
                Sealing::Sealed => inner,
                // delimited composites are framed by a 4-byte length header
                // wherever they're nested (spec §4.H).
                Sealing::Delimited => inner.plus_scalar(32),
            }
        }
        // An unresolved reference at this stage is a MissingDependency the
        // resolver will have already reported; fall back to the reference's
        // own declared version width of zero so callers can still compute a
        // (conservative) buffer size for the rest of the namespace.
        None => BitLengthSet::single(0),
    }
}

fn bit_length_of_field(ty: &FieldType, index: &dyn CompositeLookup) -> BitLengthSet {
    match ty {
        FieldType::Scalar(t) => bit_length_of_type_ref(t, index),
        FieldType::Array(a) => {
            let element = bit_length_of_type_ref(&a.element, index);
            match a.kind {
                ArrayKind::Fixed => element.repeat(a.capacity),
                ArrayKind::Variable => {
                    let count_width = union_tag_width_for_capacity(a.capacity);
                    let mut alternatives = Vec::new();
                    for k in 0..=a.capacity {
                        alternatives.push(BitLengthSet::single(count_width).concat(&element.repeat(k)));
                    }
                    BitLengthSet::union(alternatives)
                }
            }
        }
    }
}

/// Bit width of the implicit length prefix of a variable-length array of the
/// given capacity: the smallest power-of-two-aligned unsigned width able to
/// represent `0..=capacity`.
fn union_tag_width_for_capacity(capacity: u64) -> u64 {
    let bits_needed = 64 - capacity.leading_zeros() as u64;
    for w in [8, 16, 32, 64] {
        if bits_needed <= w {
            return w;
        }
    }
    64
}

/// The full possible bit-length set of `composite`, computed recursively.
pub fn compute_bit_length_set(composite: &Composite, index: &dyn CompositeLookup) -> BitLengthSet {
    match &composite.kind {
        CompositeKind::Structure { fields } => {
            let mut acc = BitLengthSet::single(0);
            for field in fields {
                acc = acc.concat(&bit_length_of_field(&field.ty, index));
            }
            acc
        }
        CompositeKind::Union { options } => {
            let tag = BitLengthSet::single(union_tag_bit_length(options.len()));
            let alternatives = options.iter().map(|o| tag.concat(&bit_length_of_field(&o.ty, index)));
            BitLengthSet::union(alternatives)
        }
    }
}

/// `SERIALIZATION_BUFFER_SIZE_BYTES_` (spec §3 invariants): the smallest
/// number of bytes that can hold the longest possible serialization,
/// including the delimiter header for delimited types.
pub fn serialization_buffer_size_bytes(composite: &Composite, index: &dyn CompositeLookup) -> u64 {
    let payload_bits = compute_bit_length_set(composite, index).max();
    let payload_bytes = (payload_bits + 7) / 8;
    match composite.sealing {
        Sealing::Sealed => payload_bytes,
        Sealing::Delimited => payload_bytes + 4,
    }
}
