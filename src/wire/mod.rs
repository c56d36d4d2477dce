//! Bit-level serialization runtime contract (spec §4.H): the primitives the
//! support library emits in each target language, kept here as a Rust
//! reference implementation that also serves as the test oracle for the
//! round-trip, saturation, and float16 properties in spec §8 (P1, P5, P6).

pub mod bits;
pub mod cast;
pub mod float16;

pub use bits::{
    copy_bits, get_bit, get_f16, get_f32, get_f64, get_i, get_u, saturate_fragment_bit_length, set_bit, set_f16, set_f32, set_f64, set_i,
    set_u,
};
pub use cast::{saturate_signed, saturate_unsigned, sign_extend, truncate_signed, truncate_unsigned};
pub use float16::{f16_bits_to_f32, f32_to_f16_bits};

use diagnostics::Diagnostic;

/// Bit width of a tagged union's tag field for `option_count` options
/// (re-exported here for convenience; the authoritative definition lives
/// alongside the AST in [`crate::dsdl::bit_length::union_tag_bit_length`]
/// since it only depends on a count, not on any buffer).
pub use crate::dsdl::bit_length::union_tag_bit_length;

/// Writes a tagged union's selector tag. Fails if `tag >= option_count`
/// (spec §4.H invariant: "writing an out-of-range tag is a programming
/// error, not a runtime saturation case").
pub fn set_union_tag(buf: &mut [u8], offset_bit: usize, tag: u64, option_count: usize) -> Result<(), Diagnostic> {
    if tag as usize >= option_count {
        return Err(Diagnostic::InvalidTag { tag, option_count });
    }
    set_u(buf, offset_bit, union_tag_bit_length(option_count) as u8, tag)
}

/// Reads and validates a tagged union's selector tag (spec §8 P7: "union
/// tag validity").
pub fn get_union_tag(buf: &[u8], offset_bit: usize, option_count: usize) -> Result<u64, Diagnostic> {
    let tag = get_u(buf, offset_bit, union_tag_bit_length(option_count) as u8);
    if tag as usize >= option_count {
        return Err(Diagnostic::InvalidTag { tag, option_count });
    }
    Ok(tag)
}

/// Writes a delimited composite's 4-byte little-endian length header (spec
/// §4.H "delimited composites are framed by a 4-byte length header").
pub fn set_delimiter_header(buf: &mut [u8], offset_bit: usize, length_bytes: u32) -> Result<(), Diagnostic> {
    set_u(buf, offset_bit, 32, length_bytes as u64)
}

/// Reads a delimited composite's length header and validates it against how
/// many bytes actually remain in the buffer (spec §7 `BadDelimiterHeader`).
pub fn get_delimiter_header(buf: &[u8], offset_bit: usize, remaining_bytes: usize) -> Result<u32, Diagnostic> {
    let claimed = get_u(buf, offset_bit, 32) as u32;
    if claimed as usize > remaining_bytes {
        return Err(Diagnostic::BadDelimiterHeader { claimed_bytes: claimed as u64, remaining_bytes });
    }
    Ok(claimed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_tag_round_trips() {
        let mut buf = [0u8; 1];
        set_union_tag(&mut buf, 0, 2, 3).unwrap();
        assert_eq!(get_union_tag(&buf, 0, 3).unwrap(), 2);
    }

    #[test]
    fn out_of_range_tag_on_write_is_invalid_tag() {
        assert!(set_union_tag(&mut [0u8; 1], 0, 5, 3).is_err());
    }

    #[test]
    fn out_of_range_tag_on_read_is_invalid_tag() {
        let mut buf = [0u8; 1];
        set_u(&mut buf, 0, 8, 7).unwrap();
        assert!(get_union_tag(&buf, 0, 3).is_err());
    }

    #[test]
    fn delimiter_header_rejects_overclaiming_length() {
        let mut buf = [0u8; 4];
        set_delimiter_header(&mut buf, 0, 100).unwrap();
        assert!(get_delimiter_header(&buf, 0, 10).is_err());
    }

    #[test]
    fn delimiter_header_accepts_length_within_bounds() {
        let mut buf = [0u8; 4];
        set_delimiter_header(&mut buf, 0, 8).unwrap();
        assert_eq!(get_delimiter_header(&buf, 0, 10).unwrap(), 8);
    }
}
