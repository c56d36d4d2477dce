pub mod bit_length;
pub mod entity;
pub mod front_end;

pub use bit_length::{compute_bit_length_set, serialization_buffer_size_bytes, BitLengthSet, CompositeLookup};
pub use entity::*;
pub use front_end::{builder, FixedNamespace, FrontEnd};
