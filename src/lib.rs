//! Core library: the DSDL entity model, the language model, the namespace
//! resolver, and the bit-level wire contract (spec §3 CORE MODULES, §4.H).
//!
//! Everything that needs a DSDL front end, a configuration store, templates,
//! or a CLI surface lives in the `compiler/nunavut_*` workspace members
//! instead; this crate has no knowledge of any of them.

pub mod dsdl;
pub mod lang;
pub mod resolve;
pub mod wire;

pub use dsdl::{Composite, CompositeRef, Constant, ConstantValue, Field, Primitive, PrimitiveKind, Service, Version};
pub use lang::{for_id, Language, LanguageId};
pub use resolve::{resolve, ResolvedComposite, ResolvedTree};
