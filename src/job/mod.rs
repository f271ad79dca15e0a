//! Job description: the declarative render request.
//!
//! A job is parsed once from JSON into strongly-typed structs, validated before any media is
//! touched, and then treated as immutable input by the scene compositor and program assembler.

pub(crate) mod model;
pub(crate) mod validate;
