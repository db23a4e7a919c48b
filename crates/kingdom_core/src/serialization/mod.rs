//! Decoder for the tagged binary object-graph stream the game saves in.
//!
//! The stream is a flat sequence of tagged records describing class
//! metadata, object instances, strings, arrays, and id references between
//! them. Parsing builds an [`graph::ObjectGraph`]; edits go through the
//! in-place patch engine in [`patch`] so the rest of the file is preserved
//! byte for byte.

pub mod decimal;
pub mod document;
pub mod error;
pub mod graph;
pub mod patch;
pub mod primitives;
pub mod records;
pub mod wire;

pub use document::{FieldValue, SaveDocument};
pub use error::{FieldError, ParseError};
pub use patch::PatchValue;
pub use records::StreamHeader;
