//! Field-path DSL engine
//!
//! The leaf subsystem everything else builds on: tokenizing the dotted and
//! bracketed column-header syntax, normalizing cell text into typed values,
//! and assigning values into nested JSON structures.

pub mod assign;
pub mod path;
pub mod value;

pub use assign::{assign, assign_str};
pub use path::{expansion_split, tokenize, FieldPath, PathToken, EXPANSION_MARKER};
pub use value::CellValue;
