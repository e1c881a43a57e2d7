//! Table-to-script compiler
//!
//! Turns a parsed definition table into request payloads, assertion lists
//! and finally Robot Framework files, one per row.

mod assertion;
mod row;
mod script;

pub use assertion::{
    cast_value, parse_field_meta, split_bounds, split_type_tag, typed_cell_json, Assertion,
    CastValue, CompileWarning, DataType, FieldMeta, Operator,
};
pub use row::{apply_params, compile, CompileOutcome, TestCase};
pub use script::{emit_script, write_scripts};
