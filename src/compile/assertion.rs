//! Assertion metadata parsing and value casting
//!
//! Response column headers carry an optional operator and type tag:
//! `age:gt[Type:int]`, `score:between[Type:float]`, `name[Type:string]`.
//! Unknown operators fall back to equality; failed casts fall back to the
//! raw string. Both leniencies are surfaced as compile warnings.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::dsl::CellValue;

/// Comparison operator for an assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Contains,
    Regex,
    Between,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
    IsArray,
    IsObject,
    IsString,
    IsNumber,
    IsBool,
}

impl Operator {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "gt" => Self::Gt,
            "lt" => Self::Lt,
            "contains" => Self::Contains,
            "regex" => Self::Regex,
            "between" => Self::Between,
            "is_null" => Self::IsNull,
            "is_not_null" => Self::IsNotNull,
            "is_empty" => Self::IsEmpty,
            "is_not_empty" => Self::IsNotEmpty,
            "is_array" => Self::IsArray,
            "is_object" => Self::IsObject,
            "is_string" => Self::IsString,
            "is_number" => Self::IsNumber,
            "is_bool" => Self::IsBool,
            _ => return None,
        })
    }

    /// Structural operators assert on the retrieved value alone and take
    /// no expected value.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::IsNull
                | Self::IsNotNull
                | Self::IsEmpty
                | Self::IsNotEmpty
                | Self::IsArray
                | Self::IsObject
                | Self::IsString
                | Self::IsNumber
                | Self::IsBool
        )
    }
}

/// Declared expected-value type, driving the cast before comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    Int,
    Float,
    Bool,
    String,
    #[default]
    Unset,
}

impl DataType {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "int" | "integer" => Self::Int,
            "float" | "double" | "number" => Self::Float,
            "bool" | "boolean" => Self::Bool,
            "string" => Self::String,
            _ => Self::Unset,
        }
    }
}

/// One typed assertion against the response
#[derive(Debug, Clone)]
pub struct Assertion {
    /// Field path into the response body/headers; may contain the `[]`
    /// marker, which turns the assertion into an array-membership search
    pub path: String,
    pub operator: Operator,
    pub data_type: DataType,
    /// Raw expected value as written in the cell
    pub expected: String,
}

/// A leniency the compiler applied instead of failing
#[derive(Debug, Clone)]
pub enum CompileWarning {
    UnknownOperator { column: String, operator: String },
    CastFailed { case: String, field: String, raw: String },
    DefaultedBound { case: String, field: String },
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOperator { column, operator } => write!(
                f,
                "column '{column}': unknown operator '{operator}', using eq"
            ),
            Self::CastFailed { case, field, raw } => write!(
                f,
                "{case}: value '{raw}' for field '{field}' does not match its declared type, using raw string"
            ),
            Self::DefaultedBound { case, field } => write!(
                f,
                "{case}: between bounds for field '{field}' incomplete, defaulting"
            ),
        }
    }
}

/// Parsed field metadata from a response column header
#[derive(Debug, Clone)]
pub struct FieldMeta {
    pub field: String,
    pub operator: Operator,
    pub data_type: DataType,
    /// Operator keyword that failed to parse, if any
    pub unknown_operator: Option<String>,
}

static TYPE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[Type:([^\]]+)\]\s*$").expect("type tag regex"));

/// Parse a field header into `(field, operator, data type)`.
///
/// The trailing `[Type:x]` tag is stripped first; a trailing `:op` with a
/// recognized operator keyword is split off next; otherwise the operator
/// defaults to `eq`.
pub fn parse_field_meta(raw: &str) -> FieldMeta {
    let data_type = TYPE_TAG_RE
        .captures(raw)
        .map(|c| DataType::parse(&c[1]))
        .unwrap_or_default();
    let core = TYPE_TAG_RE.replace(raw, "").trim().to_string();

    if let Some((field, op)) = core.rsplit_once(':') {
        let keyword = op.trim().to_lowercase();
        match Operator::parse(&keyword) {
            Some(operator) => FieldMeta {
                field: field.trim().to_string(),
                operator,
                data_type,
                unknown_operator: None,
            },
            None => FieldMeta {
                field: field.trim().to_string(),
                operator: Operator::Eq,
                data_type,
                unknown_operator: Some(keyword),
            },
        }
    } else {
        FieldMeta {
            field: core,
            operator: Operator::Eq,
            data_type,
            unknown_operator: None,
        }
    }
}

/// Strip a trailing `[Type:x]` tag from a request column path.
///
/// Request paths carry no operator suffix, so only the tag is removed.
pub fn split_type_tag(raw: &str) -> (String, DataType) {
    let data_type = TYPE_TAG_RE
        .captures(raw)
        .map(|c| DataType::parse(&c[1]))
        .unwrap_or_default();
    (TYPE_TAG_RE.replace(raw, "").trim().to_string(), data_type)
}

/// A cast expected value
#[derive(Debug, Clone, PartialEq)]
pub enum CastValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl CastValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Int(n) => serde_json::Value::from(*n),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Str(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// Cast a raw expected value to its declared type.
///
/// Returns the cast value and whether the cast fell back to the raw
/// string (int/float parse failure).
pub fn cast_value(raw: &str, data_type: DataType) -> (CastValue, bool) {
    match data_type {
        DataType::Int => match raw.trim().parse::<i64>() {
            Ok(n) => (CastValue::Int(n), false),
            Err(_) => (CastValue::Str(raw.to_string()), true),
        },
        DataType::Float => match raw.trim().parse::<f64>() {
            Ok(f) => (CastValue::Float(f), false),
            Err(_) => (CastValue::Str(raw.to_string()), true),
        },
        DataType::Bool => {
            let truthy = matches!(
                raw.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "y" | "t"
            );
            (CastValue::Bool(truthy), false)
        }
        DataType::String | DataType::Unset => (CastValue::Str(raw.to_string()), false),
    }
}

/// Convert one request cell into its JSON value, honoring an explicit
/// type tag.
///
/// Sentinels and untyped cells go through plain inference; a typed cell
/// is cast instead, so `007` under `[Type:string]` stays a string.
/// `None` means the field is omitted.
pub fn typed_cell_json(raw: &str, data_type: DataType) -> Option<Value> {
    let normalized = CellValue::normalize(raw);
    match (&normalized, data_type) {
        (_, DataType::Unset)
        | (
            CellValue::Omit | CellValue::Null | CellValue::EmptyArray | CellValue::EmptyObject,
            _,
        ) => normalized.to_json(),
        _ => Some(cast_value(raw.trim(), data_type).0.to_json()),
    }
}

/// Split a `between` expected value into (low, high) bounds.
///
/// Accepts `,`/`;`/`:` separators. A missing low bound defaults to `0`;
/// a missing high bound mirrors the low bound. Returns whether any bound
/// was defaulted.
pub fn split_bounds(raw: &str) -> (String, String, bool) {
    let bounds: Vec<&str> = raw
        .split(|c| c == ',' || c == ';' || c == ':')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect();
    match bounds.as_slice() {
        [low, high, ..] => ((*low).to_string(), (*high).to_string(), false),
        [only] => ((*only).to_string(), (*only).to_string(), true),
        [] => ("0".to_string(), "0".to_string(), true),
    }
}
