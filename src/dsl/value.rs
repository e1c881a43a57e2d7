//! Cell normalization
//!
//! Spreadsheet cells arrive as text. Normalization maps reserved sentinel
//! literals to explicit values, infers booleans and numbers, and keeps the
//! load-bearing distinction between a blank cell (the field is omitted)
//! and an explicit `[NULL]` (the field is present with a JSON null).

use serde_json::Value;

/// The normalized value of one cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Blank cell: the field must not appear in the generated structure
    Omit,
    /// `[NULL]` sentinel: JSON null, inserted verbatim
    Null,
    /// `[EMPTY_ARRAY]` sentinel
    EmptyArray,
    /// `[EMPTY_OBJECT]` sentinel
    EmptyObject,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Any other text; `[EMPTY]` yields `Str("")`
    Str(String),
}

impl CellValue {
    /// Normalize raw cell text. Rules are checked in order and sentinel
    /// keywords are case-insensitive.
    pub fn normalize(raw: &str) -> Self {
        let s = raw.trim();
        let upper = s.to_uppercase();

        match upper.as_str() {
            "[EMPTY]" | "[EMPTY_STRING]" => return CellValue::Str(String::new()),
            "[NULL]" => return CellValue::Null,
            "[EMPTY_ARRAY]" => return CellValue::EmptyArray,
            "[EMPTY_OBJECT]" => return CellValue::EmptyObject,
            _ => {}
        }

        if s.is_empty() {
            return CellValue::Omit;
        }

        match s.to_lowercase().as_str() {
            "true" => return CellValue::Bool(true),
            "false" => return CellValue::Bool(false),
            _ => {}
        }

        let digits = s.strip_prefix('-').unwrap_or(s);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = s.parse::<i64>() {
                return CellValue::Int(n);
            }
        }

        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }

        CellValue::Str(s.to_string())
    }

    /// Whether this cell means "leave the field out entirely"
    pub fn is_omit(&self) -> bool {
        matches!(self, CellValue::Omit)
    }

    /// Convert into a JSON value. `Omit` has no JSON representation.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            CellValue::Omit => None,
            CellValue::Null => Some(Value::Null),
            CellValue::EmptyArray => Some(Value::Array(Vec::new())),
            CellValue::EmptyObject => Some(Value::Object(serde_json::Map::new())),
            CellValue::Bool(b) => Some(Value::Bool(*b)),
            CellValue::Int(n) => Some(Value::from(*n)),
            CellValue::Float(f) => Some(
                serde_json::Number::from_f64(*f)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
            ),
            CellValue::Str(s) => Some(Value::String(s.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert_eq!(CellValue::normalize("[EMPTY]"), CellValue::Str("".into()));
        assert_eq!(
            CellValue::normalize("[empty_string]"),
            CellValue::Str("".into())
        );
        assert_eq!(CellValue::normalize("[NULL]"), CellValue::Null);
        assert_eq!(CellValue::normalize("[Empty_Array]"), CellValue::EmptyArray);
        assert_eq!(
            CellValue::normalize("[EMPTY_OBJECT]"),
            CellValue::EmptyObject
        );
    }

    #[test]
    fn test_blank_is_omit() {
        assert_eq!(CellValue::normalize(""), CellValue::Omit);
        assert_eq!(CellValue::normalize("   "), CellValue::Omit);
        assert!(CellValue::normalize("").to_json().is_none());
    }

    #[test]
    fn test_type_inference() {
        assert_eq!(CellValue::normalize("TRUE"), CellValue::Bool(true));
        assert_eq!(CellValue::normalize("false"), CellValue::Bool(false));
        assert_eq!(CellValue::normalize("42"), CellValue::Int(42));
        assert_eq!(CellValue::normalize("-7"), CellValue::Int(-7));
        assert_eq!(CellValue::normalize("3.5"), CellValue::Float(3.5));
        assert_eq!(
            CellValue::normalize("hello world"),
            CellValue::Str("hello world".into())
        );
    }

    #[test]
    fn test_null_distinct_from_omit() {
        // [NULL] must survive into the structure, blank must not
        assert_eq!(
            CellValue::normalize("[NULL]").to_json(),
            Some(Value::Null)
        );
        assert_eq!(CellValue::normalize("").to_json(), None);
    }
}
