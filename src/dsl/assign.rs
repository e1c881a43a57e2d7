//! Path assignment into nested JSON structures
//!
//! Walks a tokenized field path, creating objects and arrays by lookahead.
//! Arrays grow with empty-object placeholders until the target index is
//! reachable; existing elements are never shrunk or reordered. An index
//! token over a non-array container is a compile error rather than a
//! silent coercion that would discard prior content.

use serde_json::Value;

use crate::common::{Error, Result};

use super::path::{FieldPath, PathToken};

/// Assign `value` into `root` at the location named by `path`.
///
/// `display_path` is the original path string, used in error messages.
pub fn assign(root: &mut Value, path: &FieldPath, display_path: &str, value: Value) -> Result<()> {
    if path.is_empty() {
        return Err(Error::invalid_path(display_path, "empty path"));
    }

    let mut current = root;
    for (i, token) in path.iter().enumerate() {
        let last = i == path.len() - 1;
        match token {
            PathToken::Key(key) => {
                let obj = match current {
                    Value::Object(map) => map,
                    Value::Null => {
                        *current = Value::Object(serde_json::Map::new());
                        current.as_object_mut().ok_or_else(|| {
                            Error::Internal("object coercion failed".to_string())
                        })?
                    }
                    _ => return Err(Error::path_conflict(display_path)),
                };

                if last {
                    obj.insert(key.clone(), value);
                    return Ok(());
                }

                let next_is_index = matches!(path[i + 1], PathToken::Index(_));
                let entry = obj.entry(key.clone()).or_insert(Value::Null);
                if entry.is_null() {
                    *entry = if next_is_index {
                        Value::Array(Vec::new())
                    } else {
                        Value::Object(serde_json::Map::new())
                    };
                }
                current = entry;
            }
            PathToken::Index(idx) => {
                let arr = match current {
                    Value::Array(arr) => arr,
                    _ => return Err(Error::path_conflict(display_path)),
                };

                // Pad with empty-object placeholders; a later column for a
                // lower index overwrites its placeholder without touching
                // siblings already written.
                while arr.len() <= *idx {
                    arr.push(Value::Object(serde_json::Map::new()));
                }

                if last {
                    arr[*idx] = value;
                    return Ok(());
                }

                let next_is_index = matches!(path[i + 1], PathToken::Index(_));
                if arr[*idx].is_null() {
                    arr[*idx] = if next_is_index {
                        Value::Array(Vec::new())
                    } else {
                        Value::Object(serde_json::Map::new())
                    };
                }
                current = &mut arr[*idx];
            }
        }
    }

    unreachable!("loop assigns on the last token")
}

/// Tokenize and assign in one step
pub fn assign_str(root: &mut Value, path: &str, value: Value) -> Result<()> {
    let tokens = super::path::tokenize(path)?;
    assign(root, &tokens, path, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_object_assignment() {
        let mut root = json!({});
        assign_str(&mut root, "profile.name", json!("Ada")).unwrap();
        assign_str(&mut root, "profile.age", json!(36)).unwrap();
        assert_eq!(root, json!({"profile": {"name": "Ada", "age": 36}}));
    }

    #[test]
    fn test_array_growth_with_placeholders() {
        let mut root = json!({});
        assign_str(&mut root, "items[2].name", json!("C")).unwrap();
        assert_eq!(root, json!({"items": [{}, {}, {"name": "C"}]}));
    }

    #[test]
    fn test_siblings_survive_any_order() {
        let mut a = json!({});
        assign_str(&mut a, "items[1].name", json!("B")).unwrap();
        assign_str(&mut a, "items[0].name", json!("A")).unwrap();
        assign_str(&mut a, "items[0].active", json!(true)).unwrap();

        let mut b = json!({});
        assign_str(&mut b, "items[0].active", json!(true)).unwrap();
        assign_str(&mut b, "items[0].name", json!("A")).unwrap();
        assign_str(&mut b, "items[1].name", json!("B")).unwrap();

        let expected = json!({"items": [{"name": "A", "active": true}, {"name": "B"}]});
        assert_eq!(a, expected);
        assert_eq!(b, expected);
    }

    #[test]
    fn test_index_into_non_array_is_error() {
        let mut root = json!({"items": {"nested": 1}});
        let err = assign_str(&mut root, "items[0].name", json!("A")).unwrap_err();
        assert!(matches!(err, Error::PathConflict { .. }));
        // Prior content is untouched
        assert_eq!(root, json!({"items": {"nested": 1}}));
    }

    #[test]
    fn test_overwrite_placeholder() {
        let mut root = json!({});
        assign_str(&mut root, "items[1]", json!("tail")).unwrap();
        assign_str(&mut root, "items[0]", json!("head")).unwrap();
        assert_eq!(root, json!({"items": ["head", "tail"]}));
    }
}
