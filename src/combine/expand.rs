//! Array-notation expansion
//!
//! Columns whose path contains the literal `[]` marker fan comma-separated
//! cell values out into parallel array elements. All columns sharing the
//! prefix before `[]` form one expansion group; the group materializes as
//! a single array assigned at that base path.

use serde_json::Value;

use crate::common::Result;
use crate::compile::{typed_cell_json, DataType};
use crate::dsl::{self, CellValue};

/// One column of an expansion group: the field suffix after `[]`, the
/// candidate values split from the cell, and the column's declared type
#[derive(Debug)]
struct Member {
    suffix: String,
    values: Vec<String>,
    data_type: DataType,
}

/// One expansion group collected from a row's `[]`-marked columns
#[derive(Debug)]
struct Group {
    base: String,
    members: Vec<Member>,
}

/// Expand `[]`-marked columns of one row into arrays assigned at their
/// base paths inside `root`. Each column carries the `DataType` parsed
/// from its header tag, applied to every candidate value.
///
/// Group cardinality is the longest comma-split among its members for
/// this row. Members with fewer values reuse their last value for the
/// remaining elements; single values broadcast to every element.
pub fn expand_into(root: &mut Value, columns: &[(String, String, DataType)]) -> Result<()> {
    let mut groups: Vec<Group> = Vec::new();

    for (path, cell, data_type) in columns {
        let Some((base, suffix)) = dsl::expansion_split(path) else {
            continue;
        };
        let normalized = CellValue::normalize(cell);
        if normalized.is_omit() {
            continue;
        }
        let values = match &normalized {
            CellValue::Str(s) if s.contains(',') => {
                s.split(',').map(|p| p.trim().to_string()).collect()
            }
            _ => vec![cell.trim().to_string()],
        };
        let member = Member {
            suffix: suffix.to_string(),
            values,
            data_type: *data_type,
        };

        match groups.iter_mut().find(|g| g.base == base) {
            Some(group) => group.members.push(member),
            None => groups.push(Group {
                base: base.to_string(),
                members: vec![member],
            }),
        }
    }

    for group in &groups {
        let cardinality = group
            .members
            .iter()
            .map(|m| m.values.len())
            .max()
            .unwrap_or(0);
        if cardinality == 0 {
            continue;
        }

        let mut elements: Vec<Value> = Vec::with_capacity(cardinality);
        for i in 0..cardinality {
            let mut element = Value::Object(serde_json::Map::new());
            let mut scalar = None;
            for member in &group.members {
                // Shorter members reuse their last value
                let Some(raw) = member.values.get(i).or_else(|| member.values.last()) else {
                    continue;
                };
                let Some(json) = typed_cell_json(raw, member.data_type) else {
                    continue;
                };
                if member.suffix.is_empty() {
                    scalar = Some(json);
                } else {
                    dsl::assign_str(&mut element, &member.suffix, json)?;
                }
            }
            elements.push(scalar.unwrap_or(element));
        }

        dsl::assign_str(root, &group.base, Value::Array(elements))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cols(pairs: &[(&str, &str)]) -> Vec<(String, String, DataType)> {
        pairs
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string(), DataType::Unset))
            .collect()
    }

    #[test]
    fn test_comma_fanout_with_broadcast() {
        let mut root = json!({});
        expand_into(
            &mut root,
            &cols(&[
                ("data.items[].name", "A,B,C"),
                ("data.items[].active", "true"),
            ]),
        )
        .unwrap();
        assert_eq!(
            root,
            json!({"data": {"items": [
                {"name": "A", "active": true},
                {"name": "B", "active": true},
                {"name": "C", "active": true},
            ]}})
        );
    }

    #[test]
    fn test_shorter_member_reuses_last_value() {
        let mut root = json!({});
        expand_into(
            &mut root,
            &cols(&[
                ("items[].id", "1,2,3"),
                ("items[].tag", "x,y"),
            ]),
        )
        .unwrap();
        assert_eq!(
            root,
            json!({"items": [
                {"id": 1, "tag": "x"},
                {"id": 2, "tag": "y"},
                {"id": 3, "tag": "y"},
            ]})
        );
    }

    #[test]
    fn test_scalar_suffix() {
        let mut root = json!({});
        expand_into(&mut root, &cols(&[("data.codes[]", "X1,X2")])).unwrap();
        assert_eq!(root, json!({"data": {"codes": ["X1", "X2"]}}));
    }

    #[test]
    fn test_typed_member_blocks_inference_per_candidate() {
        let mut root = json!({});
        expand_into(
            &mut root,
            &[
                (
                    "items[].code".to_string(),
                    "007,008".to_string(),
                    DataType::String,
                ),
                (
                    "items[].qty".to_string(),
                    "1,2".to_string(),
                    DataType::Int,
                ),
            ],
        )
        .unwrap();
        assert_eq!(
            root,
            json!({"items": [
                {"code": "007", "qty": 1},
                {"code": "008", "qty": 2},
            ]})
        );
    }

    #[test]
    fn test_blank_member_is_skipped() {
        let mut root = json!({});
        expand_into(
            &mut root,
            &cols(&[("items[].name", "A,B"), ("items[].note", "")]),
        )
        .unwrap();
        assert_eq!(
            root,
            json!({"items": [{"name": "A"}, {"name": "B"}]})
        );
    }
}
