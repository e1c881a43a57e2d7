//! Row compilation
//!
//! Maps each table row into a request description plus typed response
//! assertions. Request namespaces (`[Request][Body]` and friends) are
//! built by repeated path assignment; response namespaces become
//! [`Assertion`] lists.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::combine;
use crate::common::Result;
use crate::dsl::{self, EXPANSION_MARKER};
use crate::table::Table;

use super::assertion::{
    parse_field_meta, split_type_tag, typed_cell_json, Assertion, CompileWarning, DataType,
};

pub const COL_ENDPOINT: &str = "[API]endpoint";
pub const COL_METHOD: &str = "[API]Method";
pub const COL_STATUS: &str = "[Response][API]status";
pub const PREFIX_REQ_BODY: &str = "[Request][Body]";
pub const PREFIX_REQ_HEADER: &str = "[Request][Header]";
pub const PREFIX_REQ_PARAMS: &str = "[Request][Params]";
pub const PREFIX_REQ_QUERY: &str = "[Request][Query]";
pub const PREFIX_RESP_BODY: &str = "[Response][Body]";
pub const PREFIX_RESP_HEADER: &str = "[Response][Header]";

/// One compiled test case, immutable once built
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Sequential case identifier (`TC_001`, `TC_002`, ...)
    pub name: String,
    pub method: String,
    /// Endpoint relative to the suite base URL, `{param}` placeholders
    /// already substituted
    pub endpoint: String,
    pub expected_status: Option<u16>,
    pub headers: Value,
    pub params: Value,
    pub query: Value,
    pub body: Value,
    pub header_assertions: Vec<Assertion>,
    pub body_assertions: Vec<Assertion>,
}

/// Result of compiling a table: cases plus the leniencies applied
#[derive(Debug)]
pub struct CompileOutcome {
    pub base_url: String,
    pub cases: Vec<TestCase>,
    pub warnings: Vec<CompileWarning>,
}

static PARAM_PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}]+)\}").expect("placeholder regex"));

/// Substitute `{name}` placeholders in an endpoint from the request
/// params map. Unknown placeholders are left as written.
pub fn apply_params(endpoint: &str, params: &Value) -> String {
    PARAM_PLACEHOLDER_RE
        .replace_all(endpoint, |caps: &regex::Captures| {
            match params.get(&caps[1]) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Derive the suite base URL from the first absolute endpoint, falling
/// back to localhost.
fn derive_base_url(table: &Table) -> String {
    let fallback = "http://localhost".to_string();
    let Some(first) = table.cell(0, COL_ENDPOINT) else {
        return fallback;
    };
    if !first.starts_with("http") {
        return fallback;
    }
    let parts: Vec<&str> = first.splitn(4, '/').collect();
    if parts.len() >= 3 {
        format!("{}//{}", parts[0], parts[2])
    } else {
        fallback
    }
}

/// Reduce an absolute URL to its path portion
fn relative_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with("http") {
        let tail: Vec<&str> = endpoint.splitn(4, '/').collect();
        format!("/{}", tail.get(3).copied().unwrap_or_default())
    } else {
        endpoint.to_string()
    }
}

/// Build one request namespace (body/headers/params/query) from the
/// row's columns carrying `prefix`.
///
/// Blank cells omit the field; `[NULL]` inserts a JSON null. Columns with
/// the `[]` marker are collected and fanned out by the array expander.
/// A path that indexes into a non-array value is a hard error, not a
/// silently dropped column.
fn build_namespace(table: &Table, row: usize, prefix: &str) -> Result<Value> {
    let mut root = Value::Object(serde_json::Map::new());
    let mut expansion_columns: Vec<(String, String, DataType)> = Vec::new();

    for (i, header) in table.headers().iter().enumerate() {
        let Some(raw_path) = header.strip_prefix(prefix) else {
            continue;
        };
        let (path, data_type) = split_type_tag(raw_path);
        let cell = table.rows()[row][i].as_str();

        if path.contains(EXPANSION_MARKER) {
            expansion_columns.push((path, cell.to_string(), data_type));
            continue;
        }

        // An explicit type tag overrides inference
        let Some(json) = typed_cell_json(cell, data_type) else {
            continue;
        };
        dsl::assign_str(&mut root, &path, json)?;
    }

    combine::expand_into(&mut root, &expansion_columns)?;
    Ok(root)
}

/// Collect response assertions from the row's columns carrying `prefix`
fn build_assertions(
    table: &Table,
    row: usize,
    prefix: &str,
    warnings: &mut Vec<CompileWarning>,
) -> Vec<Assertion> {
    let mut assertions = Vec::new();
    for (i, header) in table.headers().iter().enumerate() {
        let Some(raw_field) = header.strip_prefix(prefix) else {
            continue;
        };
        let expected = table.rows()[row][i].trim();
        let meta = parse_field_meta(raw_field);
        // Structural operators need no expected value; everything else
        // does, and a blank cell means the assertion is not requested.
        if expected.is_empty() && !meta.operator.is_structural() {
            continue;
        }
        if let Some(op) = meta.unknown_operator {
            warnings.push(CompileWarning::UnknownOperator {
                column: header.clone(),
                operator: op,
            });
        }
        assertions.push(Assertion {
            path: meta.field,
            operator: meta.operator,
            data_type: meta.data_type,
            expected: expected.to_string(),
        });
    }
    assertions
}

/// Compile every row of a table into test cases.
pub fn compile(table: &Table) -> Result<CompileOutcome> {
    let base_url = derive_base_url(table);
    let mut cases = Vec::with_capacity(table.row_count());
    let mut warnings = Vec::new();

    for row in 0..table.row_count() {
        let name = format!("TC_{:03}", row + 1);

        let method = table
            .cell(row, COL_METHOD)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("POST")
            .to_uppercase();

        let expected_status = table
            .cell(row, COL_STATUS)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<u16>().ok());

        let headers = build_namespace(table, row, PREFIX_REQ_HEADER)?;
        let params = build_namespace(table, row, PREFIX_REQ_PARAMS)?;
        let query = build_namespace(table, row, PREFIX_REQ_QUERY)?;
        let body = build_namespace(table, row, PREFIX_REQ_BODY)?;

        let endpoint = table.cell(row, COL_ENDPOINT).unwrap_or_default().trim();
        let endpoint = apply_params(&relative_endpoint(endpoint), &params);

        let header_assertions = build_assertions(table, row, PREFIX_RESP_HEADER, &mut warnings);
        let body_assertions = build_assertions(table, row, PREFIX_RESP_BODY, &mut warnings);

        cases.push(TestCase {
            name,
            method,
            endpoint,
            expected_status,
            headers,
            params,
            query,
            body,
            header_assertions,
            body_assertions,
        });
    }

    Ok(CompileOutcome {
        base_url,
        cases,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::assertion::{DataType, Operator};
    use serde_json::json;

    fn t(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_compile_basic_row() {
        let table = t(
            &[
                "[API]endpoint",
                "[API]Method",
                "[Request][Body]profile.name",
                "[Request][Body]profile.age[Type:int]",
                "[Response][API]status",
                "[Response][Body]ok[Type:bool]",
            ],
            &[&[
                "http://api.example.com/users",
                "get",
                "Ada",
                "36",
                "200",
                "true",
            ]],
        );
        let out = compile(&table).unwrap();
        assert_eq!(out.base_url, "http://api.example.com");
        assert_eq!(out.cases.len(), 1);

        let case = &out.cases[0];
        assert_eq!(case.name, "TC_001");
        assert_eq!(case.method, "GET");
        assert_eq!(case.endpoint, "/users");
        assert_eq!(case.expected_status, Some(200));
        assert_eq!(case.body, json!({"profile": {"name": "Ada", "age": 36}}));
        assert_eq!(case.body_assertions.len(), 1);
        assert_eq!(case.body_assertions[0].path, "ok");
        assert_eq!(case.body_assertions[0].data_type, DataType::Bool);
    }

    #[test]
    fn test_null_sentinel_inserted_blank_omitted() {
        let table = t(
            &[
                "[Request][Body]present",
                "[Request][Body]nulled",
                "[Request][Body]absent",
            ],
            &[&["x", "[NULL]", ""]],
        );
        let out = compile(&table).unwrap();
        assert_eq!(
            out.cases[0].body,
            json!({"present": "x", "nulled": null})
        );
    }

    #[test]
    fn test_endpoint_param_substitution() {
        let table = t(
            &["[API]endpoint", "[Request][Params]id"],
            &[&["https://api.example.com/users/{id}", "42"]],
        );
        let out = compile(&table).unwrap();
        assert_eq!(out.cases[0].endpoint, "/users/42");
    }

    #[test]
    fn test_request_body_array_expansion() {
        let table = t(
            &[
                "[Request][Body]data.items[].name",
                "[Request][Body]data.items[].active",
            ],
            &[&["A,B,C", "true"]],
        );
        let out = compile(&table).unwrap();
        assert_eq!(
            out.cases[0].body,
            json!({"data": {"items": [
                {"name": "A", "active": true},
                {"name": "B", "active": true},
                {"name": "C", "active": true},
            ]}})
        );
    }

    #[test]
    fn test_type_tag_applies_to_expansion_column() {
        let table = t(
            &["[Request][Body]items[].code[Type:string]"],
            &[&["007,008"]],
        );
        let out = compile(&table).unwrap();
        assert_eq!(
            out.cases[0].body,
            json!({"items": [{"code": "007"}, {"code": "008"}]})
        );
    }

    #[test]
    fn test_string_tag_blocks_numeric_inference() {
        let table = t(&["[Request][Body]code[Type:string]"], &[&["007"]]);
        let out = compile(&table).unwrap();
        assert_eq!(out.cases[0].body, json!({"code": "007"}));
    }

    #[test]
    fn test_unknown_operator_warns() {
        let table = t(&["[Response][Body]age:wibble"], &[&["5"]]);
        let out = compile(&table).unwrap();
        assert_eq!(out.cases[0].body_assertions[0].operator, Operator::Eq);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_structural_assertion_without_expected_value() {
        let table = t(&["[Response][Body]data.items:is_array"], &[&[""]]);
        let out = compile(&table).unwrap();
        assert_eq!(out.cases[0].body_assertions.len(), 1);
        assert_eq!(
            out.cases[0].body_assertions[0].operator,
            Operator::IsArray
        );
    }
}
