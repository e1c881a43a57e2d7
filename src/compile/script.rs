//! Test script emission
//!
//! Emits one Robot Framework file per compiled case. The HTTP call runs
//! with `expected_status=any` so status-code assertions execute regardless
//! of outcome, then header and body assertions branch on their operator.

use std::path::Path;

use serde_json::Value;

use crate::common::Result;
use crate::dsl::expansion_split;

use super::assertion::{
    cast_value, split_bounds, Assertion, CastValue, CompileWarning, DataType, Operator,
};
use super::row::{CompileOutcome, TestCase};

const SETTINGS_HEADER: &str = "\
*** Settings ***
Library    RequestsLibrary
Library    JSONLibrary
Library    Collections
Suite Setup    Create Session    api    {base_url}

*** Test Cases ***
";

/// Format a JSON value as a Robot Framework argument
///
/// `${None}`/`${EMPTY}`/`@{EMPTY}`/`&{EMPTY}` for the sentinel values,
/// `${True}`/`${False}` for booleans, numbers as-is, nested structures as
/// compact JSON text.
fn robot_value(value: &Value) -> String {
    match value {
        Value::Null => "${None}".to_string(),
        Value::String(s) if s.is_empty() => "${EMPTY}".to_string(),
        Value::Array(a) if a.is_empty() => "@{EMPTY}".to_string(),
        Value::Object(o) if o.is_empty() => "&{EMPTY}".to_string(),
        Value::Bool(b) => {
            if *b {
                "${True}".to_string()
            } else {
                "${False}".to_string()
            }
        }
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Format a cast expected value as a typed Robot literal
fn robot_literal(value: &CastValue) -> String {
    match value {
        CastValue::Int(n) => format!("${{{n}}}"),
        CastValue::Float(f) => format!("${{{f}}}"),
        CastValue::Bool(b) => {
            if *b {
                "${True}".to_string()
            } else {
                "${False}".to_string()
            }
        }
        CastValue::Str(s) => s.clone(),
    }
}

fn push_dictionary(lines: &mut Vec<String>, var: &str, map: &Value) {
    let Some(obj) = map.as_object() else {
        return;
    };
    if obj.is_empty() {
        return;
    }
    let pairs = obj
        .iter()
        .map(|(k, v)| format!("{k}={}", robot_value(v)))
        .collect::<Vec<_>>()
        .join("    ");
    lines.push(format!("    ${{{var}}}=    Create Dictionary    {pairs}"));
    lines.push(format!("    Log    {var}: ${{{var}}}    console=yes"));
}

fn cast_expected(
    case: &str,
    assertion: &Assertion,
    warnings: &mut Vec<CompileWarning>,
) -> CastValue {
    let (value, fell_back) = cast_value(&assertion.expected, assertion.data_type);
    if fell_back {
        warnings.push(CompileWarning::CastFailed {
            case: case.to_string(),
            field: assertion.path.clone(),
            raw: assertion.expected.clone(),
        });
    }
    value
}

fn push_header_assertion(
    lines: &mut Vec<String>,
    case: &str,
    assertion: &Assertion,
    warnings: &mut Vec<CompileWarning>,
) {
    let actual = format!("${{resp.headers['{}']}}", assertion.path);
    let expected = robot_literal(&cast_expected(case, assertion, warnings));
    let line = match assertion.operator {
        Operator::Ne => format!("    Should Not Be Equal    {actual}    {expected}"),
        Operator::Contains => format!("    Should Contain    {actual}    {expected}"),
        Operator::Regex => format!("    Should Match Regexp    {actual}    {expected}"),
        // Headers support eq/ne/contains/regex; anything else compares equal
        _ => format!("    Should Be Equal    {actual}    {expected}"),
    };
    lines.push(line);
}

/// Emit the array-membership search for a response path containing `[]`:
/// pass iff some element of the array at the base path has the (optional)
/// subfield equal to the expected value.
fn push_array_search(
    lines: &mut Vec<String>,
    case: &str,
    assertion: &Assertion,
    warnings: &mut Vec<CompileWarning>,
) {
    let Some((base, suffix)) = expansion_split(&assertion.path) else {
        return;
    };
    let selector = if suffix.is_empty() {
        format!("$.{base}[*]")
    } else {
        format!("$.{base}[*].{suffix}")
    };
    let expected = robot_literal(&cast_expected(case, assertion, warnings));
    let described = if suffix.is_empty() {
        base.to_string()
    } else {
        format!("{base}[].{suffix}")
    };
    lines.push(format!(
        "    ${{matches}}=    Get Value From Json    ${{json}}    {selector}"
    ));
    lines.push(format!(
        "    List Should Contain Value    ${{matches}}    {expected}    msg=No element at {described} equals {}",
        assertion.expected
    ));
}

fn push_body_assertion(
    lines: &mut Vec<String>,
    case: &str,
    assertion: &Assertion,
    warnings: &mut Vec<CompileWarning>,
) {
    if assertion.path.contains("[]") {
        push_array_search(lines, case, assertion, warnings);
        return;
    }

    lines.push(format!(
        "    ${{value}}=    Get Value From Json    ${{json}}    $.{}",
        assertion.path
    ));
    let actual = "${value[0]}";

    match assertion.operator {
        Operator::IsNull => {
            lines.push(format!("    Should Be Equal    {actual}    ${{None}}"))
        }
        Operator::IsNotNull => {
            lines.push(format!("    Should Not Be Equal    {actual}    ${{None}}"))
        }
        Operator::IsEmpty => lines.push(format!("    Should Be Empty    {actual}")),
        Operator::IsNotEmpty => lines.push(format!("    Should Not Be Empty    {actual}")),
        Operator::IsArray => {
            lines.push(format!("    Should Be True    isinstance({actual}, list)"))
        }
        Operator::IsObject => {
            lines.push(format!("    Should Be True    isinstance({actual}, dict)"))
        }
        Operator::IsString => {
            lines.push(format!("    Should Be True    isinstance({actual}, str)"))
        }
        Operator::IsNumber => lines.push(format!(
            "    Should Be True    isinstance({actual}, (int, float))"
        )),
        Operator::IsBool => {
            lines.push(format!("    Should Be True    isinstance({actual}, bool)"))
        }
        Operator::Gt | Operator::Lt => {
            let expected = robot_literal(&cast_expected(case, assertion, warnings));
            let cmp = if assertion.operator == Operator::Gt { ">" } else { "<" };
            lines.push(format!("    ${{num}}=    Convert To Number    {actual}"));
            lines.push(format!("    Should Be True    ${{num}} {cmp} {expected}"));
        }
        Operator::Between => {
            let (low_raw, high_raw, defaulted) = split_bounds(&assertion.expected);
            if defaulted {
                warnings.push(CompileWarning::DefaultedBound {
                    case: case.to_string(),
                    field: assertion.path.clone(),
                });
            }
            let (low, _) = cast_value(&low_raw, assertion.data_type);
            let (high, _) = cast_value(&high_raw, assertion.data_type);
            lines.push(format!("    ${{num}}=    Convert To Number    {actual}"));
            lines.push(format!(
                "    Should Be True    ${{num}} >= {} and ${{num}} <= {}",
                robot_literal(&low),
                robot_literal(&high)
            ));
        }
        Operator::Eq => {
            let expected = cast_expected(case, assertion, warnings);
            let line = match assertion.data_type {
                DataType::Int => format!(
                    "    Should Be Equal As Integers    {actual}    {}",
                    robot_literal(&expected)
                ),
                DataType::Float => format!(
                    "    Should Be Equal As Numbers    {actual}    {}",
                    robot_literal(&expected)
                ),
                _ => format!(
                    "    Should Be Equal    {actual}    {}",
                    robot_literal(&expected)
                ),
            };
            lines.push(line);
        }
        Operator::Ne => {
            let expected = robot_literal(&cast_expected(case, assertion, warnings));
            lines.push(format!("    Should Not Be Equal    {actual}    {expected}"));
        }
        Operator::Contains => {
            let expected = robot_literal(&cast_expected(case, assertion, warnings));
            lines.push(format!("    Should Contain    {actual}    {expected}"));
        }
        Operator::Regex => {
            let expected = robot_literal(&cast_expected(case, assertion, warnings));
            lines.push(format!("    Should Match Regexp    {actual}    {expected}"));
        }
    }
}

/// Emit the full script text for one case
pub fn emit_script(
    case: &TestCase,
    base_url: &str,
    warnings: &mut Vec<CompileWarning>,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(SETTINGS_HEADER.replace("{base_url}", base_url));
    lines.push(case.name.clone());

    lines.push("    Log    ========== REQUEST ==========    console=yes".to_string());
    lines.push(format!("    Log    Method: {}    console=yes", case.method));
    lines.push(format!(
        "    Log    Endpoint: {}    console=yes",
        case.endpoint
    ));

    push_dictionary(&mut lines, "headers", &case.headers);
    push_dictionary(&mut lines, "query", &case.query);

    let has_body = case.body.as_object().is_some_and(|o| !o.is_empty());
    if has_body {
        // json.loads keeps nested structures intact; Create Dictionary
        // only handles flat maps
        lines.push(format!(
            "    ${{payload}}=    Evaluate    json.loads('''{}''')    json",
            case.body
        ));
        lines.push("    Log    Body: ${payload}    console=yes".to_string());
    }

    let mut call = vec![
        "${resp}=".to_string(),
        format!("{} On Session", case.method),
        "api".to_string(),
        case.endpoint.clone(),
    ];
    if case.query.as_object().is_some_and(|o| !o.is_empty()) {
        call.push("params=${query}".to_string());
    }
    if case.headers.as_object().is_some_and(|o| !o.is_empty()) {
        call.push("headers=${headers}".to_string());
    }
    if has_body {
        call.push("json=${payload}".to_string());
    }
    call.push("expected_status=any".to_string());
    lines.push(format!("    {}", call.join("    ")));

    lines.push("    Log    ========== RESPONSE ==========    console=yes".to_string());
    lines.push("    Log    Status Code: ${resp.status_code}    console=yes".to_string());
    lines.push("    Log    Response Body: ${resp.text}    console=yes".to_string());

    if let Some(status) = case.expected_status {
        lines.push(format!(
            "    Should Be Equal As Integers    ${{resp.status_code}}    {status}"
        ));
    }

    for assertion in &case.header_assertions {
        push_header_assertion(&mut lines, &case.name, assertion, warnings);
    }

    if !case.body_assertions.is_empty() {
        lines.push("    ${json}=    Set Variable    ${resp.json()}".to_string());
        for assertion in &case.body_assertions {
            push_body_assertion(&mut lines, &case.name, assertion, warnings);
        }
    }

    lines.join("\n") + "\n"
}

/// Write one `.robot` file per case into `gen_dir`, returning the case
/// names in order. Cast leniencies found during emission are appended to
/// the outcome's warning list.
pub fn write_scripts(outcome: &mut CompileOutcome, gen_dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(outcome.cases.len());
    let mut warnings = Vec::new();
    for case in &outcome.cases {
        let content = emit_script(case, &outcome.base_url, &mut warnings);
        std::fs::write(gen_dir.join(format!("{}.robot", case.name)), content)?;
        names.push(case.name.clone());
    }
    outcome.warnings.append(&mut warnings);
    Ok(names)
}
