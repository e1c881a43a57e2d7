//! Field path tokenizer
//!
//! Paths address into nested structures with dotted keys and bracketed
//! indices: `a.b[2].c`. A bare `[]` is the array expansion marker and is
//! handled by the combination expander, never by direct assignment.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::common::{Error, Result};

/// One step of a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    /// Object key
    Key(String),
    /// Array index
    Index(usize),
}

/// A parsed field path
pub type FieldPath = Vec<PathToken>;

/// The literal marker that fans a column out into array elements
pub const EXPANSION_MARKER: &str = "[]";

static SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^\[.\]]+)|\[(\d+)\]").expect("segment regex"));

/// Tokenize a field path into keys and indices.
///
/// Rejects the bare `[]` expansion marker (use [`expansion_split`]),
/// index-first paths, and consecutive indices (`a[0][1]` has no key
/// naming the inner array).
pub fn tokenize(path: &str) -> Result<FieldPath> {
    if path.trim().is_empty() {
        return Err(Error::invalid_path(path, "empty path"));
    }
    if path.contains(EXPANSION_MARKER) {
        return Err(Error::invalid_path(
            path,
            "expansion marker [] is not valid for direct assignment",
        ));
    }

    let mut tokens = FieldPath::new();
    for caps in SEGMENT_RE.captures_iter(path) {
        if let Some(key) = caps.get(1) {
            tokens.push(PathToken::Key(key.as_str().to_string()));
        } else if let Some(idx) = caps.get(2) {
            let n: usize = idx
                .as_str()
                .parse()
                .map_err(|_| Error::invalid_path(path, "index out of range"))?;
            match tokens.last() {
                None => {
                    return Err(Error::invalid_path(
                        path,
                        "index token must follow the key naming its array",
                    ))
                }
                Some(PathToken::Index(_)) => {
                    return Err(Error::invalid_path(
                        path,
                        "consecutive index tokens are not allowed",
                    ))
                }
                Some(PathToken::Key(_)) => {}
            }
            tokens.push(PathToken::Index(n));
        }
    }

    if tokens.is_empty() {
        return Err(Error::invalid_path(path, "no tokens"));
    }
    Ok(tokens)
}

/// Split a path around the `[]` expansion marker.
///
/// `data.items[].name` → `("data.items", "name")`. The suffix may be
/// empty (`data.codes[]` expands to an array of scalars). Returns `None`
/// for paths without the marker.
pub fn expansion_split(path: &str) -> Option<(&str, &str)> {
    let pos = path.find(EXPANSION_MARKER)?;
    let base = &path[..pos];
    let mut suffix = &path[pos + EXPANSION_MARKER.len()..];
    suffix = suffix.strip_prefix('.').unwrap_or(suffix);
    Some((base, suffix))
}
