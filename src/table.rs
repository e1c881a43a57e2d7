//! Tabular input interface
//!
//! The compiler consumes rows × named columns of text. Parsing raw file
//! bytes (CSV/XLSX) is the caller's job; the CLI ships a thin CSV adapter.

use crate::common::{Error, Result};

/// Column prefixes that mark a metadata column. Metadata columns carry a
/// single value that is broadcast across generated combinations instead of
/// multiplying them.
pub const METADATA_PREFIXES: &[&str] = &["[API]endpoint", "[API]Method"];

/// An in-memory table: ordered headers plus rows of string cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table; headers are trimmed, short rows are padded with
    /// empty cells so every row has one cell per column.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if headers.is_empty() {
            return Err(Error::EmptyTable);
        }
        let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell text by row index and column header, if both exist
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// Whether a header names a metadata column (endpoint/method)
    pub fn is_metadata_column(header: &str) -> bool {
        let lower = header.trim().to_lowercase();
        METADATA_PREFIXES
            .iter()
            .any(|p| lower.starts_with(&p.to_lowercase()))
    }

    /// Validate that all parameter columns carry the same number of
    /// non-empty values. Metadata columns are exempt: a single endpoint
    /// or method is broadcast to every generated case.
    pub fn validate_balanced(&self) -> Result<()> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for (i, header) in self.headers.iter().enumerate() {
            if Self::is_metadata_column(header) {
                continue;
            }
            let count = self
                .rows
                .iter()
                .filter(|r| !r[i].trim().is_empty())
                .count();
            counts.push((header.as_str(), count));
        }

        let distinct: std::collections::BTreeSet<usize> =
            counts.iter().map(|(_, c)| *c).collect();
        if distinct.len() > 1 {
            let detail = counts
                .iter()
                .map(|(h, c)| format!("{h}={c}"))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(Error::UnbalancedColumns { detail });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_short_rows_are_padded() {
        let table = t(&["a", "b", "c"], &[&["1"]]);
        assert_eq!(table.cell(0, "b"), Some(""));
        assert_eq!(table.cell(0, "c"), Some(""));
    }

    #[test]
    fn test_metadata_column_detection() {
        assert!(Table::is_metadata_column("[API]endpoint"));
        assert!(Table::is_metadata_column("[api]method"));
        assert!(!Table::is_metadata_column("[Request][Body]name"));
    }

    #[test]
    fn test_balanced_validation() {
        let ok = t(
            &["[API]endpoint", "[Request][Body]a", "[Request][Body]b"],
            &[&["/ping", "1", "x"], &["", "2", "y"]],
        );
        assert!(ok.validate_balanced().is_ok());

        let bad = t(
            &["[Request][Body]a", "[Request][Body]b"],
            &[&["1", "x"], &["2", ""]],
        );
        assert!(matches!(
            bad.validate_balanced(),
            Err(Error::UnbalancedColumns { .. })
        ));
    }
}
