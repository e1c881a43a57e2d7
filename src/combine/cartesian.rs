//! Cartesian combination generation
//!
//! Turns a sheet of per-column candidate values into one row per element
//! of the cartesian product. Metadata columns (endpoint/method) broadcast
//! a single value; parameter columns contribute every non-blank value
//! they contain, regardless of row alignment.

use crate::common::Result;
use crate::dsl::CellValue;
use crate::table::Table;

/// Expand a table into its full cartesian product.
///
/// Output ordering is lexicographic by column order then value index, so
/// the result is deterministic for a given input.
pub fn combine(table: &Table) -> Result<Table> {
    let headers = table.headers().to_vec();

    // Collect candidate values per column. Cells are normalized so that
    // whitespace-only cells drop out; everything else keeps its original
    // text form for the output sheet.
    let mut per_column: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for row in table.rows() {
        for (i, header) in headers.iter().enumerate() {
            let raw = row[i].trim();
            if CellValue::normalize(raw).is_omit() {
                continue;
            }
            if Table::is_metadata_column(header) {
                // Metadata: only the first value counts
                if per_column[i].is_empty() {
                    per_column[i].push(Some(raw.to_string()));
                }
            } else {
                per_column[i].push(Some(raw.to_string()));
            }
        }
    }

    // A column with no values still participates without multiplying the
    // product: it degenerates to a single blank placeholder.
    for column in per_column.iter_mut() {
        if column.is_empty() {
            column.push(None);
        }
    }

    let mut out_rows: Vec<Vec<String>> = vec![Vec::new()];
    for column in &per_column {
        let mut next = Vec::with_capacity(out_rows.len() * column.len());
        for prefix in &out_rows {
            for value in column {
                let mut row = prefix.clone();
                row.push(value.clone().unwrap_or_default());
                next.push(row);
            }
        }
        out_rows = next;
    }

    Table::new(headers, out_rows)
}
