//! testforge - spreadsheet-driven API test compiler and runner
//!
//! Compiles tabular API test definitions into Robot Framework suites:
//! each row becomes a test case, column headers carry field paths into
//! request payloads and response assertions. The monitor half runs the
//! generated suite and streams per-case results as structured events.

pub mod cli;
pub mod combine;
pub mod commands;
pub mod common;
pub mod compile;
pub mod dsl;
pub mod monitor;
pub mod table;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use table::Table;
