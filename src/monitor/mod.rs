//! Live execution monitoring
//!
//! Runs the external test runner over generated scripts and turns its
//! console output into a stream of structured events, finishing with a
//! summary parsed from the XML result file.

mod event;
mod results;
mod runner;

pub use event::{ExecutionEvent, ExecutionSummary, TestStatus};
pub use results::{failure_details, format_error_message, load_summary, parse_summary};
pub use runner::run_streaming;
