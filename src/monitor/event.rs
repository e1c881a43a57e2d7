//! Execution event wire format
//!
//! Events serialize as `{"type": "...", "data": {...}}` JSON objects so a
//! frontend can consume the stream line by line.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a single test case as reported on the runner console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
}

impl TestStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "PASS" => Some(Self::Pass),
            "FAIL" => Some(Self::Fail),
            "SKIP" => Some(Self::Skip),
            _ => None,
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Final statistics extracted from the runner's XML result file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
}

impl ExecutionSummary {
    pub fn completion_message(&self) -> String {
        format!(
            "Completed: {} passed, {} failed, {} skipped",
            self.passed, self.failed, self.skipped
        )
    }
}

/// One event in the live execution stream
///
/// Ordering invariant: `Connect` is always first and `Done` always last.
/// `Process` announces a case starting, `Pass`/`Fail`/`Skip` report its
/// result with the console message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ExecutionEvent {
    Connect {
        message: String,
    },
    Process {
        case: String,
        message: String,
    },
    Pass {
        case: String,
        message: String,
    },
    Fail {
        case: String,
        message: String,
    },
    Skip {
        case: String,
        message: String,
    },
    Done {
        summary: ExecutionSummary,
        timestamp: String,
        message: String,
    },
}

impl ExecutionEvent {
    pub fn connected() -> Self {
        Self::Connect {
            message: "Test execution started".to_string(),
        }
    }

    pub fn started(case: String) -> Self {
        Self::Process {
            message: format!("Running {case}"),
            case,
        }
    }

    pub fn result(case: String, status: TestStatus, message: String) -> Self {
        match status {
            TestStatus::Pass => Self::Pass { case, message },
            TestStatus::Fail => Self::Fail { case, message },
            TestStatus::Skip => Self::Skip { case, message },
        }
    }

    /// Case name the event refers to, if any
    pub fn case(&self) -> Option<&str> {
        match self {
            Self::Process { case, .. }
            | Self::Pass { case, .. }
            | Self::Fail { case, .. }
            | Self::Skip { case, .. } => Some(case),
            Self::Connect { .. } | Self::Done { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let event = ExecutionEvent::result(
            "TC_001".to_string(),
            TestStatus::Pass,
            "Test pass".to_string(),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "pass");
        assert_eq!(json["data"]["case"], "TC_001");
        assert_eq!(json["data"]["message"], "Test pass");
    }

    #[test]
    fn test_done_carries_summary() {
        let summary = ExecutionSummary {
            total: 3,
            passed: 2,
            failed: 1,
            skipped: 0,
        };
        let event = ExecutionEvent::Done {
            message: summary.completion_message(),
            summary,
            timestamp: "2024-01-01_00-00-00".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "done");
        assert_eq!(json["data"]["summary"]["passed"], 2);
        assert_eq!(
            json["data"]["message"],
            "Completed: 2 passed, 1 failed, 0 skipped"
        );
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(TestStatus::parse("PASS"), Some(TestStatus::Pass));
        assert_eq!(TestStatus::parse("fail"), Some(TestStatus::Fail));
        assert_eq!(TestStatus::parse("WARN"), None);
    }
}
