//! Result file parsing
//!
//! The runner writes its XML result file incrementally, so a parse attempt
//! can race against the writer. [`load_summary`] gates each attempt behind
//! cheap preconditions (file present, XML declaration in the head, closing
//! root tag near the tail) and retries on a fixed schedule before degrading
//! to a zero summary.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::time::Duration;

use roxmltree::{Document, Node};
use tracing::{debug, warn};

use crate::common::config::RetryConfig;

use super::event::ExecutionSummary;

const HEAD_PROBE: usize = 256;
const TAIL_PROBE: u64 = 4096;

/// Check whether the file looks fully written without parsing it
fn looks_complete(path: &Path) -> bool {
    let Ok(mut file) = std::fs::File::open(path) else {
        return false;
    };
    let Ok(meta) = file.metadata() else {
        return false;
    };
    let size = meta.len();
    if size == 0 {
        return false;
    }

    let mut head = vec![0u8; HEAD_PROBE.min(size as usize)];
    if file.read_exact(&mut head).is_err() {
        return false;
    }
    if !head.windows(5).any(|w| w == b"<?xml") {
        return false;
    }

    let tail_start = size.saturating_sub(TAIL_PROBE);
    if file.seek(SeekFrom::Start(tail_start)).is_err() {
        return false;
    }
    let mut tail = Vec::with_capacity(TAIL_PROBE as usize);
    if file.read_to_end(&mut tail).is_err() {
        return false;
    }
    tail.windows(8).any(|w| w == b"</robot>")
}

fn attr_count(node: Node<'_, '_>, name: &str) -> u32 {
    node.attribute(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Extract the total statistics line from parsed result XML
pub fn parse_summary(xml: &str) -> Option<ExecutionSummary> {
    let doc = Document::parse(xml).ok()?;
    let stat = doc
        .descendants()
        .find(|n| n.has_tag_name("statistics"))?
        .children()
        .find(|n| n.has_tag_name("total"))?
        .children()
        .find(|n| n.has_tag_name("stat"))?;

    let passed = attr_count(stat, "pass");
    let failed = attr_count(stat, "fail");
    let skipped = attr_count(stat, "skip");
    Some(ExecutionSummary {
        total: passed + failed + skipped,
        passed,
        failed,
        skipped,
    })
}

/// Parse the result file, retrying while the runner may still be writing
/// it. Falls back to an all-zero summary if no attempt succeeds.
pub async fn load_summary(path: &Path, retry: &RetryConfig) -> ExecutionSummary {
    let delay = Duration::from_millis(retry.delay_ms);
    for attempt in 1..=retry.attempts {
        if !looks_complete(path) {
            debug!(?path, attempt, "result file not complete yet");
            tokio::time::sleep(delay).await;
            continue;
        }
        match std::fs::read_to_string(path) {
            Ok(xml) => {
                if let Some(summary) = parse_summary(&xml) {
                    return summary;
                }
                debug!(?path, attempt, "result file has no statistics yet");
            }
            Err(error) => {
                debug!(?path, attempt, %error, "could not read result file");
            }
        }
        tokio::time::sleep(delay).await;
    }
    warn!(?path, "giving up on result file, reporting empty summary");
    ExecutionSummary::default()
}

fn direct_status<'a>(node: Node<'a, 'a>) -> Option<Node<'a, 'a>> {
    node.children().find(|n| n.has_tag_name("status"))
}

fn keyword_args(kw: Node<'_, '_>) -> Vec<String> {
    kw.children()
        .filter(|n| n.has_tag_name("arg"))
        .filter_map(|n| n.text().map(str::to_string))
        .collect()
}

/// Pull the most useful error text out of a failed test's keywords
fn keyword_error(test: Node<'_, '_>) -> Option<String> {
    for kw in test.descendants().filter(|n| n.has_tag_name("kw")) {
        let Some(status) = direct_status(kw) else {
            continue;
        };
        if status.attribute("status") != Some("FAIL") {
            continue;
        }
        let name = kw.attribute("name").unwrap_or("Keyword");
        let status_text = status.text().unwrap_or("").trim();

        if name.contains("Should Be Equal") {
            let args = keyword_args(kw);
            if args.len() >= 2 {
                return Some(format!("Expected: {}, but got: {}", args[1], args[0]));
            }
        }

        for msg in kw.descendants().filter(|n| n.has_tag_name("msg")) {
            if msg.attribute("level") == Some("FAIL") {
                if let Some(text) = msg.text() {
                    let text = text.trim();
                    if !text.is_empty() && text != status_text {
                        return Some(format!("{name}: {text}"));
                    }
                }
            }
        }

        if !status_text.is_empty() {
            return Some(format!("{name}: {status_text}"));
        }
    }
    None
}

/// Rewrite common runner comparison messages into an expected/actual form
pub fn format_error_message(raw: &str) -> String {
    if let Some((actual, expected)) = raw.split_once("!=") {
        return format!(
            "Expected: {}, but got: {}",
            expected.trim(),
            actual.trim()
        );
    }
    if raw.contains("==") && raw.to_lowercase().contains("should not") {
        if let Some((value, _)) = raw.split_once("==") {
            return format!("Expected different values, but both were: {}", value.trim());
        }
    }
    if let Some((_, rest)) = raw.split_once("AssertionError:") {
        return rest.trim().to_string();
    }
    raw.to_string()
}

/// Detailed failure message for one test case, read from the result file
///
/// Case name matching tolerates spaces in place of underscores.
pub fn failure_details(xml: &str, case: &str) -> Option<String> {
    let doc = Document::parse(xml).ok()?;
    let test = doc.descendants().find(|n| {
        n.has_tag_name("test")
            && n.attribute("name")
                .map(|name| name.replace(' ', "_") == case || name == case)
                .unwrap_or(false)
    })?;
    let status = direct_status(test)?;
    if status.attribute("status") != Some("FAIL") {
        return None;
    }
    if let Some(detail) = keyword_error(test) {
        return Some(detail);
    }
    match status.text().map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => Some(format_error_message(text)),
        None => Some("Test failed".to_string()),
    }
}
