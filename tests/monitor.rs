//! Execution monitor tests
//!
//! Use a small shell script as a stand-in runner that prints console
//! lines in the runner's verbose format and writes a result XML file
//! into its `--outputdir`.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use testforge::common::config::Config;
use testforge::common::paths::setup_workspace;
use testforge::monitor::{failure_details, run_streaming, ExecutionEvent};
use testforge::Error;

const FAKE_RUNNER: &str = r#"#!/bin/sh
# args: --console verbose --outputdir <dir> <gen_dir>
OUT="$4"
echo "Generated.TC 001"
echo "Generated.TC 001    | PASS |"
echo "TC 002"
echo "TC 002    | FAIL | 500 != 200"
cat > "$OUT/output.xml" <<'XML'
<?xml version="1.0" encoding="UTF-8"?>
<robot generator="Robot 6.1">
<suite name="Generated">
<test name="TC 001"><status status="PASS"/></test>
<test name="TC 002"><status status="FAIL">500 != 200</status></test>
</suite>
<statistics>
<total>
<stat pass="1" fail="1" skip="0">All Tests</stat>
</total>
</statistics>
</robot>
XML
"#;

// Start lines on stdout, result lines on stderr, as a runner that logs
// warnings mid-suite would interleave them
const SPLIT_STREAM_RUNNER: &str = r#"#!/bin/sh
OUT="$4"
echo "TC 001"
echo "TC 001    | PASS |" >&2
echo "TC 002"
echo "TC 002    | FAIL | boom" >&2
cat > "$OUT/output.xml" <<'XML'
<?xml version="1.0" encoding="UTF-8"?>
<robot generator="Robot 6.1">
<statistics>
<total>
<stat pass="1" fail="1" skip="0">All Tests</stat>
</total>
</statistics>
</robot>
XML
"#;

const BROKEN_RUNNER: &str = r#"#!/bin/sh
OUT="$4"
echo "TC 001"
printf '<?xml version="1.0"?>\n<robot>\n<suite' > "$OUT/output.xml"
"#;

fn write_runner(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("fake-robot.sh");
    fs::write(&path, content).expect("write runner");
    let mut perms = fs::metadata(&path).expect("stat").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod");
    path
}

fn test_config(program: &Path) -> Config {
    let mut config = Config::default();
    config.runner.program = program.display().to_string();
    config.retry.attempts = 3;
    config.retry.delay_ms = 10;
    config.monitor.event_pause_ms = 0;
    config
}

#[tokio::test]
async fn test_streaming_event_order_and_summary() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let workspace = setup_workspace(tmp.path(), "demo").expect("workspace");
    fs::write(workspace.generated.join("TC_001.robot"), "*** Test Cases ***\n")
        .expect("script");

    let runner = write_runner(tmp.path(), FAKE_RUNNER);
    let mut events: Vec<ExecutionEvent> = Vec::new();
    let out_dir = run_streaming(&test_config(&runner), &workspace, |e| {
        events.push(e.clone());
    })
    .await
    .expect("run");

    // Exactly one connect, opening the stream
    assert!(matches!(events.first(), Some(ExecutionEvent::Connect { .. })));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, ExecutionEvent::Connect { .. }))
            .count(),
        1
    );
    // Exactly one done, closing it
    assert!(matches!(events.last(), Some(ExecutionEvent::Done { .. })));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, ExecutionEvent::Done { .. }))
            .count(),
        1
    );

    // Case names come back normalized with underscores
    let starts: Vec<&str> = events
        .iter()
        .filter(|e| matches!(e, ExecutionEvent::Process { .. }))
        .filter_map(|e| e.case())
        .collect();
    assert_eq!(starts, vec!["TC_001", "TC_002"]);

    assert!(events.iter().any(|e| matches!(
        e,
        ExecutionEvent::Pass { case, .. } if case == "TC_001"
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        ExecutionEvent::Fail { case, message } if case == "TC_002" && message == "500 != 200"
    )));

    let Some(ExecutionEvent::Done { summary, .. }) = events.last() else {
        panic!("missing done event");
    };
    assert_eq!(summary.total, 2);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 0);

    // The result file carries per-case failure details
    let xml = fs::read_to_string(out_dir.join("output.xml")).expect("read xml");
    assert_eq!(
        failure_details(&xml, "TC_002").as_deref(),
        Some("Expected: 200, but got: 500")
    );
    assert_eq!(failure_details(&xml, "TC_001"), None);
}

#[tokio::test]
async fn test_stdout_and_stderr_interleave_in_write_order() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let workspace = setup_workspace(tmp.path(), "demo").expect("workspace");
    fs::write(workspace.generated.join("TC_001.robot"), "*** Test Cases ***\n")
        .expect("script");

    let runner = write_runner(tmp.path(), SPLIT_STREAM_RUNNER);
    let mut events: Vec<ExecutionEvent> = Vec::new();
    run_streaming(&test_config(&runner), &workspace, |e| {
        events.push(e.clone());
    })
    .await
    .expect("run");

    // Both streams feed one pipe, so each start precedes its result even
    // though they were written to different descriptors
    let case_events: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            ExecutionEvent::Process { case, .. } => Some(format!("start {case}")),
            ExecutionEvent::Pass { case, .. } => Some(format!("pass {case}")),
            ExecutionEvent::Fail { case, .. } => Some(format!("fail {case}")),
            _ => None,
        })
        .collect();
    assert_eq!(
        case_events,
        vec!["start TC_001", "pass TC_001", "start TC_002", "fail TC_002"]
    );
}

#[tokio::test]
async fn test_truncated_result_file_degrades_to_zero_summary() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let workspace = setup_workspace(tmp.path(), "demo").expect("workspace");
    fs::write(workspace.generated.join("TC_001.robot"), "*** Test Cases ***\n")
        .expect("script");

    let runner = write_runner(tmp.path(), BROKEN_RUNNER);
    let mut events: Vec<ExecutionEvent> = Vec::new();
    run_streaming(&test_config(&runner), &workspace, |e| {
        events.push(e.clone());
    })
    .await
    .expect("run");

    let Some(ExecutionEvent::Done { summary, .. }) = events.last() else {
        panic!("missing done event");
    };
    assert_eq!(summary.total, 0);
    assert_eq!(summary.passed, 0);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn test_missing_runner_is_fatal() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let workspace = setup_workspace(tmp.path(), "demo").expect("workspace");
    fs::write(workspace.generated.join("TC_001.robot"), "*** Test Cases ***\n")
        .expect("script");

    let mut config = Config::default();
    config.runner.program = "definitely-not-a-real-runner".to_string();

    let result = run_streaming(&config, &workspace, |_| {}).await;
    assert!(matches!(result, Err(Error::RunnerNotFound { .. })));
}

#[tokio::test]
async fn test_no_generated_scripts_is_an_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let workspace = setup_workspace(tmp.path(), "demo").expect("workspace");

    let result = run_streaming(&Config::default(), &workspace, |_| {}).await;
    assert!(matches!(result, Err(Error::NoGeneratedScripts(_))));
}
