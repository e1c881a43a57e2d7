//! Runner process supervision
//!
//! Spawns the external test runner with stderr redirected into stdout's
//! pipe, bridges the merged console output into the async world through
//! a bounded channel fed by a blocking reader thread, and classifies
//! lines into execution events.

use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::Duration;

use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::common::config::Config;
use crate::common::paths::Workspace;
use crate::common::{Error, Result};

use super::event::{ExecutionEvent, TestStatus};
use super::results::load_summary;

// Console lines in verbose mode look like:
//   "Generated.TC 001" when a case starts, and
//   "Generated.TC 001    | PASS |" (message after the second bar on FAIL)
// when it finishes. The result form is checked first since a result line
// would also match a loose start pattern.
static RESULT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Generated\.)?(\w+[_\s]\d+)\s+\|\s+(PASS|FAIL|SKIP)\s+\|(.*)$")
        .expect("result line regex")
});
static START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Generated\.)?(\w+[_\s]\d+)\s*$").expect("start line regex"));

/// Kills the runner if the monitor is dropped mid-stream
struct ChildGuard {
    child: Option<Child>,
}

impl ChildGuard {
    fn wait(mut self) -> std::io::Result<ExitStatus> {
        match self.child.take() {
            Some(mut child) => child.wait(),
            None => Err(std::io::Error::other("runner already reaped")),
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn pump_lines<R>(source: R, tx: mpsc::Sender<String>) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        for line in BufReader::new(source).lines() {
            let Ok(line) = line else { break };
            // Send blocks when the consumer lags, bounding memory
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    })
}

/// Map one console line to an event, case names normalized to underscores
fn classify(line: &str) -> Option<ExecutionEvent> {
    if let Some(caps) = RESULT_RE.captures(line) {
        let case = caps[1].trim().replace(' ', "_");
        let status = TestStatus::parse(&caps[2])?;
        let console = caps[3].trim();
        let message = if console.is_empty() {
            format!("Test {status}")
        } else {
            console.to_string()
        };
        return Some(ExecutionEvent::result(case, status, message));
    }
    if let Some(caps) = START_RE.captures(line) {
        let case = caps[1].trim().replace(' ', "_");
        return Some(ExecutionEvent::started(case));
    }
    None
}

fn generated_scripts(workspace: &Workspace) -> Result<Vec<PathBuf>> {
    let mut scripts: Vec<PathBuf> = std::fs::read_dir(&workspace.generated)
        .map_err(|e| Error::file_read(&workspace.generated, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "robot"))
        .collect();
    scripts.sort();
    if scripts.is_empty() {
        return Err(Error::NoGeneratedScripts(
            workspace.generated.display().to_string(),
        ));
    }
    Ok(scripts)
}

/// Run the configured test runner over the workspace's generated scripts,
/// delivering events to `on_event` as they happen.
///
/// `Connect` is emitted before the runner starts and `Done` after the
/// result file has been parsed, so observers always see a well-formed
/// stream even when no case-level line is ever matched. A runner that
/// cannot be spawned at all is a hard error.
pub async fn run_streaming<F>(
    config: &Config,
    workspace: &Workspace,
    mut on_event: F,
) -> Result<PathBuf>
where
    F: FnMut(&ExecutionEvent),
{
    generated_scripts(workspace)?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let out_dir = workspace.report.join(&timestamp);
    std::fs::create_dir_all(&out_dir)?;

    on_event(&ExecutionEvent::connected());

    let mut command = Command::new(&config.runner.program);
    command
        .arg("--console")
        .arg(&config.runner.console)
        .args(&config.runner.args)
        .arg("--outputdir")
        .arg(&out_dir)
        .arg(&workspace.generated);

    // Stdout and stderr share one pipe, so lines arrive in the order the
    // runner wrote them across both streams.
    let (pipe_reader, pipe_writer) = std::io::pipe()?;
    command
        .stdout(pipe_writer.try_clone()?)
        .stderr(pipe_writer);

    info!(program = %config.runner.program, out_dir = %out_dir.display(), "starting runner");
    let child = command.spawn().map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::RunnerNotFound {
                program: config.runner.program.clone(),
            }
        } else {
            Error::RunnerStartFailed {
                program: config.runner.program.clone(),
                source,
            }
        }
    })?;
    // Close the parent's copies of the write end so the reader sees EOF
    // when the runner exits
    drop(command);

    let (tx, mut rx) = mpsc::channel::<String>(config.monitor.queue_capacity);
    pump_lines(pipe_reader, tx);

    let guard = ChildGuard { child: Some(child) };
    let poll = Duration::from_millis(config.monitor.poll_timeout_ms);
    let pause = Duration::from_millis(config.monitor.event_pause_ms);

    loop {
        match tokio::time::timeout(poll, rx.recv()).await {
            // Channel closed: the reader thread drained the pipe to EOF
            Ok(None) => break,
            Ok(Some(line)) => {
                debug!(%line, "runner output");
                if let Some(event) = classify(&line) {
                    on_event(&event);
                    // Give downstream consumers a chance to flush
                    tokio::time::sleep(pause).await;
                }
            }
            Err(_) => continue,
        }
    }

    let status = tokio::task::spawn_blocking(move || guard.wait())
        .await
        .map_err(|e| Error::Internal(format!("runner wait task failed: {e}")))??;
    if !status.success() {
        // Non-zero exit is normal when cases fail, the summary tells the story
        debug!(?status, "runner exited non-zero");
    }

    let summary = load_summary(&out_dir.join("output.xml"), &config.retry).await;
    if summary.total == 0 {
        warn!("no statistics found in result file");
    }
    on_event(&ExecutionEvent::Done {
        message: summary.completion_message(),
        summary,
        timestamp,
    });

    Ok(out_dir)
}
