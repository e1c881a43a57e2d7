//! Suite workspace and configuration paths
//!
//! Each compiled suite gets its own workspace:
//! `<storage root>/<suite name>/generated` for emitted scripts and
//! `<storage root>/<suite name>/Report` for timestamped run output.

use std::io;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "testforge";

/// Directory names inside a suite workspace
pub const GENERATED_DIR: &str = "generated";
pub const REPORT_DIR: &str = "Report";

/// A suite workspace on disk
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub generated: PathBuf,
    pub report: PathBuf,
}

/// Sanitize a suite name for use as a directory name
///
/// Anything outside `[A-Za-z0-9_-]` collapses to `_`; an empty result
/// falls back to a fixed suite name.
pub fn safe_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    let trimmed = out.trim_matches('_').to_string();
    if trimmed.is_empty() {
        "TestForgeSuite".to_string()
    } else {
        trimmed
    }
}

/// Create (if needed) and return the workspace for a suite
pub fn setup_workspace(storage_root: &Path, suite: &str) -> io::Result<Workspace> {
    let root = storage_root.join(safe_name(suite));
    let generated = root.join(GENERATED_DIR);
    let report = root.join(REPORT_DIR);
    std::fs::create_dir_all(&generated)?;
    std::fs::create_dir_all(&report)?;
    Ok(Workspace {
        root,
        generated,
        report,
    })
}

/// Default storage root for suite workspaces
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.local/share/testforge/suites/`
/// - macOS: `~/Library/Application Support/testforge/suites/`
/// - Windows: `%APPDATA%\testforge\suites\`
pub fn default_storage_root() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().join("suites"))
}

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_name_sanitizes() {
        assert_eq!(safe_name("my suite/v2"), "my_suite_v2");
        assert_eq!(safe_name("orders-api"), "orders-api");
        assert_eq!(safe_name("///"), "TestForgeSuite");
        assert_eq!(safe_name(""), "TestForgeSuite");
    }

    #[test]
    fn test_setup_workspace_creates_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = setup_workspace(tmp.path(), "demo suite").unwrap();
        assert!(ws.generated.is_dir());
        assert!(ws.report.is_dir());
        assert!(ws.root.ends_with("demo_suite"));
    }
}
