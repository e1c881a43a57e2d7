//! Configuration file handling

use std::path::PathBuf;

use serde::Deserialize;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Suite storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// External runner invocation
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Execution monitor tuning
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Result-file retry settings
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Where suite workspaces live
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory for suite workspaces. Defaults to the platform data dir.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { root: None }
    }
}

/// External test runner settings
#[derive(Debug, Deserialize, Clone)]
pub struct RunnerConfig {
    /// Runner executable name or path
    #[serde(default = "default_runner_program")]
    pub program: String,

    /// Console mode passed via `--console` for per-case progress lines
    #[serde(default = "default_console_mode")]
    pub console: String,

    /// Extra arguments appended before the input directory
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: default_runner_program(),
            console: default_console_mode(),
            args: Vec::new(),
        }
    }
}

fn default_runner_program() -> String {
    "robot".to_string()
}
fn default_console_mode() -> String {
    "verbose".to_string()
}

/// Execution monitor tuning
#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    /// Bounded hand-off queue capacity between reader thread and consumer
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// How long the consumer waits on the queue before yielding (ms)
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_ms: u64,

    /// Cooperative pause after each emitted event so downstream
    /// transports can flush (ms)
    #[serde(default = "default_event_pause")]
    pub event_pause_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            poll_timeout_ms: default_poll_timeout(),
            event_pause_ms: default_event_pause(),
        }
    }
}

fn default_queue_capacity() -> usize {
    256
}
fn default_poll_timeout() -> u64 {
    100
}
fn default_event_pause() -> u64 {
    10
}

/// Result-file parse retry settings
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum parse attempts before degrading to the zero summary
    #[serde(default = "default_retry_attempts")]
    pub attempts: u32,

    /// Fixed delay between attempts (ms)
    #[serde(default = "default_retry_delay")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_retry_attempts(),
            delay_ms: default_retry_delay(),
        }
    }
}

fn default_retry_attempts() -> u32 {
    20
}
fn default_retry_delay() -> u64 {
    200
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| super::Error::file_read(&path, e))?;
                return toml::from_str(&content)
                    .map_err(|e| super::Error::ConfigParse(e.to_string()));
            }
        }
        Ok(Self::default())
    }
}
