//! Common utilities shared across the compiler and the monitor

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};
