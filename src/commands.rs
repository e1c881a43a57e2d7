//! CLI command definitions
//!
//! Defines the clap commands for the testforge CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a definition sheet into runnable test scripts
    Compile {
        /// CSV definition sheet, one test case per row
        sheet: PathBuf,

        /// Suite name, used as the workspace directory
        #[arg(long, short, default_value = "default")]
        suite: String,

        /// Treat the sheet as a combination sheet and expand it first
        #[arg(long)]
        combine: bool,
    },

    /// Expand a combination sheet into one row per parameter combination
    Combine {
        /// CSV combination sheet
        sheet: PathBuf,

        /// Where to write the expanded sheet (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Require parameter columns to carry equal value counts
        #[arg(long)]
        strict: bool,
    },

    /// Run a suite's compiled scripts and stream execution events
    Run {
        /// Suite whose generated scripts should run
        #[arg(long, short, default_value = "default")]
        suite: String,

        /// Emit events as JSON lines instead of colored text
        #[arg(long)]
        json: bool,
    },

    /// Write an example definition sheet to get started
    Example {
        /// Output path for the sheet
        #[arg(default_value = "example.csv")]
        output: PathBuf,
    },
}
