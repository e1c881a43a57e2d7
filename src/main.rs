//! testforge CLI entry point

use clap::Parser;
use testforge::commands::Commands;
use testforge::{cli, common};

#[derive(Parser)]
#[command(name = "testforge", about = "Spreadsheet-driven API test compiler and runner")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    common::logging::init_cli();

    let cli = Cli::parse();
    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
