//! CLI command handling
//!
//! Dispatches CLI commands, reads and writes CSV sheets and formats the
//! execution event stream for the terminal.

use std::io::Write;
use std::path::{Path, PathBuf};

use colored::Colorize;
use tracing::{info, warn};

use crate::combine;
use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::paths::{default_storage_root, setup_workspace};
use crate::common::{Error, Result};
use crate::compile::{compile, write_scripts};
use crate::monitor::{failure_details, run_streaming, ExecutionEvent};
use crate::table::Table;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    let config = Config::load()?;

    match command {
        Commands::Compile {
            sheet,
            suite,
            combine: expand,
        } => {
            let mut table = read_sheet(&sheet)?;
            if expand {
                table = combine::combine(&table)?;
            }

            let mut outcome = compile(&table)?;
            let workspace = setup_workspace(&storage_root(&config), &suite)?;
            clear_scripts(&workspace.generated)?;
            let names = write_scripts(&mut outcome, &workspace.generated)?;

            for warning in &outcome.warnings {
                warn!("{warning}");
                println!("{} {warning}", "warning:".yellow().bold());
            }
            println!(
                "Compiled {} case(s) against {} into {}",
                names.len(),
                outcome.base_url,
                workspace.generated.display()
            );
            Ok(())
        }

        Commands::Combine {
            sheet,
            output,
            strict,
        } => {
            let table = read_sheet(&sheet)?;
            if strict {
                table.validate_balanced()?;
            }
            let expanded = combine::combine(&table)?;
            match output {
                Some(path) => {
                    write_sheet(&expanded, std::fs::File::create(&path)?)?;
                    println!(
                        "Expanded {} row(s) into {} combination(s) at {}",
                        table.row_count(),
                        expanded.row_count(),
                        path.display()
                    );
                }
                None => write_sheet(&expanded, std::io::stdout().lock())?,
            }
            Ok(())
        }

        Commands::Run { suite, json } => {
            let workspace = setup_workspace(&storage_root(&config), &suite)?;
            info!(suite = %suite, root = %workspace.root.display(), "running suite");

            let mut failed: Vec<String> = Vec::new();
            let out_dir = run_streaming(&config, &workspace, |event| {
                if json {
                    if let Ok(line) = serde_json::to_string(event) {
                        println!("{line}");
                    }
                } else {
                    print_event(event);
                }
                if let ExecutionEvent::Fail { case, .. } = event {
                    failed.push(case.clone());
                }
            })
            .await?;

            if !json && !failed.is_empty() {
                print_failure_details(&out_dir, &failed);
            }
            Ok(())
        }

        Commands::Example { output } => {
            write_sheet(&example_table()?, std::fs::File::create(&output)?)?;
            println!("Wrote example sheet to {}", output.display());
            Ok(())
        }
    }
}

fn storage_root(config: &Config) -> PathBuf {
    config
        .storage
        .root
        .clone()
        .or_else(default_storage_root)
        .unwrap_or_else(|| PathBuf::from("storage"))
}

/// Read a CSV sheet, first record as headers
fn read_sheet(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = reader.records();
    let headers = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => return Err(Error::EmptyTable),
    };
    let mut rows = Vec::new();
    for record in records {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Table::new(headers, rows)
}

fn write_sheet<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(table.headers())?;
    for row in table.rows() {
        out.write_record(row)?;
    }
    out.flush()?;
    Ok(())
}

/// Remove stale scripts so a recompile fully replaces the suite
fn clear_scripts(gen_dir: &Path) -> Result<()> {
    for entry in std::fs::read_dir(gen_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "robot") {
            std::fs::remove_file(path)?;
        }
    }
    Ok(())
}

fn print_event(event: &ExecutionEvent) {
    match event {
        ExecutionEvent::Connect { message } => println!("{}", message.dimmed()),
        ExecutionEvent::Process { case, .. } => {
            println!("{} {case}", "RUN ".cyan());
        }
        ExecutionEvent::Pass { case, message } => {
            println!("{} {case}  {}", "PASS".green().bold(), message.dimmed());
        }
        ExecutionEvent::Fail { case, message } => {
            println!("{} {case}  {message}", "FAIL".red().bold());
        }
        ExecutionEvent::Skip { case, message } => {
            println!("{} {case}  {}", "SKIP".yellow(), message.dimmed());
        }
        ExecutionEvent::Done {
            message, timestamp, ..
        } => {
            println!("{} ({timestamp})", message.bold());
        }
    }
}

fn print_failure_details(out_dir: &Path, failed: &[String]) {
    let Ok(xml) = std::fs::read_to_string(out_dir.join("output.xml")) else {
        return;
    };
    println!("\nFailure details:");
    for case in failed {
        match failure_details(&xml, case) {
            Some(detail) => println!("  {} {detail}", case.red()),
            None => println!("  {} no details recorded", case.red()),
        }
    }
}

/// A small sheet covering endpoint templating, nested bodies, typed
/// assertions and operators
fn example_table() -> Result<Table> {
    let columns: &[(&str, [&str; 3])] = &[
        (
            "[API]endpoint",
            [
                "https://api.example.com/users/{id}",
                "https://api.example.com/products",
                "https://api.example.com/orders/{orderId}",
            ],
        ),
        ("[API]Method", ["GET", "POST", "PUT"]),
        ("[Request][Params]id", ["42", "", ""]),
        ("[Request][Params]orderId", ["", "", "900"]),
        ("[Request][Header]x-api-key", ["key123", "key456", ""]),
        (
            "[Request][Header]authorization",
            ["", "Bearer token456", "Bearer token789"],
        ),
        ("[Request][Query]status", ["ACTIVE", "INACTIVE", "PENDING"]),
        ("[Request][Query]page", ["1", "2", ""]),
        ("[Request][Body]username", ["", "john_doe", "jane_smith"]),
        (
            "[Request][Body]profile.name",
            ["", "John Doe", "Jane Smith"],
        ),
        ("[Request][Body]profile.age[Type:int]", ["", "25", "30"]),
        (
            "[Request][Body]settings.notifications[Type:bool]",
            ["", "true", "false"],
        ),
        ("[Request][Body]children[0].name", ["", "Alice", "Bob"]),
        ("[Response][API]status", ["200", "201", "200"]),
        ("[Response][Body]success[Type:bool]", ["true", "true", "true"]),
        ("[Response][Body]data.id", ["123", "456", "789"]),
        ("[Response][Body]data.total:gt[Type:int]", ["0", "10", "5"]),
        (
            "[Response][Body]data.score:between[Type:float]",
            ["", "50.0,100.0", "0.0,50.0"],
        ),
        (
            "[Response][Body]data.message:contains",
            ["success", "", "completed"],
        ),
        (
            "[Response][Header]x-request-id",
            ["req-001", "req-002", "req-003"],
        ),
    ];

    let headers = columns.iter().map(|(h, _)| h.to_string()).collect();
    let rows = (0..3)
        .map(|i| columns.iter().map(|(_, vals)| vals[i].to_string()).collect())
        .collect();
    Table::new(headers, rows)
}
