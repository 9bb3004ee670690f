//! Sheetgrid - cell grid store with aggregates and data-quality transforms

mod config;
mod error;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use sheetgrid_core::{
    CalculateRequest, CellId, CellRef, CellStyles, DataQualityRequest, DataType, JsonFileStore,
    NewCell, Sheet,
};
use sheetgrid_engine::engine::parse_ref_list;

const LOG_ENV: &str = "SHEETGRID_LOG";

#[derive(Parser, Debug)]
#[command(name = "sheetgrid", version, about = "Spreadsheet cell store and calculator")]
struct Cli {
    /// Config file (TOML). Defaults to the per-user config directory.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Cell store file, overriding the config.
    #[arg(long, global = true, value_name = "FILE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every stored cell
    List {
        /// Print the dense row/column grid instead
        #[arg(long)]
        dense: bool,
    },

    /// Create a cell
    Set {
        row: usize,
        column: usize,
        #[arg(allow_hyphen_values = true)]
        value: String,
        #[arg(long = "type", value_name = "TYPE")]
        data_type: Option<DataType>,
        /// Referenced cell (repeatable)
        #[arg(long = "dep", value_name = "REF")]
        dependencies: Vec<String>,
        #[arg(long)]
        bold: bool,
        #[arg(long)]
        italic: bool,
        #[arg(long, value_name = "N")]
        font_size: Option<f64>,
        #[arg(long)]
        color: Option<String>,
    },

    /// Overwrite the value of one stored cell
    Update {
        id: CellId,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Run SUM, AVERAGE, MAX, MIN or COUNT over a range
    Calc {
        operation: String,
        /// JSON pairs (`[[0,0],[0,1]]`) or A1 references (`A1:B3`, `A1,C2`)
        range: String,
    },

    /// Run TRIM, UPPER, LOWER, REMOVE_DUPLICATES or FIND_AND_REPLACE
    Quality {
        operation: String,
        #[arg(long, allow_hyphen_values = true)]
        find: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        replace: Option<String>,
    },

    /// Append the fields of a CSV file as cells
    ImportCsv {
        file: PathBuf,
        #[arg(long, default_value_t = 0)]
        row: usize,
        #[arg(long, default_value_t = 0)]
        column: usize,
    },

    /// Write the grid as CSV to a file or stdout
    ExportCsv { file: Option<PathBuf> },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::load(cli.config.as_deref())?;
    let store_path = config.store_path(cli.store.as_deref())?;
    tracing::debug!(store = %store_path.display(), "opening store");
    let sheet = Sheet::with_options(JsonFileStore::new(store_path), config.sheet_options());

    match cli.command {
        Command::List { dense } => {
            if dense {
                print_json(&sheet.dense()?)
            } else {
                print_json(&sheet.cells()?)
            }
        }
        Command::Set {
            row,
            column,
            value,
            data_type,
            dependencies,
            bold,
            italic,
            font_size,
            color,
        } => {
            let styles = CellStyles {
                bold: bold.then_some(true),
                italic: italic.then_some(true),
                font_size,
                color,
            };
            let new_cell = NewCell {
                row,
                column,
                value,
                data_type,
                dependencies,
                styles: Some(styles),
            };
            print_json(&sheet.create_cell(new_cell)?)
        }
        Command::Update { id, value } => print_json(&sheet.update_cell(id, &value)?),
        Command::Calc { operation, range } => {
            let request = CalculateRequest {
                operation,
                range: range_argument(&range)?,
            };
            print_json(&sheet.calculate(&request)?)
        }
        Command::Quality {
            operation,
            find,
            replace,
        } => {
            let request = DataQualityRequest {
                operation,
                find_text: find,
                replace_text: replace,
            };
            print_json(&sheet.data_quality(&request)?)
        }
        Command::ImportCsv { file, row, column } => {
            let content = read_input(&file)?;
            let stored = sheet.import_csv(&content, CellRef::new(row, column))?;
            print_json(&stored)
        }
        Command::ExportCsv { file } => match file {
            Some(path) => {
                let mut out = Vec::new();
                sheet.export_csv(&mut out)?;
                fs::write(&path, out)
                    .with_context(|| format!("Cannot write {}", path.display()))?;
                Ok(())
            }
            None => {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                sheet.export_csv(&mut lock)?;
                lock.flush()?;
                Ok(())
            }
        },
    }
}

/// Turn the `calc` range argument into the JSON shape the service checks.
/// A1 text is converted to coordinate pairs; anything else must be JSON.
fn range_argument(text: &str) -> anyhow::Result<Value> {
    let trimmed = text.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed)
            .with_context(|| format!("Range is not valid JSON: {}", trimmed));
    }
    let Some(refs) = parse_ref_list(trimmed) else {
        bail!("Invalid range: {}", trimmed);
    };
    Ok(Value::Array(
        refs.into_iter()
            .map(|r| Value::from(vec![r.row, r.col]))
            .collect(),
    ))
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{}", text);
    Ok(())
}
