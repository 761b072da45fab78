//! Persongroup CLI - assign a shared person_id to linked CSV records
//!
//! # Commands
//!
//! ```bash
//! persongroup group people.csv --mode same_email           # writes people_grouped.csv
//! persongroup group people.csv --mode same_phone -o -      # CSV to stdout
//! persongroup inspect people.csv                           # show recognized columns
//! persongroup modes                                        # list matching modes
//! ```

use clap::{Parser, Subcommand};
use persongroup::logs::LOG_BROADCASTER;
use persongroup::transform::pipeline::{format_delimiter, STDOUT_PATH};
use persongroup::{group_file, inspect_file, ColumnRole, GroupOptions, MatchMode, ParseOptions};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "persongroup")]
#[command(
    about = "Group CSV person records that share an email address or phone number",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepend a person_id column grouping records by shared keys
    Group {
        /// Input CSV file
        input: PathBuf,

        /// Matching mode: same_email, same_phone or same_email_or_phone
        #[arg(short, long, env = "PERSONGROUP_MODE")]
        mode: String,

        /// Output file, `-` for stdout (default: <input>_grouped.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// CSV delimiter
        #[arg(short, long, default_value = ",", env = "PERSONGROUP_DELIMITER")]
        delimiter: char,

        /// Guess the delimiter from the header line
        #[arg(long)]
        detect_delimiter: bool,

        /// Input encoding (auto-detect if not specified)
        #[arg(long)]
        encoding: Option<String>,

        /// Print a JSON run summary
        #[arg(long)]
        summary: bool,

        /// Only print warnings and errors
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show how each column is recognized and which modes the file supports
    Inspect {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter
        #[arg(short, long, default_value = ",", env = "PERSONGROUP_DELIMITER")]
        delimiter: char,

        /// Guess the delimiter from the header line
        #[arg(long)]
        detect_delimiter: bool,

        /// Input encoding (auto-detect if not specified)
        #[arg(long)]
        encoding: Option<String>,
    },

    /// List available matching modes
    Modes,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Group {
            input,
            mode,
            output,
            delimiter,
            detect_delimiter,
            encoding,
            summary,
            quiet,
        } => {
            LOG_BROADCASTER.set_echo(!quiet);
            cmd_group(
                &input,
                &mode,
                output,
                delimiter,
                detect_delimiter,
                encoding,
                summary,
            )
        }

        Commands::Inspect {
            input,
            delimiter,
            detect_delimiter,
            encoding,
        } => cmd_inspect(
            &input,
            ParseOptions {
                delimiter,
                detect_delimiter,
                encoding,
            },
        ),

        Commands::Modes => cmd_modes(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_group(
    input: &Path,
    mode: &str,
    output: Option<PathBuf>,
    delimiter: char,
    detect_delimiter: bool,
    encoding: Option<String>,
    print_summary: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = GroupOptions {
        delimiter,
        detect_delimiter,
        encoding,
        output,
        ..GroupOptions::new(mode)?
    };

    let summary = group_file(input, &options)?;

    if print_summary {
        let json = serde_json::to_string_pretty(&summary)?;
        // keep stdout clean when it carries the CSV
        if summary.output.as_deref() == Some(STDOUT_PATH) {
            eprintln!("{}", json);
        } else {
            println!("{}", json);
        }
    }

    Ok(())
}

fn cmd_inspect(input: &Path, options: ParseOptions) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔍 Inspecting: {}", input.display());

    let report = inspect_file(input, &options)?;

    println!("Encoding:  {}", report.encoding);
    println!("Delimiter: '{}'", format_delimiter(report.delimiter));
    println!("Rows:      {}", report.row_count);
    println!("\nColumns:");
    for (i, (name, role)) in report.columns.iter().enumerate() {
        let label = match role {
            ColumnRole::FirstName => "first name",
            ColumnRole::LastName => "last name",
            ColumnRole::Email => "email key",
            ColumnRole::Phone => "phone key",
            ColumnRole::Other => "-",
        };
        println!("  [{:2}] {:<24} {}", i + 1, name, label);
    }

    if report.supported_modes.is_empty() {
        println!("\nNo matching mode is supported by this header.");
    } else {
        let modes: Vec<&str> = report.supported_modes.iter().map(MatchMode::as_str).collect();
        println!("\nSupported modes: {}", modes.join(", "));
    }

    Ok(())
}

fn cmd_modes() -> Result<(), Box<dyn std::error::Error>> {
    for mode in MatchMode::ALL {
        println!("  {:<22} {}", mode.as_str(), mode.description());
    }
    Ok(())
}
