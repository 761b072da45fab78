//! High-level pipeline API: read, validate, group, write.
//!
//! The driver is a strict sequencer around the validator, normalizer and
//! grouper. Output is staged: a temporary file in the destination directory
//! (or an in-memory buffer for stdout) is only published once every row has
//! been grouped, so a failed run never leaves a partial file behind.
//!
//! # Example
//!
//! ```rust,ignore
//! use persongroup::{group_file, GroupOptions};
//! use std::path::Path;
//!
//! let options = GroupOptions::new("same_email_or_phone")?;
//! let summary = group_file(Path::new("people.csv"), &options)?;
//! println!("{} rows in {} groups", summary.row_count, summary.group_count);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, CsvError, PipelineError, PipelineResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{GroupId, MatchMode, Record};
use crate::parser::{delimiter_byte, resolve_encoding, CsvSource, ParseOptions};
use crate::validation::{classify_column, supported_modes, validate_headers, ColumnRole};

use super::grouper::Grouper;
use super::normalize::extract_keys;

/// Column prepended to the output.
pub const PERSON_ID_COLUMN: &str = "person_id";

/// Output path meaning "write to stdout".
pub const STDOUT_PATH: &str = "-";

/// Options for the grouping pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOptions {
    /// Which keys link records
    pub mode: MatchMode,

    /// Field separator, also used for the output
    pub delimiter: char,

    /// Guess the separator from the header line
    pub detect_delimiter: bool,

    /// Forced input encoding (auto-detected if not set)
    pub encoding: Option<String>,

    /// Output path; `-` for stdout, `<stem>_grouped.csv` beside the input if not set
    pub output: Option<PathBuf>,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            mode: MatchMode::default(),
            delimiter: ',',
            detect_delimiter: false,
            encoding: None,
            output: None,
        }
    }
}

impl GroupOptions {
    /// Options for a mode literal. Fails on an unknown mode.
    pub fn new(mode: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            mode: mode.parse()?,
            ..Self::default()
        })
    }

    /// Reject bad delimiter or encoding before any file is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        delimiter_byte(self.delimiter)?;
        if let Some(ref encoding) = self.encoding {
            resolve_encoding(encoding)?;
        }
        Ok(())
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            delimiter: self.delimiter,
            detect_delimiter: self.detect_delimiter,
            encoding: self.encoding.clone(),
        }
    }
}

/// Result of a grouping run
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub mode: MatchMode,
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    /// Email columns used for matching, in header order
    pub email_columns: Vec<String>,
    /// Phone columns used for matching, in header order
    pub phone_columns: Vec<String>,
    pub row_count: usize,
    pub group_count: u64,
    /// Rows that had no non-blank key and got a group of their own
    pub rows_without_keys: usize,
    /// Where the output was published
    pub output: Option<String>,
}

/// Header report produced by [`inspect_file`]
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub encoding: String,
    pub delimiter: char,
    pub columns: Vec<(String, ColumnRole)>,
    pub supported_modes: Vec<MatchMode>,
    pub row_count: usize,
}

/// `<stem>_grouped.csv` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{}_grouped.csv", stem))
}

/// Read a non-empty input file.
fn read_input(input: &Path) -> PipelineResult<Vec<u8>> {
    if !input.exists() {
        return Err(PipelineError::InputNotFound(input.to_path_buf()));
    }
    let bytes = fs::read(input).map_err(CsvError::from)?;
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    Ok(bytes)
}

/// Group a CSV file and publish the result.
///
/// This is the main entry point for the pipeline. It:
/// 1. Checks options and reads the input
/// 2. Validates the header for the mode
/// 3. Groups rows in file order while writing to a staged output
/// 4. Publishes the output only if every row succeeded
pub fn group_file(input: &Path, options: &GroupOptions) -> PipelineResult<GroupSummary> {
    options.validate()?;

    log_info(format!("📖 Reading {}", input.display()));
    let bytes = read_input(input)?;

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input));

    if output.as_os_str() == STDOUT_PATH {
        let mut buffer = Vec::new();
        let mut summary = group_bytes(&bytes, options, &mut buffer)?;
        io::stdout()
            .lock()
            .write_all(&buffer)
            .map_err(PipelineError::Output)?;
        summary.output = Some(STDOUT_PATH.to_string());
        return Ok(summary);
    }

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::Builder::new()
        .prefix(".persongroup-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(PipelineError::Output)?;

    // On error `staged` is dropped here and the temporary file removed
    let mut summary = group_bytes(&bytes, options, staged.as_file_mut())?;

    staged
        .persist(&output)
        .map_err(|e| PipelineError::Output(e.error))?;
    log_success(format!("💾 Output written to: {}", output.display()));

    summary.output = Some(output.display().to_string());
    Ok(summary)
}

/// Group CSV bytes, writing the output CSV to `sink`.
///
/// On error, whatever was already written to `sink` is incomplete; callers
/// must discard it.
pub fn group_bytes<W: Write>(
    bytes: &[u8],
    options: &GroupOptions,
    sink: W,
) -> PipelineResult<GroupSummary> {
    let mode = options.mode;
    let mut source = CsvSource::from_bytes(bytes, &options.parse_options())?;
    log_success(format!("Detected encoding: {}", source.encoding()));
    log_success(format!("Delimiter: '{}'", format_delimiter(source.delimiter())));

    let headers = source.headers().clone();
    log_info(format!("📋 CSV has {} columns", headers.len()));

    let layout = validate_headers(headers.names(), mode)?;
    let email_columns = if mode.uses_email() {
        headers.select(&layout.email_columns)
    } else {
        Vec::new()
    };
    let phone_columns = if mode.uses_phone() {
        headers.select(&layout.phone_columns)
    } else {
        Vec::new()
    };
    if !email_columns.is_empty() {
        log_info_indent(format!("Email keys: {}", email_columns.join(", ")), 1);
    }
    if !phone_columns.is_empty() {
        log_info_indent(format!("Phone keys: {}", phone_columns.join(", ")), 1);
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter_byte(source.delimiter())?)
        .from_writer(sink);
    let header_row = std::iter::once(PERSON_ID_COLUMN)
        .chain(headers.names().iter().map(String::as_str));
    writer.write_record(header_row).map_err(output_error)?;

    log_info(format!("🔗 Grouping with {}...", mode));
    let mut grouper = Grouper::new(mode);
    let mut row_count = 0;
    let mut rows_without_keys = 0;

    while let Some(mut record) = source.next_record()? {
        let keys = extract_keys(&record, &layout, mode);
        if keys.is_empty() {
            rows_without_keys += 1;
        }
        record.group_id = Some(grouper.assign(&keys));
        write_record(&mut writer, &record)?;
        row_count += 1;
    }

    writer.flush().map_err(PipelineError::Output)?;

    log_success(format!(
        "Assigned {} rows to {} groups",
        row_count,
        grouper.group_count()
    ));
    if rows_without_keys > 0 {
        log_warning(format!(
            "{} rows had no usable {} and were placed in their own group",
            rows_without_keys,
            key_description(mode)
        ));
    }

    Ok(GroupSummary {
        mode,
        encoding: source.encoding().to_string(),
        delimiter: source.delimiter(),
        headers: headers.names().to_vec(),
        email_columns,
        phone_columns,
        row_count,
        group_count: grouper.group_count(),
        rows_without_keys,
        output: None,
    })
}

/// Describe the columns of a file and which modes it supports.
///
/// Every data row is read, so row-shape errors surface here too.
pub fn inspect_file(input: &Path, options: &ParseOptions) -> PipelineResult<InspectReport> {
    let bytes = read_input(input)?;
    let mut source = CsvSource::from_bytes(&bytes, options)?;
    let names = source.headers().names().to_vec();
    let row_count = source.read_all()?.len();

    Ok(InspectReport {
        encoding: source.encoding().to_string(),
        delimiter: source.delimiter(),
        supported_modes: supported_modes(&names),
        columns: names
            .into_iter()
            .map(|name| {
                let role = classify_column(&name);
                (name, role)
            })
            .collect(),
        row_count,
    })
}

fn write_record<W: Write>(writer: &mut csv::Writer<W>, record: &Record) -> PipelineResult<()> {
    let id = record.group_id.map(|id: GroupId| id.to_string()).unwrap_or_default();
    writer
        .write_record(std::iter::once(id.as_str()).chain(record.values.iter().map(String::as_str)))
        .map_err(output_error)
}

fn output_error(err: csv::Error) -> PipelineError {
    PipelineError::Output(err.into())
}

fn key_description(mode: MatchMode) -> &'static str {
    match mode {
        MatchMode::SameEmail => "email",
        MatchMode::SamePhone => "phone",
        MatchMode::SameEmailOrPhone => "email or phone",
    }
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
