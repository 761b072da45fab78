//! Error types for the person grouping pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ConfigError`] - Invalid options (mode, delimiter, encoding)
//! - [`CsvError`] - Reading and decoding the CSV source
//! - [`SchemaError`] - Header row lacks the columns a mode needs
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors raised while building options, before any file is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Matching mode string is not one of the known literals.
    #[error(
        "Unknown matching mode '{0}' \
         (expected one of: same_email, same_phone, same_email_or_phone)"
    )]
    UnknownMode(String),

    /// Delimiter must be a single ASCII character.
    #[error("Invalid delimiter {0:?}: must be a single ASCII character")]
    InvalidDelimiter(char),

    /// Forced encoding is not supported.
    #[error("Unsupported encoding '{0}'")]
    UnknownEncoding(String),
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading the CSV source.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed CSV at a given line.
    #[error("Line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Zero-byte source.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Source had content but no header record.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// A data row does not have as many values as the header.
    #[error("Line {line}: found {actual} values, expected {expected}")]
    RowShape {
        line: u64,
        actual: usize,
        expected: usize,
    },
}

/// Failure opening a CSV source: bad options or bad data.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Csv(#[from] CsvError),
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Header row does not satisfy the selected matching mode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// FirstName and/or LastName missing, always listed in that order.
    #[error("Required fields missing: {}", .0.join(", "))]
    MissingRequired(Vec<&'static str>),

    #[error("no email field found")]
    NoEmailField,

    #[error("no phone field found")]
    NoPhoneField,

    #[error("no email or phone field found")]
    NoEmailOrPhoneField,
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::group_file`].
/// It wraps all lower-level errors and adds pipeline-specific variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid options.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input path does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input file has zero bytes.
    #[error("invalid data format: input file is empty")]
    EmptyInput,

    /// CSV reading or row-shape error.
    #[error("invalid data format: {0}")]
    Csv(#[from] CsvError),

    /// Header does not match the mode.
    #[error("invalid data format: {0}")]
    Schema(#[from] SchemaError),

    /// Failed to stage or publish the output.
    #[error("Failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

impl From<SourceError> for PipelineError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Config(e) => PipelineError::Config(e),
            SourceError::Csv(CsvError::EmptyFile) => PipelineError::EmptyInput,
            SourceError::Csv(e) => PipelineError::Csv(e),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for header validation.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::RowShape { line: 4, actual: 2, expected: 3 };
        let pipeline_err: PipelineError = csv_err.into();
        let msg = pipeline_err.to_string();
        assert!(msg.starts_with("invalid data format"));
        assert!(msg.contains("Line 4"));

        // SchemaError -> PipelineError
        let pipeline_err: PipelineError = SchemaError::NoPhoneField.into();
        assert_eq!(pipeline_err.to_string(), "invalid data format: no phone field found");
    }

    #[test]
    fn test_source_error_mapping() {
        let empty: PipelineError = SourceError::Csv(CsvError::EmptyFile).into();
        assert!(matches!(empty, PipelineError::EmptyInput));
        assert_eq!(empty.to_string(), "invalid data format: input file is empty");

        let config: PipelineError = SourceError::Config(ConfigError::InvalidDelimiter('é')).into();
        assert!(matches!(config, PipelineError::Config(_)));

        let no_headers: PipelineError = SourceError::Csv(CsvError::NoHeaders).into();
        assert!(no_headers.to_string().starts_with("invalid data format"));
    }

    #[test]
    fn test_missing_required_format() {
        let err = SchemaError::MissingRequired(vec!["FirstName", "LastName"]);
        assert_eq!(err.to_string(), "Required fields missing: FirstName, LastName");
    }

    #[test]
    fn test_row_shape_format() {
        let err = CsvError::RowShape { line: 7, actual: 5, expected: 4 };
        let msg = err.to_string();
        assert!(msg.contains("7"));
        assert!(msg.contains("found 5"));
        assert!(msg.contains("expected 4"));
    }
}
