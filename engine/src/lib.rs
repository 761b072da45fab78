//! # Persongroup - link person records by shared email or phone
//!
//! Persongroup reads a CSV of person records and prepends a `person_id`
//! column. Records that share a normalized email address and/or phone
//! number, directly or through a chain of other records, get the same id.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Validator  │────▶│   Grouper   │────▶ CSV + person_id
//! │  (ISO/UTF8) │     │ (auto-enc)  │     │  (headers)  │     │ (key index) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use persongroup::{group_rows, MatchMode};
//!
//! let headers = ["FirstName", "LastName", "Email"].map(String::from).to_vec();
//! let rows = vec![
//!     ["John", "Doe", "john@x.com"].map(String::from).to_vec(),
//!     ["Jane", "Smith", "JOHN@x.com"].map(String::from).to_vec(),
//! ];
//! assert_eq!(group_rows(&headers, &rows, MatchMode::SameEmail)?, vec![1, 1]);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (MatchMode, Record, HeaderSet)
//! - [`parser`] - CSV reading with encoding detection
//! - [`validation`] - Header checks per matching mode
//! - [`transform`] - Normalization, grouping, and pipeline
//! - [`logs`] - Pipeline log entries

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Grouping
pub mod transform;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    CsvError,
    SchemaError,
    SourceError,
    PipelineError,
    PipelineResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{GroupId, HeaderSet, MatchMode, Record};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    CsvSource,
    ParseOptions,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    classify_column,
    supported_modes,
    validate_headers,
    ColumnLayout,
    ColumnRole,
};

// =============================================================================
// Re-exports - Grouping
// =============================================================================

pub use transform::{
    extract_keys,
    group_rows,
    Grouper,
    KeyIndex,
    MatchKeys,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    default_output_path,
    group_bytes,
    group_file,
    inspect_file,
    GroupOptions,
    GroupSummary,
    InspectReport,
};
