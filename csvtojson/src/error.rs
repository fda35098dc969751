//! Error types for the csvtojson converter.
//!
//! - [`CsvError`] - CSV parsing and transformation errors
//! - [`MarshalError`] - JSON/YAML serialization errors
//! - [`ConfigError`] - Option resolution errors
//! - [`Error`] - Top-level errors returned by the binary
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error as ThisError;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors while turning raw bytes into a [`crate::Table`].
#[derive(Debug, ThisError)]
pub enum CsvError {
    /// Fewer than two rows (a header plus one data row) were found.
    #[error("Empty CSV file: a header row and at least one data row are required")]
    EmptyInput,

    /// A row's field count differs from the header's.
    #[error("Malformed row on line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        expected: u64,
        found: u64,
    },

    /// The find/replace option is not `<pattern>,<replacement>` or the regex is invalid.
    #[error("Invalid search-replace pattern: {0}")]
    InvalidReplacePattern(String),

    /// The requested input encoding label is unknown.
    #[error("Unknown input encoding: {0}")]
    UnknownEncoding(String),

    /// Any other failure reported by the CSV reader.
    #[error("Invalid CSV format: {0}")]
    Read(#[source] csv::Error),
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        if let csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } = err.kind()
        {
            return CsvError::MalformedRow {
                line: pos.as_ref().map(|p| p.line()).unwrap_or_default(),
                expected: *expected_len,
                found: *len,
            };
        }
        CsvError::Read(err)
    }
}

// =============================================================================
// Marshal Errors
// =============================================================================

/// Errors while serializing a table.
#[derive(Debug, ThisError)]
pub enum MarshalError {
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while resolving the command line, environment and config file.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    /// Invalid command line (also covers `--help` and `--version`).
    #[error("{0}")]
    Args(#[from] clap::Error),

    /// The config file could not be read.
    #[error("Cannot read config file '{}': {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid YAML for the option set.
    #[error("Invalid config file '{}': {source}", .path.display())]
    ParseFile {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// No input file was given anywhere.
    #[error("No CSV file given: use --csv-file, CSVTOJSON_CSV_FILE or `csv-file` in the config file")]
    MissingCsvFile,
}

// =============================================================================
// Top-level Errors
// =============================================================================

/// Top-level error type of the converter.
#[derive(Debug, ThisError)]
pub enum Error {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Serialization error.
    #[error("Marshal error: {0}")]
    Marshal(#[from] MarshalError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Reading the input or writing the output failed.
    #[error("Cannot access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Result type for marshal operations.
pub type MarshalResult<T> = std::result::Result<T, MarshalError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type for the converter as a whole.
pub type Result<T> = std::result::Result<T, Error>;
