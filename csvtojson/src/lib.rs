//! # csvtojson - CSV to JSON/YAML conversion
//!
//! Reads a CSV file, optionally tolerates malformed rows, fills missing
//! cells and applies one regex find/replace, then writes JSON or YAML.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV bytes  │────▶│   Decode    │────▶│   Parser    │────▶│ JSON / YAML │
//! │             │     │ (utf8/auto) │     │ (fill/repl) │     │  (output)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use csvtojson::{parse, OutputFormat, TransformConfig};
//!
//! let csv = "first_name,last_name\nRob,Pike\n";
//! let table = parse(csv.as_bytes(), &TransformConfig::default(), None).unwrap();
//! let json = table.marshal(OutputFormat::Json, false).unwrap();
//!
//! assert_eq!(json, br#"[{"first_name":"Rob","last_name":"Pike"}]"#);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`parser`] - CSV parsing and cell transformation
//! - [`output`] - JSON and YAML encoding
//! - [`config`] - Option table and CLI/env/file resolution
//! - [`logs`] - Explicit logger handles

// Core modules
pub mod error;
pub mod logs;

// Parsing
pub mod parser;

// Encoding
pub mod output;

// Command line configuration
pub mod config;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    ConfigResult,
    CsvError,
    CsvResult,
    Error,
    MarshalError,
    MarshalResult,
    Result,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode,
    detect_encoding,
    parse,
    Record,
    ReplacePattern,
    Table,
    TransformConfig,
};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use output::{to_json, to_json_pretty, to_yaml, OutputFormat};

// =============================================================================
// Re-exports - Configuration & Logging
// =============================================================================

pub use config::{Config, OptionKind, OptionSpec, OPTIONS};
pub use logs::{init_subscriber, LogEntry, LogLevel, Logger};
