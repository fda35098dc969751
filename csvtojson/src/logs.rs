//! Logging handles.
//!
//! A [`Logger`] is passed explicitly to whoever needs to log; nothing is
//! looked up from global state. Entries go either to `tracing` (the
//! binary's sink) or to an in-memory buffer.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter};

/// Log level of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Context fields, in the order they were attached
    #[serde(default)]
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Value of the first field named `key`, if any
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        for (key, value) in &self.fields {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Captured entries of a [`Logger::capture`] handle.
pub type LogBuffer = Arc<Mutex<Vec<LogEntry>>>;

#[derive(Debug, Clone)]
enum Sink {
    Tracing,
    Buffer(LogBuffer),
}

/// Explicit logging handle.
///
/// Cloning is cheap; [`Logger::with_field`] returns a new handle that
/// carries an extra context field into every entry it emits.
#[derive(Debug, Clone)]
pub struct Logger {
    sink: Sink,
    fields: Vec<(String, String)>,
}

impl Logger {
    /// Logger that forwards every entry to `tracing`.
    pub fn tracing() -> Self {
        Self {
            sink: Sink::Tracing,
            fields: Vec::new(),
        }
    }

    /// Logger that records entries in memory.
    pub fn capture() -> (Self, LogBuffer) {
        let buffer = LogBuffer::default();
        let logger = Self {
            sink: Sink::Buffer(Arc::clone(&buffer)),
            fields: Vec::new(),
        };
        (logger, buffer)
    }

    pub fn with_field(&self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        let mut logger = self.clone();
        logger.fields.push((key.into(), value.to_string()));
        logger
    }

    pub fn debug(&self, msg: impl Into<String>) {
        self.log(LogLevel::Debug, msg);
    }

    pub fn info(&self, msg: impl Into<String>) {
        self.log(LogLevel::Info, msg);
    }

    pub fn warning(&self, msg: impl Into<String>) {
        self.log(LogLevel::Warning, msg);
    }

    pub fn error(&self, msg: impl Into<String>) {
        self.log(LogLevel::Error, msg);
    }

    fn log(&self, level: LogLevel, msg: impl Into<String>) {
        let entry = LogEntry {
            level,
            message: msg.into(),
            fields: self.fields.clone(),
        };
        match &self.sink {
            Sink::Tracing => match entry.level {
                LogLevel::Debug => tracing::debug!("{}", entry),
                LogLevel::Info => tracing::info!("{}", entry),
                LogLevel::Warning => tracing::warn!("{}", entry),
                LogLevel::Error => tracing::error!("{}", entry),
            },
            Sink::Buffer(buffer) => {
                // A poisoned buffer only means another writer panicked mid-push.
                let mut entries = buffer.lock().unwrap_or_else(|e| e.into_inner());
                entries.push(entry);
            }
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::tracing()
    }
}

/// Install the stderr `tracing` subscriber used by the binary.
///
/// `RUST_LOG` takes precedence over the `debug` switch. Without `debug`
/// timestamps and targets are hidden.
pub fn init_subscriber(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = tracing_fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(debug);

    // Ignore the error: a subscriber may already be installed by an embedding program.
    let _ = if debug {
        builder.try_init()
    } else {
        builder.without_time().try_init()
    };
}
