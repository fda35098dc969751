//! The `<pattern>,<replacement>` find/replace option.

use std::borrow::Cow;

use regex::Regex;

use crate::error::{CsvError, CsvResult};

const REPLACE_SEPARATOR: char = ',';

/// A compiled find/replace pair.
#[derive(Debug, Clone)]
pub struct ReplacePattern {
    regex: Regex,
    replacement: String,
}

impl ReplacePattern {
    /// Parse `"<pattern>,<replacement>"`.
    ///
    /// Exactly one separator is allowed, so neither side may contain a comma.
    pub fn parse(spec: &str) -> CsvResult<Self> {
        let parts: Vec<&str> = spec.split(REPLACE_SEPARATOR).collect();
        let [pattern, replacement] = parts.as_slice() else {
            return Err(CsvError::InvalidReplacePattern(format!(
                "expected <pattern>{}<replacement>, got '{}'",
                REPLACE_SEPARATOR, spec
            )));
        };

        let regex = Regex::new(pattern)
            .map_err(|e| CsvError::InvalidReplacePattern(format!("'{}': {}", pattern, e)))?;

        Ok(Self {
            regex,
            replacement: replacement.to_string(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Replace every match in `value`.
    ///
    /// Empty values are returned untouched, and so is any value whose
    /// substitution would leave nothing behind.
    pub fn apply<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if value.is_empty() {
            return Cow::Borrowed(value);
        }
        match self.regex.replace_all(value, self.replacement.as_str()) {
            Cow::Owned(replaced) if replaced.is_empty() => Cow::Borrowed(value),
            other => other,
        }
    }
}
