//! CSV to records transformation.
//!
//! Turns raw bytes into a [`Table`]: the first row names the columns and
//! every following row becomes one [`Record`]. Optional behavior is driven
//! by [`TransformConfig`]:
//!
//! - `allow_malformed`: accept rows whose field count differs from the header
//! - `fill_empty_with`: value for missing trailing columns of short rows
//! - `replace_with`: one `<pattern>,<replacement>` regex substitution
//! - `encoding`: how to decode the input bytes
//!
//! # Example
//! ```
//! use csvtojson::{parse, TransformConfig};
//!
//! let csv = "first_name,last_name\nRob,Pike\nKen,Thompson\n";
//! let table = parse(csv.as_bytes(), &TransformConfig::default(), None).unwrap();
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.records()[1]["last_name"], "Thompson");
//! ```

pub mod encoding;
pub mod replace;

use std::borrow::Cow;
use std::collections::BTreeMap;

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::{CsvError, CsvResult};
use crate::logs::Logger;

pub use encoding::{decode, detect_encoding};
pub use replace::ReplacePattern;

/// One data row as column name to cell value.
///
/// Keys are kept sorted so serialized output is stable across runs.
pub type Record = BTreeMap<String, String>;

/// Options of the CSV transformation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct TransformConfig {
    /// Accept rows with a different number of fields than the header.
    pub allow_malformed: bool,
    /// Value for the missing trailing columns of short rows.
    pub fill_empty_with: String,
    /// Find/replace as `<pattern>,<replacement>`. Empty means disabled.
    pub replace_with: Option<String>,
    /// Input encoding label, `auto` to detect, or unset for UTF-8.
    pub encoding: Option<String>,
}

impl TransformConfig {
    /// Compile the find/replace option, if any.
    pub fn replace_pattern(&self) -> CsvResult<Option<ReplacePattern>> {
        match self.replace_with.as_deref() {
            None | Some("") => Ok(None),
            Some(spec) => ReplacePattern::parse(spec).map(Some),
        }
    }
}

/// Parsed CSV: the header row and one record per data row, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Column names as they appear in the header row, duplicates included.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Parse raw CSV bytes into a [`Table`].
///
/// Errors are terminal: nothing is returned for the rows read before the
/// failure.
pub fn parse(raw: &[u8], config: &TransformConfig, logger: Option<&Logger>) -> CsvResult<Table> {
    let replacer = config.replace_pattern()?;
    if let (Some(replacer), Some(logger)) = (&replacer, logger) {
        logger
            .with_field("pattern", replacer.pattern())
            .info("Using search pattern");
    }

    let content = decode(raw, config.encoding.as_deref())?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(config.allow_malformed)
        .from_reader(content.as_bytes());

    let rows = reader
        .records()
        .collect::<Result<Vec<StringRecord>, csv::Error>>()?;

    let Some((header, data)) = rows.split_first() else {
        return Err(CsvError::EmptyInput);
    };
    if data.is_empty() {
        return Err(CsvError::EmptyInput);
    }

    let headers: Vec<String> = header.iter().map(str::to_string).collect();
    let records = data
        .iter()
        .map(|row| build_record(&headers, row, config, replacer.as_ref()))
        .collect();

    Ok(Table { headers, records })
}

fn build_record(
    headers: &[String],
    row: &StringRecord,
    config: &TransformConfig,
    replacer: Option<&ReplacePattern>,
) -> Record {
    let mut record = Record::new();
    for (j, key) in headers.iter().enumerate() {
        let value = match row.get(j) {
            None => config.fill_empty_with.clone(),
            Some(cell) => {
                let cell = normalize_newlines(cell);
                match replacer {
                    Some(replacer) => replacer.apply(&cell).into_owned(),
                    None => cell.into_owned(),
                }
            }
        };
        // Duplicate header names: the later column wins.
        record.insert(key.clone(), value);
    }
    record
}

/// Quoted fields may span lines; `\r\n` inside them is read as `\n`.
fn normalize_newlines(cell: &str) -> Cow<'_, str> {
    if cell.contains("\r\n") {
        Cow::Owned(cell.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::LogLevel;

    const GOPHERS: &str = r#"first_name,last_name,username
"Rob","Pike","rob"
Ken,Thompson,ken
"Robert","Griesemer","gri"
"#;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn malformed(fill: &str) -> TransformConfig {
        TransformConfig {
            allow_malformed: true,
            fill_empty_with: fill.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_csv() {
        let table = parse(GOPHERS.as_bytes(), &TransformConfig::default(), None).unwrap();

        assert_eq!(table.headers(), ["first_name", "last_name", "username"]);
        assert_eq!(
            table.records(),
            [
                record(&[("first_name", "Rob"), ("last_name", "Pike"), ("username", "rob")]),
                record(&[("first_name", "Ken"), ("last_name", "Thompson"), ("username", "ken")]),
                record(&[
                    ("first_name", "Robert"),
                    ("last_name", "Griesemer"),
                    ("username", "gri")
                ]),
            ]
        );
    }

    #[test]
    fn test_every_record_has_header_keys() {
        let csv = "a,b,c\n1,2,3\n4,5,6\n7,8,9\n";
        let table = parse(csv.as_bytes(), &TransformConfig::default(), None).unwrap();

        assert_eq!(table.len(), 3);
        for r in table.records() {
            assert_eq!(r.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
        }
    }

    #[test]
    fn test_empty_input() {
        for csv in ["", "first_name,last_name\n", "\n\n"] {
            let err = parse(csv.as_bytes(), &TransformConfig::default(), None).unwrap_err();
            assert!(matches!(err, CsvError::EmptyInput), "{csv:?}: {err}");
        }
    }

    #[test]
    fn test_short_row_rejected_by_default() {
        let csv = "first_name,last_name,username\n\"Rob\",\"Pike\"\n";
        let err = parse(csv.as_bytes(), &TransformConfig::default(), None).unwrap_err();

        match err {
            CsvError::MalformedRow {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_long_row_rejected_by_default() {
        let csv = "a,b\n1,2\n3,4,5\n";
        let err = parse(csv.as_bytes(), &TransformConfig::default(), None).unwrap_err();
        assert!(matches!(err, CsvError::MalformedRow { line: 3, .. }));
    }

    #[test]
    fn test_short_row_filled_when_malformed_allowed() {
        let csv = "first_name,last_name,username\n\"Rob\",\"Pike\"\nKen,Thompson,ken\n";
        let table = parse(csv.as_bytes(), &malformed("test"), None).unwrap();

        assert_eq!(table.records()[0]["username"], "test");
        assert_eq!(table.records()[1]["username"], "ken");
    }

    #[test]
    fn test_short_row_default_fill_is_empty() {
        let csv = "a,b,c\n1\n";
        let table = parse(csv.as_bytes(), &malformed(""), None).unwrap();
        assert_eq!(table.records()[0], record(&[("a", "1"), ("b", ""), ("c", "")]));
    }

    #[test]
    fn test_extra_fields_dropped_when_malformed_allowed() {
        let csv = "a,b\n1,2,3,4\n";
        let table = parse(csv.as_bytes(), &malformed(""), None).unwrap();
        assert_eq!(table.records()[0], record(&[("a", "1"), ("b", "2")]));
    }

    #[test]
    fn test_present_empty_cell_not_filled() {
        let csv = "first_name,middle,last_name\n\"Rob\",,\"Pike\"\n";
        let table = parse(csv.as_bytes(), &malformed("test"), None).unwrap();
        assert_eq!(table.records()[0]["middle"], "");
    }

    #[test]
    fn test_quoted_fields() {
        let csv = "name,quote\n\"Pike, Rob\",\"He said \"\"hi\"\"\nthen left\"\n";
        let table = parse(csv.as_bytes(), &TransformConfig::default(), None).unwrap();

        assert_eq!(table.records()[0]["name"], "Pike, Rob");
        assert_eq!(table.records()[0]["quote"], "He said \"hi\"\nthen left");
    }

    #[test]
    fn test_crlf_input_and_embedded_crlf() {
        let csv = "name,note\r\nRob,\"line one\r\nline two\"\r\nKen,plain\r\n";
        let table = parse(csv.as_bytes(), &TransformConfig::default(), None).unwrap();

        assert_eq!(table.headers(), ["name", "note"]);
        assert_eq!(table.records()[0]["note"], "line one\nline two");
        assert_eq!(table.records()[1]["note"], "plain");
    }

    #[test]
    fn test_stray_quote_in_unquoted_field_kept() {
        let csv = "name\nR\"ob\n";
        let table = parse(csv.as_bytes(), &TransformConfig::default(), None).unwrap();
        assert_eq!(table.records()[0]["name"], "R\"ob");
    }

    #[test]
    fn test_whitespace_preserved() {
        let csv = "a,b\n  x , y\n";
        let table = parse(csv.as_bytes(), &TransformConfig::default(), None).unwrap();
        assert_eq!(table.records()[0]["a"], "  x ");
        assert_eq!(table.records()[0]["b"], " y");
    }

    #[test]
    fn test_duplicate_header_last_column_wins() {
        let csv = "id,name,name\n1,first,second\n";
        let table = parse(csv.as_bytes(), &TransformConfig::default(), None).unwrap();

        assert_eq!(table.headers().len(), 3);
        assert_eq!(table.records()[0], record(&[("id", "1"), ("name", "second")]));
    }

    #[test]
    fn test_replace_applied_to_cells() {
        let config = TransformConfig {
            replace_with: Some("Rob,Bob".into()),
            ..Default::default()
        };
        let table = parse(GOPHERS.as_bytes(), &config, None).unwrap();

        assert_eq!(table.records()[0]["first_name"], "Bob");
        assert_eq!(table.records()[2]["first_name"], "Bobert");
        assert_eq!(table.records()[1]["first_name"], "Ken");
    }

    #[test]
    fn test_replace_to_empty_keeps_raw_value() {
        let config = TransformConfig {
            replace_with: Some("^rob$,".into()),
            ..Default::default()
        };
        let table = parse(GOPHERS.as_bytes(), &config, None).unwrap();
        assert_eq!(table.records()[0]["username"], "rob");
    }

    #[test]
    fn test_replace_skips_filled_and_empty_cells() {
        let config = TransformConfig {
            allow_malformed: true,
            fill_empty_with: "n/a".into(),
            replace_with: Some("^.*$,X".into()),
            ..Default::default()
        };
        let csv = "a,b,c\n1,,\n2\n";
        let table = parse(csv.as_bytes(), &config, None).unwrap();

        assert_eq!(table.records()[0], record(&[("a", "X"), ("b", ""), ("c", "")]));
        assert_eq!(table.records()[1], record(&[("a", "X"), ("b", "n/a"), ("c", "n/a")]));
    }

    #[test]
    fn test_empty_replace_with_is_disabled() {
        let config = TransformConfig {
            replace_with: Some(String::new()),
            ..Default::default()
        };
        let table = parse(GOPHERS.as_bytes(), &config, None).unwrap();
        assert_eq!(table.records()[0]["first_name"], "Rob");
    }

    #[test]
    fn test_invalid_replace_pattern() {
        for spec in ["Rob", "a,b,c", "(,x"] {
            let config = TransformConfig {
                replace_with: Some(spec.into()),
                ..Default::default()
            };
            let err = parse(GOPHERS.as_bytes(), &config, None).unwrap_err();
            assert!(matches!(err, CsvError::InvalidReplacePattern(_)), "{spec}");
        }
    }

    #[test]
    fn test_invalid_replace_pattern_checked_before_input() {
        let config = TransformConfig {
            replace_with: Some("a,b,c".into()),
            ..Default::default()
        };
        let err = parse(b"", &config, None).unwrap_err();
        assert!(matches!(err, CsvError::InvalidReplacePattern(_)));
    }

    #[test]
    fn test_replace_pattern_logged() {
        let (logger, buffer) = Logger::capture();
        let config = TransformConfig {
            replace_with: Some("o+,0".into()),
            ..Default::default()
        };
        parse(GOPHERS.as_bytes(), &config, Some(&logger)).unwrap();

        let entries = buffer.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[0].field("pattern"), Some("o+"));
    }

    #[test]
    fn test_nothing_logged_without_pattern() {
        let (logger, buffer) = Logger::capture();
        parse(GOPHERS.as_bytes(), &TransformConfig::default(), Some(&logger)).unwrap();
        assert!(buffer.lock().unwrap().is_empty());
    }

    #[test]
    fn test_latin1_input() {
        let mut raw = b"name,city\nZo".to_vec();
        raw.push(0xE9);
        raw.extend_from_slice(b",Paris\n");
        let config = TransformConfig {
            encoding: Some("iso-8859-1".into()),
            ..Default::default()
        };
        let table = parse(&raw, &config, None).unwrap();
        assert_eq!(table.records()[0]["name"], "Zoé");
    }

    #[test]
    fn test_repeated_parse_is_stable() {
        let first = parse(GOPHERS.as_bytes(), &TransformConfig::default(), None).unwrap();
        let second = parse(GOPHERS.as_bytes(), &TransformConfig::default(), None).unwrap();
        assert_eq!(first, second);
    }
}
