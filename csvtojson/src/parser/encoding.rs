//! Input decoding: raw bytes to text before CSV splitting.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::error::{CsvError, CsvResult};

/// Label that asks for charset detection instead of a fixed encoding.
pub const AUTO: &str = "auto";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Best guess at the encoding of `bytes`.
///
/// Charsets chardet reports that have no WHATWG label (or an empty guess)
/// fall back to UTF-8.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let (charset, _, _) = chardet::detect(bytes);
    Encoding::for_label(charset.trim().as_bytes()).unwrap_or(encoding_rs::UTF_8)
}

/// Decode `raw` into text.
///
/// - `None`: UTF-8, invalid sequences replaced by U+FFFD
/// - `Some("auto")`: charset detection
/// - `Some(label)`: any WHATWG encoding label
///
/// A leading byte order mark is dropped in every case.
pub fn decode<'a>(raw: &'a [u8], encoding: Option<&str>) -> CsvResult<Cow<'a, str>> {
    match encoding.map(str::trim) {
        None | Some("") => Ok(decode_utf8(raw)),
        Some(label) if label.eq_ignore_ascii_case(AUTO) => {
            Ok(decode_with(raw, detect_encoding(raw)))
        }
        Some(label) => {
            let encoding = Encoding::for_label(label.as_bytes())
                .ok_or_else(|| CsvError::UnknownEncoding(label.to_string()))?;
            Ok(decode_with(raw, encoding))
        }
    }
}

fn decode_utf8(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
    String::from_utf8_lossy(raw)
}

fn decode_with<'a>(raw: &'a [u8], encoding: &'static Encoding) -> Cow<'a, str> {
    if encoding == encoding_rs::UTF_8 {
        return decode_utf8(raw);
    }
    let (text, _, _) = encoding.decode(raw);
    text
}
