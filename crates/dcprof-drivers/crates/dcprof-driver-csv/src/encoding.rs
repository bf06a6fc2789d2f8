//! Character encodings of CSV files

use std::borrow::Cow;

use encoding_rs::{Encoding, ISO_8859_2, ISO_8859_15, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252};

use crate::CsvError;

/// A file encoding resolved from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding(&'static Encoding);

impl TextEncoding {
    pub fn utf8() -> Self {
        TextEncoding(UTF_8)
    }

    /// Also what `ISO-8859-1`, `latin1` and `US-ASCII` resolve to
    pub fn windows_1252() -> Self {
        TextEncoding(WINDOWS_1252)
    }

    /// Encodings offered as choices; any other known name is accepted too
    pub fn common() -> [TextEncoding; 6] {
        [
            TextEncoding(UTF_8),
            TextEncoding(UTF_16LE),
            TextEncoding(UTF_16BE),
            TextEncoding(WINDOWS_1252),
            TextEncoding(ISO_8859_2),
            TextEncoding(ISO_8859_15),
        ]
    }

    /// Canonical name, as stored in datastore definitions
    pub fn label(&self) -> &'static str {
        self.0.name()
    }

    /// Resolve an encoding name or alias, ignoring case
    pub fn from_label(label: &str) -> Result<Self, CsvError> {
        Encoding::for_label_no_replacement(label.trim().as_bytes())
            .map(TextEncoding)
            .ok_or_else(|| CsvError::UnsupportedEncoding(label.to_string()))
    }

    /// Encoding announced by a byte order mark, if any
    pub fn from_bom(bytes: &[u8]) -> Option<Self> {
        Encoding::for_bom(bytes).map(|(encoding, _)| TextEncoding(encoding))
    }

    /// Decode raw file contents. A byte order mark overrides the configured
    /// encoding and is dropped; malformed input is an error.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, CsvError> {
        let (encoding, content) = match Encoding::for_bom(bytes) {
            Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
            None => (self.0, bytes),
        };
        encoding
            .decode_without_bom_handling_and_without_replacement(content)
            .ok_or_else(|| {
                CsvError::Encoding(format!("content is not valid {}", encoding.name()))
            })
    }

    /// Decode with malformed sequences replaced
    pub fn decode_lossy<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        self.0.decode(bytes).0
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
