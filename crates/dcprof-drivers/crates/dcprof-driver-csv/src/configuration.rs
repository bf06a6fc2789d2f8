//! Parse options of a CSV datastore

use dcprof_core::ConnectionConfig;
use serde::{Deserialize, Serialize};

use crate::{CsvError, TextEncoding};

/// Sentinel meaning "no character" for quote and escape characters.
pub const NOT_A_CHAR: char = '\u{FFFF}';

pub const DEFAULT_ENCODING: &str = "UTF-8";

const NOT_A_CHAR_TEXT: &str = "NOT_A_CHAR";

/// How a delimited text file is split into rows and columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvConfiguration {
    pub separator_char: char,
    /// `None` disables quoting
    pub quote_char: Option<char>,
    /// `None` disables backslash-style escaping
    pub escape_char: Option<char>,
    pub encoding: String,
    /// 1-based line holding the column names; 0 means the file has no header
    pub column_name_line_number: usize,
    pub fail_on_inconsistent_row_length: bool,
}

impl Default for CsvConfiguration {
    fn default() -> Self {
        Self {
            separator_char: ',',
            quote_char: Some('"'),
            escape_char: Some('\\'),
            encoding: DEFAULT_ENCODING.to_string(),
            column_name_line_number: 1,
            fail_on_inconsistent_row_length: false,
        }
    }
}

impl CsvConfiguration {
    /// Tab separated defaults
    pub fn tab_separated() -> Self {
        Self {
            separator_char: '\t',
            ..Self::default()
        }
    }

    pub fn has_header(&self) -> bool {
        self.column_name_line_number > 0
    }

    pub fn text_encoding(&self) -> Result<TextEncoding, CsvError> {
        TextEncoding::from_label(&self.encoding)
    }

    /// Check that the configuration can drive the reader
    pub fn validate(&self) -> Result<(), CsvError> {
        if self.separator_char == NOT_A_CHAR {
            return Err(CsvError::InvalidConfiguration(
                "A separator character is required".into(),
            ));
        }
        for (label, c) in [
            ("Separator", Some(self.separator_char)),
            ("Quote", self.quote_char),
            ("Escape", self.escape_char),
        ] {
            if let Some(c) = c.filter(|c| !c.is_ascii()) {
                return Err(CsvError::InvalidConfiguration(format!(
                    "{} character must be a single-byte (ASCII) character, got '{}'",
                    label,
                    c.escape_default()
                )));
            }
        }
        if Some(self.separator_char) == self.quote_char {
            return Err(CsvError::InvalidConfiguration(
                "Separator and quote characters must differ".into(),
            ));
        }
        if Some(self.separator_char) == self.escape_char {
            return Err(CsvError::InvalidConfiguration(
                "Separator and escape characters must differ".into(),
            ));
        }
        self.text_encoding()?;
        Ok(())
    }

    pub(crate) fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.separator_char as u8);
        match self.quote_char {
            Some(quote) => {
                builder.quote(quote as u8).quoting(true);
            }
            None => {
                builder.quoting(false);
            }
        }
        builder.escape(self.escape_char.map(|c| c as u8));
        builder
    }

    /// Store the configuration as driver parameters
    pub fn apply_to(&self, config: ConnectionConfig) -> ConnectionConfig {
        config
            .with_param("separator_char", format_char(Some(self.separator_char)))
            .with_param("quote_char", format_char(self.quote_char))
            .with_param("escape_char", format_char(self.escape_char))
            .with_param("encoding", self.encoding.clone())
            .with_param("header_line_number", self.column_name_line_number)
            .with_param(
                "fail_on_inconsistencies",
                self.fail_on_inconsistent_row_length,
            )
    }

    /// Read a configuration back from driver parameters, defaulting missing ones
    pub fn from_connection_config(config: &ConnectionConfig) -> Result<Self, CsvError> {
        let defaults = Self::default();

        let separator_char = match config.get_string("separator_char") {
            Some(raw) => parse_char(&raw)?.ok_or_else(|| {
                CsvError::InvalidConfiguration("A separator character is required".into())
            })?,
            None => defaults.separator_char,
        };
        let quote_char = match config.get_string("quote_char") {
            Some(raw) => parse_char(&raw)?,
            None => defaults.quote_char,
        };
        let escape_char = match config.get_string("escape_char") {
            Some(raw) => parse_char(&raw)?,
            None => defaults.escape_char,
        };

        Ok(Self {
            separator_char,
            quote_char,
            escape_char,
            encoding: config.get_string("encoding").unwrap_or(defaults.encoding),
            column_name_line_number: config
                .get_parsed("header_line_number")
                .unwrap_or(defaults.column_name_line_number),
            fail_on_inconsistent_row_length: config
                .get_parsed("fail_on_inconsistencies")
                .unwrap_or(defaults.fail_on_inconsistent_row_length),
        })
    }
}

/// Render a character for configuration files.
///
/// Tab, newline and carriage return are written as two-character escapes so
/// they survive whitespace handling; a missing character becomes `NOT_A_CHAR`.
pub fn format_char(c: Option<char>) -> String {
    match c {
        None | Some(NOT_A_CHAR) => NOT_A_CHAR_TEXT.to_string(),
        Some('\t') => "\\t".to_string(),
        Some('\n') => "\\n".to_string(),
        Some('\r') => "\\r".to_string(),
        Some(c) => c.to_string(),
    }
}

/// Inverse of [`format_char`]. An empty value means no character.
pub fn parse_char(raw: &str) -> Result<Option<char>, CsvError> {
    match raw {
        "" | NOT_A_CHAR_TEXT => Ok(None),
        "\\t" => Ok(Some('\t')),
        "\\n" => Ok(Some('\n')),
        "\\r" => Ok(Some('\r')),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(NOT_A_CHAR), None) => Ok(None),
                (Some(c), None) => Ok(Some(c)),
                _ => Err(CsvError::InvalidCharacter(other.to_string())),
            }
        }
    }
}
