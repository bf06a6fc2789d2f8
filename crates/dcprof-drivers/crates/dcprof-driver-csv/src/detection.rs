//! Guess parse options from the start of a file

use std::io::Read;
use std::path::Path;

use crate::{CsvConfiguration, CsvError, TextEncoding};

/// Bytes sampled when sniffing a file
const SAMPLE_SIZE: usize = 64 * 1024;

const SEPARATOR_CANDIDATES: [char; 4] = [',', ';', '\t', '|'];

/// Sniff a configuration from the first bytes of `path`
pub fn detect_configuration(path: &Path) -> Result<CsvConfiguration, CsvError> {
    let file = std::fs::File::open(path)?;
    let mut sample = Vec::with_capacity(SAMPLE_SIZE);
    file.take(SAMPLE_SIZE as u64).read_to_end(&mut sample)?;

    let configuration = detect_configuration_from_bytes(&sample);
    tracing::debug!(
        path = %path.display(),
        separator = ?configuration.separator_char,
        encoding = %configuration.encoding,
        "detected CSV configuration"
    );
    Ok(configuration)
}

/// Sniff a configuration from an in-memory sample.
///
/// Never fails: anything that cannot be recognised keeps its default.
pub fn detect_configuration_from_bytes(sample: &[u8]) -> CsvConfiguration {
    let encoding = detect_encoding(sample);
    let text = encoding.decode_lossy(sample);
    let first_line = text.lines().next().unwrap_or_default();

    let quote_char = detect_quote(first_line);
    let separator_char = detect_separator(first_line, quote_char);

    CsvConfiguration {
        separator_char,
        quote_char: Some(quote_char),
        encoding: encoding.label().to_string(),
        ..CsvConfiguration::default()
    }
}

fn detect_encoding(sample: &[u8]) -> TextEncoding {
    if let Some(encoding) = TextEncoding::from_bom(sample) {
        return encoding;
    }
    // The sample may end inside a multi-byte sequence
    match std::str::from_utf8(sample) {
        Ok(_) => TextEncoding::utf8(),
        Err(e) if e.error_len().is_none() => TextEncoding::utf8(),
        Err(_) => TextEncoding::windows_1252(),
    }
}

/// Single quotes win only when they wrap a field and double quotes never appear
fn detect_quote(line: &str) -> char {
    if !line.contains('"') && line.starts_with('\'') && line.matches('\'').count() >= 2 {
        '\''
    } else {
        '"'
    }
}

fn detect_separator(line: &str, quote: char) -> char {
    let mut counts = [0usize; SEPARATOR_CANDIDATES.len()];
    let mut in_quotes = false;
    for c in line.chars() {
        if c == quote {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(idx) = SEPARATOR_CANDIDATES.iter().position(|&s| s == c) {
            counts[idx] += 1;
        }
    }

    // Earlier candidates win ties, so ',' is kept when nothing stands out
    let mut best = 0;
    for idx in 1..counts.len() {
        if counts[idx] > counts[best] {
            best = idx;
        }
    }
    SEPARATOR_CANDIDATES[best]
}
