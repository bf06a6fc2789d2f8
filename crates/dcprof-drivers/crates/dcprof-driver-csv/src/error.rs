use dcprof_core::DcprofError;
use thiserror::Error;

/// Errors raised while configuring or reading a CSV datastore
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Invalid character value '{0}'")]
    InvalidCharacter(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Inconsistent row length at line {line}: expected {expected} values, found {found}")]
    InconsistentRowLength {
        line: u64,
        expected: usize,
        found: usize,
    },
}

impl From<CsvError> for DcprofError {
    fn from(err: CsvError) -> Self {
        match err {
            CsvError::Io(e) => DcprofError::Io(e),
            CsvError::UnsupportedEncoding(_)
            | CsvError::InvalidCharacter(_)
            | CsvError::InvalidConfiguration(_) => DcprofError::Configuration(err.to_string()),
            other => DcprofError::Query(other.to_string()),
        }
    }
}
