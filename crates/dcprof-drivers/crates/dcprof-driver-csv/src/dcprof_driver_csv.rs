//! CSV file datastore driver implementation

mod configuration;
mod connection;
mod detection;
mod driver;
mod encoding;
mod error;

pub use configuration::{format_char, parse_char, CsvConfiguration, DEFAULT_ENCODING, NOT_A_CHAR};
pub use connection::CsvConnection;
pub use detection::{detect_configuration, detect_configuration_from_bytes};
pub use driver::CsvDriver;
pub use encoding::TextEncoding;
pub use error::CsvError;
