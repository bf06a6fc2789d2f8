use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a wizard session
#[derive(Debug, Error)]
pub enum WizardError {
    /// Rejected input. The message is shown to the user and the session
    /// stays on the current page.
    #[error("{0}")]
    UserInput(String),

    #[error("Invalid wizard state: {0}")]
    InvalidState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WizardError {
    pub fn user_input(message: impl Into<String>) -> Self {
        Self::UserInput(message.into())
    }

    pub fn is_user_input(&self) -> bool {
        matches!(self, Self::UserInput(_))
    }
}

/// Errors reading or writing XML
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("Failed to write XML: {0}")]
    Write(String),

    #[error("Missing element <{0}>")]
    MissingElement(String),

    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    #[error("Invalid value for <{element}>: {message}")]
    InvalidValue { element: String, message: String },
}

/// Errors from the datastore catalog file
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to access catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: XmlError,
    },

    #[error("A datastore named '{0}' already exists")]
    DuplicateName(String),
}
