use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level errors with user-friendly messages
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Datastore not found: {0}")]
    DatastoreNotFound(String),

    #[error("No physical columns to preview")]
    NoColumns,

    #[error("Schema introspection not supported for this datastore")]
    SchemaNotSupported,

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Page {page} is out of range (the data set has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("Page {page} is past the end of the data set")]
    PageBeyondEnd { page: usize },

    #[error("Datastore catalog error: {0}")]
    Catalog(#[from] dcprof_wizard::CatalogError),
}
