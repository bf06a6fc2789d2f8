//! dcprof Drivers - Datastore driver implementations
//!
//! This crate bundles the concrete drivers implementing the traits defined in
//! `dcprof-core` and a registry to look them up by name.

// File based datastores
#[cfg(feature = "csv")]
pub use dcprof_driver_csv as csv;

mod registry;

pub use registry::DriverRegistry;

/// Re-export commonly used types from dcprof-core
pub use dcprof_core::{
    ColumnMeta, Connection, ConnectionConfig, DatastoreDriver, DcprofError, QueryResult, Result,
    Row, SchemaIntrospection, SelectQuery, Value,
};
