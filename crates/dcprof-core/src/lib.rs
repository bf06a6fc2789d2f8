//! dcprof Core - Core abstractions and traits for datastore access
//!
//! This crate provides the fundamental traits and types that all other
//! dcprof crates depend on. It defines:
//!
//! - `DatastoreDriver` - Trait for datastore driver implementations
//! - `Connection` - Trait for open datastore connections
//! - `SchemaIntrospection` - Trait for schema inspection
//! - `SelectQuery` - Structured query handed to connections
//! - Common types like `Value`, `Row`, `ColumnRef`, `InputColumn`, etc.

mod connection;
mod driver;
mod error;
mod input_column;
mod query;
mod schema;
mod types;

pub use connection::*;
pub use driver::*;
pub use error::*;
pub use input_column::*;
pub use query::*;
pub use schema::*;
pub use types::*;
