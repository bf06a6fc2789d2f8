//! Connection trait

use crate::{QueryResult, Result, SchemaIntrospection, SelectQuery};
use async_trait::async_trait;

/// An open datastore connection
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "csv")
    fn driver_name(&self) -> &str;

    /// Execute a select query and return one page of rows.
    ///
    /// Implementations should fill `QueryResult::total_rows` with the
    /// unpaged row count when it is cheap to obtain.
    async fn query(&self, query: &SelectQuery) -> Result<QueryResult>;

    /// Count the rows the query would return without paging
    async fn count(&self, query: &SelectQuery) -> Result<u64> {
        let unpaged = SelectQuery {
            offset: 0,
            limit: None,
            ..query.clone()
        };
        let result = self.query(&unpaged).await?;
        Ok(result.rows.len() as u64)
    }

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;

    /// Get schema introspection interface if supported
    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        None
    }
}
