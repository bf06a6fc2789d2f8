//! Schema introspection traits and types

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Schema introspection interface
#[async_trait]
pub trait SchemaIntrospection: Send + Sync {
    /// List all tables exposed by the datastore
    async fn list_tables(&self) -> Result<Vec<TableInfo>>;

    /// Get columns for a table
    async fn get_columns(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Get a table reference with all of its columns
    async fn get_table(&self, table: &str) -> Result<TableRef> {
        let columns = self.get_columns(table).await?;
        Ok(TableRef::new(table, columns.into_iter().map(|c| c.name).collect()))
    }
}

/// Table information (basic)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub row_count: Option<i64>,
    pub size_bytes: Option<i64>,
    pub comment: Option<String>,
}

/// Column information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub ordinal: usize,
    pub data_type: String,
    pub nullable: bool,
}

/// A table and its columns, in physical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
    column_names: Vec<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>, column_names: Vec<String>) -> Self {
        Self {
            name: name.into(),
            column_names,
        }
    }

    /// All columns of the table as column references
    pub fn columns(&self) -> Vec<ColumnRef> {
        self.column_names
            .iter()
            .enumerate()
            .map(|(ordinal, name)| ColumnRef::new(&self.name, name.clone(), ordinal))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<ColumnRef> {
        self.column_names
            .iter()
            .position(|c| c == name)
            .map(|ordinal| ColumnRef::new(&self.name, name, ordinal))
    }

    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }
}

/// A physical column of a datastore table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Owning table name
    pub table: String,
    pub name: String,
    pub ordinal: usize,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            ordinal,
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}
