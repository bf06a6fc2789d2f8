//! Structured select queries

use crate::{ColumnRef, DcprofError, Result};

/// A projection over a single table with optional paging.
///
/// Built with [`SelectQuery::from_table`] and chained selectors, mirroring
/// the `FROM ... SELECT ...` shape used by the preview windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    /// Table to read from
    pub table: String,
    /// Selected column names, in output order. Empty selects every column.
    pub columns: Vec<String>,
    /// Number of leading rows to skip (0-based)
    pub offset: usize,
    /// Maximum number of rows to return
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            offset: 0,
            limit: None,
        }
    }

    /// Build a query selecting `columns` from the table of the first column.
    ///
    /// Every column must belong to that same table.
    pub fn for_columns(columns: &[ColumnRef]) -> Result<Self> {
        let first = columns
            .first()
            .ok_or_else(|| DcprofError::Query("No columns to select".into()))?;

        if let Some(foreign) = columns.iter().find(|c| c.table != first.table) {
            return Err(DcprofError::Query(format!(
                "Column '{}' does not belong to table '{}'",
                foreign, first.table
            )));
        }

        Ok(Self::from_table(&first.table).select(columns.iter().map(|c| c.name.clone())))
    }

    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Same projection, different page
    pub fn page(&self, offset: usize, limit: usize) -> Self {
        self.clone().offset(offset).limit(limit)
    }

    pub fn selects_all(&self) -> bool {
        self.columns.is_empty()
    }
}

impl std::fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        write!(f, "SELECT {} FROM {}", columns, self.table)?;
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        if self.offset > 0 || self.limit.is_some() {
            write!(f, " OFFSET {}", self.offset)?;
        }
        Ok(())
    }
}
