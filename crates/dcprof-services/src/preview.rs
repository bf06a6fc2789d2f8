//! Preview source data
//!
//! Shows the rows behind a set of columns in a [`DataSetWindow`].

use std::sync::Arc;

use dcprof_core::{ColumnRef, Connection, InputColumn, SelectQuery, TableRef};

use crate::DataSetWindow;
use crate::error::{ServiceError, ServiceResult};

/// Rows shown per preview page
pub const PAGE_SIZE: usize = 35;

#[derive(Debug, Clone)]
enum PreviewColumns {
    Columns(Vec<ColumnRef>),
    /// Resolved when the action is performed; virtual columns are skipped
    InputColumns(Vec<InputColumn>),
}

/// Action previewing the source data of some columns.
///
/// All columns must belong to the same table; the query reads from the table
/// of the first one.
pub struct PreviewSourceDataAction {
    connection: Arc<dyn Connection>,
    columns: PreviewColumns,
    page_size: usize,
}

impl PreviewSourceDataAction {
    pub fn from_columns(connection: Arc<dyn Connection>, columns: Vec<ColumnRef>) -> Self {
        Self {
            connection,
            columns: PreviewColumns::Columns(columns),
            page_size: PAGE_SIZE,
        }
    }

    /// Preview every column of `table`
    pub fn from_table(connection: Arc<dyn Connection>, table: &TableRef) -> Self {
        Self::from_columns(connection, table.columns())
    }

    pub fn from_input_columns(
        connection: Arc<dyn Connection>,
        input_columns: Vec<InputColumn>,
    ) -> Self {
        Self {
            connection,
            columns: PreviewColumns::InputColumns(input_columns),
            page_size: PAGE_SIZE,
        }
    }

    /// Override the page size (at least one row)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The physical columns to preview, in order
    pub fn columns(&self) -> Vec<ColumnRef> {
        match &self.columns {
            PreviewColumns::Columns(columns) => columns.clone(),
            PreviewColumns::InputColumns(input_columns) => input_columns
                .iter()
                .filter_map(InputColumn::physical_column)
                .cloned()
                .collect(),
        }
    }

    /// `FROM <table of first column> SELECT <columns>`
    pub fn query(&self) -> ServiceResult<SelectQuery> {
        let columns = self.columns();
        if columns.is_empty() {
            return Err(ServiceError::NoColumns);
        }
        SelectQuery::for_columns(&columns).map_err(|e| ServiceError::QueryFailed(e.to_string()))
    }

    /// Open the preview window on its first page
    #[tracing::instrument(skip(self), fields(driver = self.connection.driver_name()))]
    pub async fn perform(&self) -> ServiceResult<DataSetWindow> {
        let query = self.query()?;
        tracing::info!(query = %query, page_size = self.page_size, "previewing source data");
        DataSetWindow::open(self.connection.clone(), query, self.page_size).await
    }
}
