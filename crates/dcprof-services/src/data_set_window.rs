//! Paginated grid over a select query
//!
//! Holds one page of rows at a time. Paging re-issues the query with a new
//! offset; the unpaged row count is kept once the connection reports it.

use std::sync::Arc;

use dcprof_core::{Connection, QueryResult, Row, SelectQuery};

use crate::error::{ServiceError, ServiceResult};

pub struct DataSetWindow {
    connection: Arc<dyn Connection>,
    query: SelectQuery,
    page_size: usize,
    current_page: usize,
    result: QueryResult,
    total_rows: Option<u64>,
}

impl DataSetWindow {
    /// Open a window over `query` and load its first page
    #[tracing::instrument(skip(connection, query), fields(query = %query))]
    pub async fn open(
        connection: Arc<dyn Connection>,
        query: SelectQuery,
        page_size: usize,
    ) -> ServiceResult<Self> {
        let mut window = Self {
            connection,
            query,
            page_size: page_size.max(1),
            current_page: 0,
            result: QueryResult::empty(),
            total_rows: None,
        };
        window.load_page(0).await?;
        Ok(window)
    }

    /// Load `page`. Returns `false`, leaving the window as it was, when the
    /// page is past the end of the data.
    async fn load_page(&mut self, page: usize) -> ServiceResult<bool> {
        let offset = page * self.page_size;
        let paged = self.query.page(offset, self.page_size);
        tracing::debug!(page, query = %paged, "loading data set page");

        let result = self
            .connection
            .query(&paged)
            .await
            .map_err(|e| ServiceError::QueryFailed(e.to_string()))?;

        tracing::debug!(
            page,
            rows = result.row_count(),
            elapsed_ms = result.execution_time_ms,
            "data set page loaded"
        );
        for warning in &result.warnings {
            tracing::warn!(page, "{}", warning);
        }

        if page > 0 && result.rows.is_empty() {
            // Right after a full page the end is exact
            if self.total_rows.is_none() && page == self.current_page + 1 {
                self.total_rows = Some(offset as u64);
            }
            tracing::debug!(page, "page is past the end of the data set");
            return Ok(false);
        }

        // A short page tells us where the data ends
        let total = result.total_rows.or(self.total_rows).or_else(|| {
            (result.row_count() < self.page_size).then(|| (offset + result.row_count()) as u64)
        });

        self.total_rows = total;
        self.current_page = page;
        self.result = result;
        Ok(true)
    }

    /// Move to the next page. Returns `false` when already on the last one,
    /// including when that only shows once the next page comes back empty.
    pub async fn next_page(&mut self) -> ServiceResult<bool> {
        if !self.has_next_page() {
            return Ok(false);
        }
        self.load_page(self.current_page + 1).await
    }

    /// Move to the previous page. Returns `false` when already on the first one.
    pub async fn previous_page(&mut self) -> ServiceResult<bool> {
        if self.current_page == 0 {
            return Ok(false);
        }
        self.load_page(self.current_page - 1).await
    }

    /// Jump to a 0-based page
    pub async fn go_to_page(&mut self, page: usize) -> ServiceResult<()> {
        if let Some(page_count) = self.page_count()
            && page >= page_count
        {
            return Err(ServiceError::PageOutOfRange { page, page_count });
        }
        if self.load_page(page).await? {
            return Ok(());
        }
        Err(match self.page_count() {
            Some(page_count) => ServiceError::PageOutOfRange { page, page_count },
            None => ServiceError::PageBeyondEnd { page },
        })
    }

    pub fn has_next_page(&self) -> bool {
        match self.total_rows {
            Some(total) => ((self.current_page + 1) * self.page_size) < total as usize,
            None => self.result.row_count() >= self.page_size,
        }
    }

    /// Number of pages, once the total row count is known. An empty data set
    /// still has one (empty) page.
    pub fn page_count(&self) -> Option<usize> {
        self.total_rows
            .map(|total| (total as usize).div_ceil(self.page_size).max(1))
    }

    pub fn query(&self) -> &SelectQuery {
        &self.query
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 0-based index of the loaded page
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_rows(&self) -> Option<u64> {
        self.total_rows
    }

    /// The loaded page as returned by the connection
    pub fn result(&self) -> &QueryResult {
        &self.result
    }

    pub fn rows(&self) -> &[Row] {
        &self.result.rows
    }

    pub fn column_names(&self) -> Vec<String> {
        self.result.column_names()
    }

    /// 1-based number of the first row on the loaded page
    pub fn first_row_number(&self) -> usize {
        self.current_page * self.page_size + 1
    }

    pub fn title(&self) -> String {
        format!("Preview: {}", self.query.table)
    }
}

impl std::fmt::Debug for DataSetWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSetWindow")
            .field("query", &self.query)
            .field("page_size", &self.page_size)
            .field("current_page", &self.current_page)
            .field("total_rows", &self.total_rows)
            .finish_non_exhaustive()
    }
}
