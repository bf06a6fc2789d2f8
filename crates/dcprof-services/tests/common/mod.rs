//! Common test utilities and mocks

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use dcprof_core::{
    ColumnInfo, ColumnMeta, Connection, DcprofError, QueryResult, Result, Row,
    SchemaIntrospection, SelectQuery, TableInfo, Value,
};

/// Mock connection serving an in-memory table.
///
/// Honours the column selection, offset and limit of each query and records
/// every query it receives so tests can assert on the paging.
pub struct MockConnection {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Whether query results carry the unpaged row count
    pub reports_total: bool,
    pub should_fail: bool,
    /// Log of all queries executed, rendered with `Display`
    pub query_log: Arc<parking_lot::Mutex<Vec<String>>>,
}

impl MockConnection {
    pub fn new(table: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            table: table.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            reports_total: true,
            should_fail: false,
            query_log: Arc::new(parking_lot::Mutex::new(Vec::new())),
        }
    }

    /// Fill with `count` rows whose first column is the 1-based row number
    pub fn with_numbered_rows(mut self, count: usize) -> Self {
        let width = self.columns.len();
        self.rows = (1..=count)
            .map(|n| {
                let mut row = vec![Value::Int64(n as i64)];
                row.extend((1..width).map(|c| Value::String(format!("r{}c{}", n, c))));
                row
            })
            .collect();
        self
    }

    pub fn without_total(mut self) -> Self {
        self.reports_total = false;
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn query_log(&self) -> Vec<String> {
        self.query_log.lock().clone()
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn driver_name(&self) -> &str {
        "mock"
    }

    async fn query(&self, query: &SelectQuery) -> Result<QueryResult> {
        self.query_log.lock().push(query.to_string());

        if self.should_fail {
            return Err(DcprofError::Query("Query failed".into()));
        }
        if query.table != self.table {
            return Err(DcprofError::NotFound(query.table.clone()));
        }

        let selected: Vec<String> = if query.selects_all() {
            self.columns.clone()
        } else {
            query.columns.clone()
        };
        let indices = selected
            .iter()
            .map(|name| {
                self.columns
                    .iter()
                    .position(|c| c == name)
                    .ok_or_else(|| DcprofError::Query(format!("Unknown column '{}'", name)))
            })
            .collect::<Result<Vec<_>>>()?;

        let rows = self
            .rows
            .iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|values| {
                Row::new(
                    selected.clone(),
                    indices.iter().map(|&i| values[i].clone()).collect(),
                )
            })
            .collect();

        Ok(QueryResult {
            columns: selected
                .iter()
                .zip(&indices)
                .map(|(name, &ordinal)| ColumnMeta {
                    name: name.clone(),
                    ordinal,
                    ..Default::default()
                })
                .collect(),
            rows,
            total_rows: self.reports_total.then_some(self.rows.len() as u64),
            ..QueryResult::empty()
        })
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        Some(self)
    }
}

#[async_trait]
impl SchemaIntrospection for MockConnection {
    async fn list_tables(&self) -> Result<Vec<TableInfo>> {
        Ok(vec![TableInfo {
            name: self.table.clone(),
            row_count: Some(self.rows.len() as i64),
            size_bytes: None,
            comment: None,
        }])
    }

    async fn get_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        if table != self.table {
            return Err(DcprofError::NotFound(table.to_string()));
        }
        Ok(self
            .columns
            .iter()
            .enumerate()
            .map(|(ordinal, name)| ColumnInfo {
                name: name.clone(),
                ordinal,
                data_type: "VARCHAR".into(),
                nullable: true,
            })
            .collect())
    }
}
