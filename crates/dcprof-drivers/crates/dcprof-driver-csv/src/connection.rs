//! CSV connection implementation

use async_trait::async_trait;
use dcprof_core::{
    ColumnInfo, ColumnMeta, Connection, DcprofError, QueryResult, Result, Row, SchemaIntrospection,
    SelectQuery, TableInfo, Value,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use crate::{CsvConfiguration, CsvError};

const COLUMN_DATA_TYPE: &str = "STRING";

/// A CSV file exposed as a single table named after the file stem.
///
/// The file is parsed on first use and re-parsed whenever its modification
/// time changes.
pub struct CsvConnection {
    path: PathBuf,
    table_name: String,
    configuration: CsvConfiguration,
    cache: Mutex<Option<CachedTable>>,
    closed: AtomicBool,
}

struct CachedTable {
    modified: Option<SystemTime>,
    table: Arc<ParsedTable>,
}

/// Fully parsed file contents
#[derive(Debug, Default)]
struct ParsedTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    warnings: Vec<String>,
}

impl CsvConnection {
    /// Open a CSV file with the given parse options
    pub fn open(path: impl Into<PathBuf>, configuration: CsvConfiguration) -> Result<Self> {
        let path = path.into();
        tracing::info!(path = %path.display(), "opening CSV datastore");

        configuration.validate()?;
        if !path.is_file() {
            return Err(DcprofError::Connection(format!(
                "CSV file does not exist: {}",
                path.display()
            )));
        }

        let table_name = table_name_for(&path);
        Ok(Self {
            path,
            table_name,
            configuration,
            cache: Mutex::new(None),
            closed: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn configuration(&self) -> &CsvConfiguration {
        &self.configuration
    }

    async fn load(&self) -> Result<Arc<ParsedTable>> {
        if self.is_closed() {
            return Err(DcprofError::Connection("Connection is closed".into()));
        }

        let modified = tokio::fs::metadata(&self.path)
            .await
            .and_then(|m| m.modified())
            .ok();
        let cached = self
            .cache
            .lock()
            .as_ref()
            .filter(|c| c.modified.is_some() && c.modified == modified)
            .map(|c| c.table.clone());
        if let Some(table) = cached {
            return Ok(table);
        }

        let path = self.path.clone();
        let configuration = self.configuration.clone();
        let parsed = tokio::task::spawn_blocking(move || parse_file(&path, &configuration))
            .await
            .map_err(|e| DcprofError::Other(format!("CSV reader task failed: {}", e)))??;

        tracing::debug!(
            path = %self.path.display(),
            columns = parsed.columns.len(),
            rows = parsed.rows.len(),
            warnings = parsed.warnings.len(),
            "parsed CSV file"
        );

        let table = Arc::new(parsed);
        *self.cache.lock() = Some(CachedTable {
            modified,
            table: table.clone(),
        });
        Ok(table)
    }

    fn check_table(&self, table: &str) -> Result<()> {
        if table == self.table_name {
            Ok(())
        } else {
            Err(DcprofError::NotFound(format!(
                "Table '{}' not found in {}",
                table,
                self.path.display()
            )))
        }
    }
}

#[async_trait]
impl Connection for CsvConnection {
    fn driver_name(&self) -> &str {
        "csv"
    }

    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    async fn query(&self, query: &SelectQuery) -> Result<QueryResult> {
        let start_time = std::time::Instant::now();
        tracing::debug!(query = %query, "executing CSV query");

        self.check_table(&query.table)?;
        let table = self.load().await?;

        let indices: Vec<usize> = if query.selects_all() {
            (0..table.columns.len()).collect()
        } else {
            query
                .columns
                .iter()
                .map(|name| {
                    table.columns.iter().position(|c| c == name).ok_or_else(|| {
                        DcprofError::Query(format!(
                            "Unknown column '{}' in table '{}'",
                            name, self.table_name
                        ))
                    })
                })
                .collect::<Result<_>>()?
        };

        let column_names: Vec<String> = indices.iter().map(|&i| table.columns[i].clone()).collect();
        let columns = indices
            .iter()
            .zip(&column_names)
            .map(|(&ordinal, name)| ColumnMeta {
                name: name.clone(),
                data_type: COLUMN_DATA_TYPE.to_string(),
                nullable: true,
                ordinal,
            })
            .collect();

        let rows = table
            .rows
            .iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|record| {
                let values = indices
                    .iter()
                    .map(|&i| match record.get(i) {
                        Some(value) => Value::String(value.clone()),
                        None => Value::Null,
                    })
                    .collect();
                Row::new(column_names.clone(), values)
            })
            .collect();

        Ok(QueryResult {
            columns,
            rows,
            total_rows: Some(table.rows.len() as u64),
            execution_time_ms: start_time.elapsed().as_millis() as u64,
            warnings: table.warnings.clone(),
        })
    }

    async fn count(&self, query: &SelectQuery) -> Result<u64> {
        self.check_table(&query.table)?;
        Ok(self.load().await?.rows.len() as u64)
    }

    async fn close(&self) -> Result<()> {
        tracing::info!(path = %self.path.display(), "closing CSV connection");
        self.closed.store(true, Ordering::SeqCst);
        self.cache.lock().take();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        Some(self)
    }
}

#[async_trait]
impl SchemaIntrospection for CsvConnection {
    async fn list_tables(&self) -> Result<Vec<TableInfo>> {
        let table = self.load().await?;
        let size_bytes = tokio::fs::metadata(&self.path)
            .await
            .ok()
            .map(|m| m.len() as i64);
        Ok(vec![TableInfo {
            name: self.table_name.clone(),
            row_count: Some(table.rows.len() as i64),
            size_bytes,
            comment: None,
        }])
    }

    async fn get_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        self.check_table(table)?;
        let parsed = self.load().await?;
        Ok(parsed
            .columns
            .iter()
            .enumerate()
            .map(|(ordinal, name)| ColumnInfo {
                name: name.clone(),
                ordinal,
                data_type: COLUMN_DATA_TYPE.to_string(),
                nullable: true,
            })
            .collect())
    }
}

fn table_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "data".to_string())
}

fn parse_file(path: &Path, configuration: &CsvConfiguration) -> std::result::Result<ParsedTable, CsvError> {
    let encoding = configuration.text_encoding()?;
    let bytes = std::fs::read(path)?;
    let text = encoding.decode(&bytes)?;
    parse_text(&text, configuration)
}

fn parse_text(text: &str, configuration: &CsvConfiguration) -> std::result::Result<ParsedTable, CsvError> {
    let header_line = configuration.column_name_line_number;
    let mut reader = configuration.reader_builder().from_reader(text.as_bytes());

    let mut table = ParsedTable::default();
    let mut width: Option<usize> = None;
    let mut record_number = 0usize;

    for record in reader.records() {
        let record = record?;
        record_number += 1;

        if header_line > 0 && record_number <= header_line {
            if record_number == header_line {
                table.columns = header_names(record.iter());
                width = Some(table.columns.len());
            }
            continue;
        }

        let mut values: Vec<String> = record.iter().map(str::to_string).collect();
        let expected = *width.get_or_insert_with(|| {
            table.columns = generated_names(values.len());
            values.len()
        });

        if values.len() != expected {
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(record_number as u64);
            if configuration.fail_on_inconsistent_row_length {
                return Err(CsvError::InconsistentRowLength {
                    line,
                    expected,
                    found: values.len(),
                });
            }
            tracing::warn!(line, expected, found = values.len(), "inconsistent CSV row length");
            table.warnings.push(format!(
                "Line {}: expected {} values, found {}",
                line,
                expected,
                values.len()
            ));
            values.truncate(expected);
        }
        table.rows.push(values);
    }

    Ok(table)
}

/// Column names from a header record. Blank names fall back to the
/// spreadsheet letter of their position and duplicates get a numeric suffix.
fn header_names<'a>(fields: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    fields
        .enumerate()
        .map(|(idx, raw)| {
            let base = match raw.trim() {
                "" => column_letter(idx),
                name => name.to_string(),
            };
            let mut name = base.clone();
            let mut suffix = 2;
            while !seen.insert(name.clone()) {
                name = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}

fn generated_names(count: usize) -> Vec<String> {
    (0..count).map(column_letter).collect()
}

/// 0 -> A, 25 -> Z, 26 -> AA
fn column_letter(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (idx % 26) as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.iter().rev().collect()
}
