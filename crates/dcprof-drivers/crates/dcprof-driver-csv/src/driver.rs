//! CSV driver implementation

use async_trait::async_trait;
use dcprof_core::{
    Connection, ConnectionConfig, ConnectionField, ConnectionFieldOption, ConnectionFieldSchema,
    DatastoreDriver, DcprofError, Result, SelectQuery,
};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{CsvConfiguration, CsvConnection, TextEncoding, format_char};

/// CSV file datastore driver
pub struct CsvDriver;

impl CsvDriver {
    /// Create a new CSV driver instance
    pub fn new() -> Self {
        tracing::debug!("CSV driver initialized");
        Self
    }
}

impl Default for CsvDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatastoreDriver for CsvDriver {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn display_name(&self) -> &'static str {
        "CSV file"
    }

    #[tracing::instrument(skip(self, config), fields(path = config.get_string("path").as_deref()))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let path = config.get_string("path").ok_or_else(|| {
            DcprofError::Configuration(
                "CSV requires a 'path' parameter. Example: { \"path\": \"/data/customers.csv\" }"
                    .into(),
            )
        })?;
        let configuration = CsvConfiguration::from_connection_config(config)?;

        let conn = CsvConnection::open(&path, configuration)
            .inspect_err(|e| tracing::error!(error = %e, "failed to open CSV datastore"))?;

        tracing::info!(path = %path, table = conn.table_name(), "CSV connection created");
        Ok(Arc::new(conn))
    }

    #[tracing::instrument(skip(self, config))]
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<()> {
        tracing::debug!("testing CSV connection");
        let conn = self.connect(config).await?;
        let schema = conn
            .as_schema_introspection()
            .ok_or_else(|| DcprofError::Driver("CSV connection lacks introspection".into()))?;
        let tables = schema.list_tables().await?;
        if let Some(table) = tables.first() {
            conn.query(&SelectQuery::from_table(&table.name).limit(1))
                .await?;
        }
        Ok(())
    }

    fn default_params(&self) -> HashMap<String, String> {
        CsvConfiguration::default()
            .apply_to(ConnectionConfig::new(self.name(), ""))
            .params
    }

    fn connection_field_schema(&self) -> ConnectionFieldSchema {
        let defaults = CsvConfiguration::default();
        let encodings = TextEncoding::common()
            .iter()
            .map(|e| ConnectionFieldOption::new(e.label(), e.label()))
            .collect();

        ConnectionFieldSchema {
            title: Cow::Borrowed("CSV file"),
            fields: vec![
                ConnectionField::file_path("path", "File")
                    .placeholder("/path/to/data.csv")
                    .with_extensions(vec!["csv", "tsv", "txt"])
                    .required(),
                ConnectionField::character("separator_char", "Separator")
                    .default_value(format_char(Some(defaults.separator_char)))
                    .required()
                    .help_text("Use \\t for tab"),
                ConnectionField::character("quote_char", "Quote character")
                    .default_value(format_char(defaults.quote_char))
                    .help_text("NOT_A_CHAR disables quoting"),
                ConnectionField::character("escape_char", "Escape character")
                    .default_value(format_char(defaults.escape_char))
                    .help_text("NOT_A_CHAR disables escaping"),
                ConnectionField::select("encoding", "Encoding", encodings)
                    .default_value(defaults.encoding),
                ConnectionField::number("header_line_number", "Header line")
                    .default_value(defaults.column_name_line_number.to_string())
                    .help_text("0 if the file has no header line"),
                ConnectionField::boolean("fail_on_inconsistencies", "Fail on inconsistent rows")
                    .default_value(defaults.fail_on_inconsistent_row_length.to_string()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_requires_path() {
        let driver = CsvDriver::new();
        let result = driver.connect(&ConnectionConfig::new("csv", "x")).await;
        assert!(matches!(result, Err(DcprofError::Configuration(_))));
    }

    #[tokio::test]
    async fn connect_reads_params() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        std::fs::write(&path, "name|score\nAnn|3\n").unwrap();

        let config = ConnectionConfig::new("csv", "scores")
            .with_param("path", path.to_string_lossy().to_string())
            .with_param("separator_char", "|");

        let driver = CsvDriver::new();
        driver.test_connection(&config).await.unwrap();

        let conn = driver.connect(&config).await.unwrap();
        let result = conn.query(&SelectQuery::from_table("scores")).await.unwrap();
        assert_eq!(result.column_names(), vec!["name", "score"]);
    }

    #[tokio::test]
    async fn invalid_character_param_is_configuration_error() {
        let config = ConnectionConfig::new("csv", "x")
            .with_param("path", "whatever.csv")
            .with_param("separator_char", ";;");
        let result = CsvDriver::new().connect(&config).await;
        assert!(matches!(result, Err(DcprofError::Configuration(_))));
    }

    #[test]
    fn schema_and_defaults_agree() {
        let driver = CsvDriver::new();
        let schema = driver.connection_field_schema();
        let params = driver.default_params();

        for id in ["separator_char", "quote_char", "escape_char", "encoding"] {
            let field = schema.field(id).unwrap();
            assert_eq!(field.default_value.as_deref(), params.get(id).map(String::as_str));
        }
        assert!(schema.field("path").unwrap().required);
    }
}
