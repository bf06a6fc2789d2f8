//! Datastore driver trait definition

use crate::{Connection, Result};
use async_trait::async_trait;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// Field type for connection forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionFieldType {
    /// Single-line text input
    Text,
    /// A single character (separator, quote, escape...)
    Character,
    /// Numeric input
    Number,
    /// File path with browse button
    FilePath {
        /// File extension filter (e.g., "csv", "tsv")
        extensions: Vec<&'static str>,
    },
    /// Dropdown/select with predefined options
    Select { options: Vec<ConnectionFieldOption> },
    /// Checkbox/toggle
    Boolean,
}

/// Option for select fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionFieldOption {
    pub value: Cow<'static, str>,
    pub label: Cow<'static, str>,
}

impl ConnectionFieldOption {
    pub const fn new(value: &'static str, label: &'static str) -> Self {
        Self {
            value: Cow::Borrowed(value),
            label: Cow::Borrowed(label),
        }
    }
}

/// Definition of a form field
#[derive(Debug, Clone)]
pub struct ConnectionField {
    /// Field identifier (used as key in params)
    pub id: Cow<'static, str>,
    /// Display label
    pub label: Cow<'static, str>,
    /// Field type
    pub field_type: ConnectionFieldType,
    /// Placeholder text
    pub placeholder: Option<Cow<'static, str>>,
    /// Default value
    pub default_value: Option<Cow<'static, str>>,
    /// Whether the field is required
    pub required: bool,
    /// Help text shown below the field
    pub help_text: Option<Cow<'static, str>>,
}

impl ConnectionField {
    const fn with_type(id: &'static str, label: &'static str, field_type: ConnectionFieldType) -> Self {
        Self {
            id: Cow::Borrowed(id),
            label: Cow::Borrowed(label),
            field_type,
            placeholder: None,
            default_value: None,
            required: false,
            help_text: None,
        }
    }

    /// Create a new text field
    pub const fn text(id: &'static str, label: &'static str) -> Self {
        Self::with_type(id, label, ConnectionFieldType::Text)
    }

    /// Create a new single-character field
    pub const fn character(id: &'static str, label: &'static str) -> Self {
        Self::with_type(id, label, ConnectionFieldType::Character)
    }

    /// Create a new number field
    pub const fn number(id: &'static str, label: &'static str) -> Self {
        Self::with_type(id, label, ConnectionFieldType::Number)
    }

    /// Create a new file path field
    pub const fn file_path(id: &'static str, label: &'static str) -> Self {
        Self::with_type(
            id,
            label,
            ConnectionFieldType::FilePath {
                extensions: Vec::new(),
            },
        )
    }

    /// Create a new boolean/checkbox field
    pub const fn boolean(id: &'static str, label: &'static str) -> Self {
        Self::with_type(id, label, ConnectionFieldType::Boolean)
    }

    /// Create a new select field
    pub fn select(id: &'static str, label: &'static str, options: Vec<ConnectionFieldOption>) -> Self {
        Self::with_type(id, label, ConnectionFieldType::Select { options })
    }

    // Builder methods
    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(Cow::Borrowed(placeholder));
        self
    }

    pub fn default_value(mut self, value: impl Into<Cow<'static, str>>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn help_text(mut self, text: &'static str) -> Self {
        self.help_text = Some(Cow::Borrowed(text));
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<&'static str>) -> Self {
        if let ConnectionFieldType::FilePath { .. } = self.field_type {
            self.field_type = ConnectionFieldType::FilePath { extensions };
        }
        self
    }
}

/// Schema defining all fields of a form
#[derive(Debug, Clone)]
pub struct ConnectionFieldSchema {
    /// Form title (e.g., "CSV file")
    pub title: Cow<'static, str>,
    /// Fields to display
    pub fields: Vec<ConnectionField>,
}

impl ConnectionFieldSchema {
    pub fn field(&self, id: &str) -> Option<&ConnectionField> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// Core driver trait that all datastore drivers must implement
#[async_trait]
pub trait DatastoreDriver: Send + Sync {
    /// Unique identifier for this driver (e.g., "csv")
    fn id(&self) -> &'static str {
        self.name()
    }

    /// Machine name (e.g., "csv")
    fn name(&self) -> &'static str;

    /// Display name for UI
    fn display_name(&self) -> &'static str {
        self.name()
    }

    /// Create a new connection
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>>;

    /// Test connection without keeping it open
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<()>;

    /// Get default connection parameters
    fn default_params(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Get the connection field schema for forms
    fn connection_field_schema(&self) -> ConnectionFieldSchema;
}

/// Connection configuration
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Display name (the datastore name)
    pub name: String,
    /// Driver ID (e.g., "csv")
    pub driver: String,
    /// Optional description
    pub description: Option<String>,
    /// Driver-specific parameters
    pub params: HashMap<String, String>,
}

impl ConnectionConfig {
    /// Create a new configuration with default values
    pub fn new(driver: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            driver: driver.to_string(),
            description: None,
            params: HashMap::new(),
        }
    }

    /// Set a connection parameter
    pub fn with_param(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        let val = value.into();
        let str_val = match val {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        self.params.insert(key.to_string(), str_val);
        self
    }

    /// Get a string parameter
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.params.get(key).cloned()
    }

    /// Get a parameter parsed into `T`
    pub fn get_parsed<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.params.get(key).and_then(|v| v.trim().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_are_stringified() {
        let config = ConnectionConfig::new("csv", "orders")
            .with_param("path", "orders.csv")
            .with_param("header_line_number", 2)
            .with_param("fail_on_inconsistencies", true);

        assert_eq!(config.get_string("path").as_deref(), Some("orders.csv"));
        assert_eq!(config.get_parsed::<usize>("header_line_number"), Some(2));
        assert_eq!(config.get_parsed::<bool>("fail_on_inconsistencies"), Some(true));
        assert_eq!(config.get_string("missing"), None);
    }

    #[test]
    fn field_builder() {
        let field = ConnectionField::file_path("path", "File")
            .with_extensions(vec!["csv", "tsv"])
            .default_value("my_file.csv")
            .required();
        assert!(field.required);
        assert_eq!(field.default_value.as_deref(), Some("my_file.csv"));
        assert_eq!(
            field.field_type,
            ConnectionFieldType::FilePath {
                extensions: vec!["csv", "tsv"]
            }
        );
    }
}
