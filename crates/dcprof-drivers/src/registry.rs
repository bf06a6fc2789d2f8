//! Driver registry for managing available datastore drivers

use std::collections::HashMap;
use std::sync::Arc;

use dcprof_core::{Connection, ConnectionConfig, DatastoreDriver, DcprofError, Result};

/// Registry of available datastore drivers
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn DatastoreDriver>>,
}

impl DriverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    /// Create a registry with all built-in drivers registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        #[cfg(feature = "csv")]
        registry.register(Arc::new(crate::csv::CsvDriver::new()));

        registry
    }

    /// Register a new driver
    pub fn register(&mut self, driver: Arc<dyn DatastoreDriver>) {
        let name = driver.name().to_string();
        tracing::info!(driver = %name, "registering datastore driver");
        self.drivers.insert(name, driver);
    }

    /// Get a driver by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn DatastoreDriver>> {
        let driver = self.drivers.get(name).cloned();
        if driver.is_none() {
            tracing::warn!(driver = %name, "driver not found in registry");
        }
        driver
    }

    /// List all registered driver names, sorted
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.drivers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Check if a driver is registered
    pub fn has(&self, name: &str) -> bool {
        self.drivers.contains_key(name)
    }

    /// Open a connection with the driver named in `config`
    pub async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let driver = self.get(&config.driver).ok_or_else(|| {
            DcprofError::Driver(format!("No driver registered for '{}'", config.driver))
        })?;
        driver.connect(config).await
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry() {
        let registry = DriverRegistry::new();
        assert!(registry.list().is_empty());
        assert!(registry.get("csv").is_none());
    }

    #[cfg(feature = "csv")]
    #[test]
    fn defaults_include_csv() {
        let registry = DriverRegistry::with_defaults();
        assert!(registry.has("csv"));
        assert_eq!(registry.list(), vec!["csv"]);
        assert_eq!(registry.get("csv").map(|d| d.display_name()), Some("CSV file"));
    }

    #[tokio::test]
    async fn connect_with_unknown_driver_fails() {
        let registry = DriverRegistry::with_defaults();
        let config = ConnectionConfig::new("excel", "sheet");
        assert!(matches!(
            registry.connect(&config).await,
            Err(DcprofError::Driver(_))
        ));
    }

    #[cfg(feature = "csv")]
    #[tokio::test]
    async fn connect_opens_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, "name\nAnn\n").unwrap();

        let config = ConnectionConfig::new("csv", "people")
            .with_param("path", path.to_string_lossy().to_string());
        let conn = DriverRegistry::with_defaults().connect(&config).await.unwrap();
        assert_eq!(conn.driver_name(), "csv");
    }
}
