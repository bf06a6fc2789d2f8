//! Datastore lifecycle service
//!
//! Opens datastores registered in the catalog, or ad-hoc CSV files, through
//! the driver registry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dcprof_core::{Connection, ConnectionConfig, TableRef};
use dcprof_driver_csv::{CsvConfiguration, detect_configuration};
use dcprof_drivers::DriverRegistry;
use dcprof_wizard::{DatastoreCatalog, DatastoreDefinition};

use crate::error::{ServiceError, ServiceResult};

/// Service for opening registered datastores
pub struct DatastoreService {
    registry: Arc<DriverRegistry>,
    catalog: DatastoreCatalog,
    /// Relative datastore file names resolve against this directory
    repository_dir: PathBuf,
}

impl DatastoreService {
    pub fn new(
        registry: Arc<DriverRegistry>,
        catalog: DatastoreCatalog,
        repository_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            catalog,
            repository_dir: repository_dir.into(),
        }
    }

    pub fn catalog(&self) -> &DatastoreCatalog {
        &self.catalog
    }

    pub fn repository_dir(&self) -> &Path {
        &self.repository_dir
    }

    /// CSV datastores registered in the catalog
    pub fn list_datastores(&self) -> ServiceResult<Vec<DatastoreDefinition>> {
        Ok(self.catalog.list()?)
    }

    /// Open the registered datastore called `name`
    #[tracing::instrument(skip(self))]
    pub async fn open(&self, name: &str) -> ServiceResult<Arc<dyn Connection>> {
        let definition = self
            .catalog
            .find(name)?
            .ok_or_else(|| ServiceError::DatastoreNotFound(name.to_string()))?;
        let config = definition.to_connection_config(&self.repository_dir);
        self.connect(&config).await
    }

    /// Open a CSV file that is not registered, detecting its configuration
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    pub async fn open_file(&self, path: &Path) -> ServiceResult<Arc<dyn Connection>> {
        let configuration = match detect_configuration(path) {
            Ok(configuration) => configuration,
            Err(e) => {
                tracing::warn!(error = %e, "configuration detection failed, using defaults");
                CsvConfiguration::default()
            }
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let config = configuration
            .apply_to(ConnectionConfig::new("csv", &name))
            .with_param("path", path.to_string_lossy().into_owned());
        self.connect(&config).await
    }

    async fn connect(&self, config: &ConnectionConfig) -> ServiceResult<Arc<dyn Connection>> {
        self.registry.connect(config).await.map_err(|e| {
            tracing::error!(datastore = %config.name, error = %e, "failed to open datastore");
            ServiceError::ConnectionFailed(e.to_string())
        })
    }

    /// The table a single-table datastore exposes, or the first one listed
    pub async fn default_table(&self, connection: &dyn Connection) -> ServiceResult<TableRef> {
        let schema = connection
            .as_schema_introspection()
            .ok_or(ServiceError::SchemaNotSupported)?;
        let tables = schema
            .list_tables()
            .await
            .map_err(|e| ServiceError::QueryFailed(e.to_string()))?;
        let table = tables
            .first()
            .ok_or_else(|| ServiceError::QueryFailed("The datastore has no tables".into()))?;
        schema
            .get_table(&table.name)
            .await
            .map_err(|e| ServiceError::QueryFailed(e.to_string()))
    }
}
