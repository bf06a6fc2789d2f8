//! dcprof Settings
//!
//! Persisted application settings:
//! - Storage settings (repository directory, catalog file)
//! - Preview settings (grid page size)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod settings_file;

pub use settings_file::*;

/// Rows per preview page unless configured otherwise
pub const DEFAULT_PREVIEW_PAGE_SIZE: usize = 35;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DcprofSettings {
    pub storage: StorageSettings,
    pub preview: PreviewSettings,
}

impl DcprofSettings {
    /// Load from the user's settings file, or defaults when there is none
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(())
    }

    pub fn settings_path() -> Result<PathBuf> {
        settings_file()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Base directory for datastore files; relative wizard locations resolve here
    pub repository_dir: Option<PathBuf>,
    /// Catalog file, relative to the repository directory unless absolute
    pub catalog_file: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            repository_dir: None,
            catalog_file: PathBuf::from("conf.xml"),
        }
    }
}

impl StorageSettings {
    pub fn repository_dir(&self) -> Result<PathBuf> {
        match &self.repository_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_repository_dir(),
        }
    }

    /// The catalog file for a repository directory
    pub fn catalog_path(&self, repository_dir: &Path) -> PathBuf {
        repository_dir.join(&self.catalog_file)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub page_size: usize,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PREVIEW_PAGE_SIZE,
        }
    }
}
