use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Environment a wizard session runs in
#[derive(Debug, Clone)]
pub struct DatastoreWizardContext {
    repository_dir: PathBuf,
    existing_names: BTreeSet<String>,
}

impl DatastoreWizardContext {
    /// `repository_dir` is the base for relative file locations
    pub fn new(repository_dir: impl Into<PathBuf>) -> Self {
        Self {
            repository_dir: repository_dir.into(),
            existing_names: BTreeSet::new(),
        }
    }

    /// Names of datastores that are already registered
    pub fn with_existing_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.existing_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn repository_dir(&self) -> &Path {
        &self.repository_dir
    }

    pub fn contains_datastore(&self, name: &str) -> bool {
        self.existing_names.contains(name)
    }
}
