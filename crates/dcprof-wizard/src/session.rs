//! The CSV datastore wizard session

use std::io;
use std::path::{Path, PathBuf};

use dcprof_driver_csv::{CsvConfiguration, detect_configuration};

use crate::validation::{
    check_readable, check_server_file_extension, ensure_writable_directory, is_same_file,
    resolve_location,
};
use crate::{
    DatastoreDefinition, DatastoreWizardContext, FileSource, PageInput, WizardError, WizardPage,
    XmlElement,
};

const PAGE_COUNT: usize = 4;

/// Outcome of a successful page submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardProgress {
    /// Moved on to the page with this index
    Next(usize),
    Finished,
}

/// Collects the settings of a new CSV datastore over four pages:
/// file source, location, CSV configuration, then name and description.
///
/// A rejected submission leaves the session on the same page with its state
/// untouched.
#[derive(Debug)]
pub struct CsvDatastoreWizardSession {
    context: DatastoreWizardContext,
    page: Option<WizardPage>,
    filepath: Option<String>,
    file: Option<PathBuf>,
    configuration: Option<CsvConfiguration>,
    name: Option<String>,
    description: Option<String>,
}

impl CsvDatastoreWizardSession {
    pub fn new(context: DatastoreWizardContext) -> Self {
        Self {
            context,
            page: Some(WizardPage::UploadOrExistingFile),
            filepath: None,
            file: None,
            configuration: None,
            name: None,
            description: None,
        }
    }

    pub fn page_count(&self) -> usize {
        PAGE_COUNT
    }

    /// The page awaiting input, `None` once finished
    pub fn current_page(&self) -> Option<&WizardPage> {
        self.page.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.page.is_none()
    }

    pub fn context(&self) -> &DatastoreWizardContext {
        &self.context
    }

    /// Resolved location of the datastore file, once chosen
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Submit the values of the current page
    #[tracing::instrument(skip(self, input), fields(page = self.page.as_ref().map(|p| p.index())))]
    pub fn submit(&mut self, input: PageInput) -> Result<WizardProgress, WizardError> {
        let page = self
            .page
            .clone()
            .ok_or_else(|| WizardError::InvalidState("the wizard is already finished".into()))?;
        if page.index() != input.page_index() {
            return Err(WizardError::InvalidState(format!(
                "page {} cannot accept input for page {}",
                page.index(),
                input.page_index()
            )));
        }

        let next = match (page, input) {
            (WizardPage::UploadOrExistingFile, PageInput::FileSource(source)) => {
                if let FileSource::Upload { filename, temp_file } = &source {
                    if filename.trim().is_empty() {
                        return Err(WizardError::user_input("Please select a file to upload"));
                    }
                    if !temp_file.is_file() {
                        return Err(WizardError::user_input(format!(
                            "Uploaded file is no longer available:\n{}",
                            filename
                        )));
                    }
                }
                Some(WizardPage::Location { source })
            }
            (WizardPage::Location { source }, PageInput::Location { filepath }) => {
                Some(self.submit_location(&source, &filepath)?)
            }
            (WizardPage::CsvConfiguration { filename, .. }, PageInput::Configuration(configuration)) => {
                configuration
                    .validate()
                    .map_err(|e| WizardError::user_input(e.to_string()))?;
                self.configuration = Some(configuration);
                Some(WizardPage::NameAndDescription { filename })
            }
            (WizardPage::NameAndDescription { .. }, PageInput::NameAndDescription { name, description }) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(WizardError::user_input("Please enter a datastore name"));
                }
                if self.context.contains_datastore(name) {
                    return Err(WizardError::user_input(format!(
                        "A datastore named '{}' already exists",
                        name
                    )));
                }
                self.name = Some(name.to_string());
                self.description = description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty());
                None
            }
            _ => {
                return Err(WizardError::InvalidState(
                    "input does not match the current page".into(),
                ));
            }
        };

        self.page = next;
        match &self.page {
            Some(page) => {
                tracing::debug!(next_page = page.index(), "wizard advanced");
                Ok(WizardProgress::Next(page.index()))
            }
            None => {
                tracing::info!(name = ?self.name, "wizard finished");
                Ok(WizardProgress::Finished)
            }
        }
    }

    fn submit_location(
        &mut self,
        source: &FileSource,
        filepath: &str,
    ) -> Result<WizardPage, WizardError> {
        let filepath = filepath.trim();
        let file = resolve_location(&self.context, filepath)?;

        let filename = match source {
            FileSource::Upload {
                filename,
                temp_file,
            } => {
                ensure_writable_directory(filepath, &file)?;
                if is_same_file(temp_file, &file) {
                    return Err(WizardError::user_input(format!(
                        "The uploaded file cannot be stored over itself:\n{}",
                        filepath
                    )));
                }
                store_upload(temp_file, &file).map_err(|e| {
                    tracing::error!(
                        from = %temp_file.display(),
                        to = %file.display(),
                        error = %e,
                        "failed to copy uploaded file"
                    );
                    WizardError::user_input(format!(
                        "Could not copy uploaded file to:\n{}",
                        filepath
                    ))
                })?;
                tracing::info!(file = %file.display(), "stored uploaded file");
                filename.clone()
            }
            FileSource::Existing => {
                check_server_file_extension(filepath)?;
                check_readable(filepath, &file)?;
                file.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| filepath.to_string())
            }
        };

        let defaults = if file.is_file() {
            detect_configuration(&file).unwrap_or_else(|e| {
                tracing::warn!(file = %file.display(), error = %e, "configuration detection failed");
                CsvConfiguration::default()
            })
        } else {
            CsvConfiguration::default()
        };

        self.filepath = Some(filepath.to_string());
        self.file = Some(file);
        Ok(WizardPage::CsvConfiguration { filename, defaults })
    }

    /// The datastore collected by a finished session
    pub fn datastore_definition(&self) -> Result<DatastoreDefinition, WizardError> {
        let not_finished = || WizardError::InvalidState("the wizard is not finished".into());
        if !self.is_finished() {
            return Err(not_finished());
        }
        Ok(DatastoreDefinition {
            name: self.name.clone().ok_or_else(not_finished)?,
            description: self.description.clone(),
            filename: self.filepath.clone().ok_or_else(not_finished)?,
            configuration: self.configuration.clone().ok_or_else(not_finished)?,
        })
    }

    /// The `<csv-datastore>` element for a finished session
    pub fn create_datastore_element(&self) -> Result<XmlElement, WizardError> {
        Ok(self.datastore_definition()?.to_element())
    }
}

/// Stage a copy of the upload beside `file`, then rename it into place.
/// `file` itself is never opened for writing.
fn store_upload(temp_file: &Path, file: &Path) -> io::Result<()> {
    let directory = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut source = std::fs::File::open(temp_file)?;
    let permissions = source.metadata()?.permissions();

    let mut staged = tempfile::NamedTempFile::new_in(directory)?;
    io::copy(&mut source, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    std::fs::set_permissions(staged.path(), permissions)?;
    staged.persist(file).map_err(|e| e.error)?;
    Ok(())
}
