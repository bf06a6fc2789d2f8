//! Wizard pages and the input each page accepts

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;

use dcprof_core::{
    ConnectionConfig, ConnectionField, ConnectionFieldOption, ConnectionFieldSchema,
    DatastoreDriver,
};
use dcprof_driver_csv::{CsvConfiguration, CsvDriver, parse_char};

use crate::WizardError;

/// Suggested location when referencing a file already on the server
pub(crate) const DEFAULT_EXISTING_LOCATION: &str = "my_file.csv";

/// Where the datastore file comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// A file uploaded by the user, currently stored at `temp_file`
    Upload { filename: String, temp_file: PathBuf },
    /// A file that already exists on the server
    Existing,
}

/// The page a session is currently showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardPage {
    UploadOrExistingFile,
    Location { source: FileSource },
    CsvConfiguration {
        filename: String,
        /// Detected from the file, or plain defaults when it cannot be read
        defaults: CsvConfiguration,
    },
    NameAndDescription { filename: String },
}

impl WizardPage {
    pub fn index(&self) -> usize {
        match self {
            Self::UploadOrExistingFile => 0,
            Self::Location { .. } => 1,
            Self::CsvConfiguration { .. } => 2,
            Self::NameAndDescription { .. } => 3,
        }
    }

    pub fn title(&self) -> Cow<'static, str> {
        match self {
            Self::UploadOrExistingFile => Cow::Borrowed("Upload or select file"),
            Self::Location { .. } => Cow::Borrowed("File location"),
            Self::CsvConfiguration { filename, .. } => Cow::Owned(format!("CSV file: {}", filename)),
            Self::NameAndDescription { .. } => Cow::Borrowed("Name and description"),
        }
    }

    /// Location suggested on the location page
    pub fn default_location(&self) -> Option<&str> {
        match self {
            Self::Location {
                source: FileSource::Upload { filename, .. },
            } => Some(filename),
            Self::Location {
                source: FileSource::Existing,
            } => Some(DEFAULT_EXISTING_LOCATION),
            _ => None,
        }
    }

    /// Form fields to render for this page, with their default values
    pub fn fields(&self) -> ConnectionFieldSchema {
        let fields = match self {
            Self::UploadOrExistingFile => vec![
                ConnectionField::select(
                    "source",
                    "Source",
                    vec![
                        ConnectionFieldOption::new("upload", "Upload a file"),
                        ConnectionFieldOption::new("existing", "Use a file on the server"),
                    ],
                )
                .default_value("upload")
                .required(),
                ConnectionField::file_path("upload_file", "File to upload")
                    .with_extensions(vec!["csv", "tsv", "txt"]),
            ],
            Self::Location { source } => {
                let field = ConnectionField::file_path("filepath", "Location")
                    .default_value(self.default_location().unwrap_or_default().to_string())
                    .required();
                match source {
                    FileSource::Upload { .. } => {
                        vec![field.help_text("Where the uploaded file is stored on the server")]
                    }
                    FileSource::Existing => vec![
                        field
                            .with_extensions(vec!["csv", "tsv"])
                            .help_text("Only .csv and .tsv files can be referenced"),
                    ],
                }
            }
            Self::CsvConfiguration { defaults, .. } => configuration_fields(defaults),
            Self::NameAndDescription { filename } => vec![
                ConnectionField::text("name", "Datastore name")
                    .default_value(filename.clone())
                    .required(),
                ConnectionField::text("description", "Description"),
            ],
        };

        ConnectionFieldSchema {
            title: self.title(),
            fields,
        }
    }
}

/// Values submitted for the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageInput {
    FileSource(FileSource),
    Location { filepath: String },
    Configuration(CsvConfiguration),
    NameAndDescription {
        name: String,
        description: Option<String>,
    },
}

impl PageInput {
    pub(crate) fn page_index(&self) -> usize {
        match self {
            Self::FileSource(_) => 0,
            Self::Location { .. } => 1,
            Self::Configuration(_) => 2,
            Self::NameAndDescription { .. } => 3,
        }
    }
}

/// The CSV driver's option fields, defaulted to `defaults`
fn configuration_fields(defaults: &CsvConfiguration) -> Vec<ConnectionField> {
    let params = defaults
        .apply_to(ConnectionConfig::new("csv", ""))
        .params;
    CsvDriver::new()
        .connection_field_schema()
        .fields
        .into_iter()
        .filter(|field| field.id != "path")
        .map(|field| match params.get(&*field.id) {
            Some(value) => field.default_value(value.clone()),
            None => field,
        })
        .collect()
}

/// Parse configuration page form values on top of `base`.
///
/// Keys match the CSV driver parameters; missing keys keep the base value.
pub fn configuration_from_form(
    base: &CsvConfiguration,
    values: &HashMap<String, String>,
) -> Result<CsvConfiguration, WizardError> {
    let mut configuration = base.clone();

    if let Some(raw) = values.get("separator_char") {
        configuration.separator_char = form_char("Separator", raw)?
            .ok_or_else(|| WizardError::user_input("Please enter a separator character"))?;
    }
    if let Some(raw) = values.get("quote_char") {
        configuration.quote_char = form_char("Quote character", raw)?;
    }
    if let Some(raw) = values.get("escape_char") {
        configuration.escape_char = form_char("Escape character", raw)?;
    }
    if let Some(raw) = values.get("encoding").map(|e| e.trim()).filter(|e| !e.is_empty()) {
        configuration.encoding = raw.to_string();
    }
    if let Some(raw) = values.get("header_line_number") {
        configuration.column_name_line_number = raw.trim().parse().map_err(|_| {
            WizardError::user_input(format!(
                "Header line number must be zero or a positive number, got '{}'",
                raw.trim()
            ))
        })?;
    }
    if let Some(raw) = values.get("fail_on_inconsistencies") {
        configuration.fail_on_inconsistent_row_length = parse_flag(raw).ok_or_else(|| {
            WizardError::user_input(format!("Invalid yes/no value '{}'", raw.trim()))
        })?;
    }

    configuration
        .validate()
        .map_err(|e| WizardError::user_input(e.to_string()))?;
    Ok(configuration)
}

fn form_char(label: &str, raw: &str) -> Result<Option<char>, WizardError> {
    parse_char(raw).map_err(|_| {
        WizardError::user_input(format!(
            "{} must be a single character, \\t, \\n, \\r or NOT_A_CHAR, got '{}'",
            label, raw
        ))
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" => Some(true),
        "false" | "no" | "n" | "0" | "off" | "" => Some(false),
        _ => None,
    }
}
