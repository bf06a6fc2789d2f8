//! `dcprof wizard`: register a CSV datastore

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use dcprof_core::{ConnectionField, ConnectionFieldType};
use dcprof_wizard::{
    CsvDatastoreWizardSession, DatastoreCatalog, DatastoreWizardContext, FileSource, PageInput,
    WizardError, WizardPage, configuration_from_form,
};
use dialoguer::{Confirm, Input, Select};

#[derive(Args, Debug, Default)]
pub struct WizardArgs {
    /// Upload this local file into the repository
    #[arg(long, value_name = "FILE", conflicts_with = "existing")]
    pub upload: Option<PathBuf>,

    /// Reference a .csv or .tsv file already in the repository
    #[arg(long)]
    pub existing: bool,

    /// Location of the datastore file, relative to the repository
    #[arg(long, value_name = "PATH")]
    pub location: Option<String>,

    /// Separator character (\t for tab)
    #[arg(long)]
    pub separator: Option<String>,

    /// Quote character, or NOT_A_CHAR to disable quoting
    #[arg(long)]
    pub quote: Option<String>,

    /// Escape character, or NOT_A_CHAR to disable escaping
    #[arg(long)]
    pub escape: Option<String>,

    /// Character encoding of the file
    #[arg(long)]
    pub encoding: Option<String>,

    /// Line holding the column names, 0 when there is none
    #[arg(long, value_name = "LINE")]
    pub header_line: Option<usize>,

    /// Fail when a row has more or fewer values than the header
    #[arg(long)]
    pub fail_on_inconsistencies: bool,

    /// Datastore name (defaults to the file name)
    #[arg(long)]
    pub name: Option<String>,

    /// Datastore description
    #[arg(long)]
    pub description: Option<String>,

    /// Accept defaults for everything not given on the command line
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Add the datastore to the catalog without asking
    #[arg(long)]
    pub register: bool,
}

impl WizardArgs {
    fn interactive(&self) -> bool {
        !self.yes
    }

    /// Whether any input of `page` is given on the command line
    fn sets_values_for(&self, page: &WizardPage) -> bool {
        match page {
            WizardPage::UploadOrExistingFile => self.upload.is_some() || self.existing,
            WizardPage::Location { .. } => self.location.is_some(),
            WizardPage::CsvConfiguration { .. } => !self.configuration_overrides().is_empty(),
            WizardPage::NameAndDescription { .. } => {
                self.name.is_some() || self.description.is_some()
            }
        }
    }

    /// Configuration page values given as flags, keyed like the form fields
    fn configuration_overrides(&self) -> HashMap<String, String> {
        let mut values = HashMap::new();
        let mut set = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                values.insert(key.to_string(), value);
            }
        };
        set("separator_char", self.separator.clone());
        set("quote_char", self.quote.clone());
        set("escape_char", self.escape.clone());
        set("encoding", self.encoding.clone());
        set("header_line_number", self.header_line.map(|n| n.to_string()));
        if self.fail_on_inconsistencies {
            set("fail_on_inconsistencies", Some("true".to_string()));
        }
        values
    }
}

pub fn run(args: &WizardArgs, repository_dir: &Path, catalog: &DatastoreCatalog) -> Result<()> {
    let context = DatastoreWizardContext::new(repository_dir)
        .with_existing_names(catalog.names().context("Failed to read the datastore catalog")?);
    let mut session = CsvDatastoreWizardSession::new(context);

    while let Some(page) = session.current_page().cloned() {
        println!(
            "\n[{}/{}] {}",
            page.index() + 1,
            session.page_count(),
            page.title()
        );

        let submitted = page_input(args, &page).and_then(|input| session.submit(input));
        match submitted {
            Ok(_) => {}
            // Rejected flag values end the run; prompted pages are asked again
            Err(WizardError::UserInput(message))
                if args.interactive() && !args.sets_values_for(&page) =>
            {
                eprintln!("{}", message);
            }
            Err(e) => return Err(e.into()),
        }
    }

    let definition = session.datastore_definition()?;
    println!("\n{}", definition.to_xml_string()?);

    let register = args.register
        || (args.interactive()
            && Confirm::new()
                .with_prompt(format!("Register datastore '{}'?", definition.name))
                .default(true)
                .interact()?);
    if register {
        catalog
            .append(&definition)
            .with_context(|| format!("Failed to register datastore '{}'", definition.name))?;
        println!(
            "Registered '{}' in {}",
            definition.name,
            catalog.path().display()
        );
    }
    Ok(())
}

/// Collect the input for `page` from flags, prompting for the rest
fn page_input(args: &WizardArgs, page: &WizardPage) -> Result<PageInput, WizardError> {
    let input = match page {
        WizardPage::UploadOrExistingFile => PageInput::FileSource(file_source(args)?),
        WizardPage::Location { .. } => {
            let default = page.default_location().unwrap_or_default().to_string();
            let filepath = match &args.location {
                Some(location) => location.clone(),
                None => ask_text(args, "Location", default)?,
            };
            PageInput::Location { filepath }
        }
        WizardPage::CsvConfiguration { defaults, .. } => {
            let mut values = args.configuration_overrides();
            if args.interactive() {
                for field in page.fields().fields {
                    if !values.contains_key(&*field.id) {
                        let value = ask_field(&field)?;
                        values.insert(field.id.to_string(), value);
                    }
                }
            }
            PageInput::Configuration(configuration_from_form(defaults, &values)?)
        }
        WizardPage::NameAndDescription { filename } => {
            let name = match &args.name {
                Some(name) => name.clone(),
                None => ask_text(args, "Datastore name", filename.clone())?,
            };
            let description = match &args.description {
                Some(description) => Some(description.clone()),
                None if args.interactive() => Some(
                    Input::<String>::new()
                        .with_prompt("Description")
                        .allow_empty(true)
                        .interact_text()
                        .map_err(prompt_error)?,
                ),
                None => None,
            };
            PageInput::NameAndDescription { name, description }
        }
    };
    Ok(input)
}

fn file_source(args: &WizardArgs) -> Result<FileSource, WizardError> {
    if let Some(path) = &args.upload {
        return upload_source(path);
    }
    if args.existing || !args.interactive() {
        return Ok(FileSource::Existing);
    }

    let choice = Select::new()
        .with_prompt("Source")
        .items(&["Upload a file", "Use a file on the server"])
        .default(0)
        .interact()
        .map_err(prompt_error)?;
    if choice == 1 {
        return Ok(FileSource::Existing);
    }
    let path: String = Input::new()
        .with_prompt("File to upload")
        .interact_text()
        .map_err(prompt_error)?;
    upload_source(Path::new(path.trim()))
}

/// A local file stands in for the uploaded temporary file
fn upload_source(path: &Path) -> Result<FileSource, WizardError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            WizardError::user_input(format!("Not a file to upload: {}", path.display()))
        })?;
    Ok(FileSource::Upload {
        filename,
        temp_file: path.to_path_buf(),
    })
}

fn ask_text(args: &WizardArgs, prompt: &str, default: String) -> Result<String, WizardError> {
    if !args.interactive() {
        return Ok(default);
    }
    Input::new()
        .with_prompt(prompt)
        .default(default)
        .interact_text()
        .map_err(prompt_error)
}

fn ask_field(field: &ConnectionField) -> Result<String, WizardError> {
    let default = field.default_value.as_deref().unwrap_or_default();
    match &field.field_type {
        ConnectionFieldType::Boolean => Confirm::new()
            .with_prompt(&*field.label)
            .default(default == "true")
            .interact()
            .map(|b| b.to_string())
            .map_err(prompt_error),
        ConnectionFieldType::Select { options } => {
            let labels: Vec<&str> = options.iter().map(|o| &*o.label).collect();
            let selected = options
                .iter()
                .position(|o| o.value.eq_ignore_ascii_case(default))
                .unwrap_or(0);
            Select::new()
                .with_prompt(&*field.label)
                .items(labels.as_slice())
                .default(selected)
                .interact()
                .map(|i| options[i].value.to_string())
                .map_err(prompt_error)
        }
        _ => Input::new()
            .with_prompt(&*field.label)
            .default(default.to_string())
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error),
    }
}

fn prompt_error(e: dialoguer::Error) -> WizardError {
    WizardError::Io(std::io::Error::other(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn non_interactive() -> WizardArgs {
        WizardArgs {
            yes: true,
            ..WizardArgs::default()
        }
    }

    #[test]
    fn flags_become_form_values() {
        let args = WizardArgs {
            separator: Some("\\t".into()),
            quote: Some("NOT_A_CHAR".into()),
            header_line: Some(0),
            fail_on_inconsistencies: true,
            ..non_interactive()
        };
        let values = args.configuration_overrides();
        assert_eq!(values.get("separator_char").map(String::as_str), Some("\\t"));
        assert_eq!(values.get("quote_char").map(String::as_str), Some("NOT_A_CHAR"));
        assert_eq!(values.get("header_line_number").map(String::as_str), Some("0"));
        assert_eq!(
            values.get("fail_on_inconsistencies").map(String::as_str),
            Some("true")
        );
        assert!(!values.contains_key("encoding"));
    }

    #[test]
    fn non_interactive_run_registers_datastore() {
        let repo = tempfile::tempdir().unwrap();
        let source = tempfile::tempdir().unwrap();
        let upload = source.path().join("sales.csv");
        std::fs::write(&upload, "region;total\nnorth;10\n").unwrap();

        let catalog = DatastoreCatalog::new(repo.path().join("conf.xml"));
        let args = WizardArgs {
            upload: Some(upload),
            location: Some("incoming/sales.csv".into()),
            register: true,
            ..non_interactive()
        };
        run(&args, repo.path(), &catalog).expect("wizard should finish");

        assert!(repo.path().join("incoming/sales.csv").is_file());
        let definition = catalog.find("sales.csv").unwrap().expect("registered");
        assert_eq!(definition.filename, "incoming/sales.csv");
        assert_eq!(definition.configuration.separator_char, ';');
    }

    #[test]
    fn interactive_run_stops_on_rejected_flag() {
        let repo = tempfile::tempdir().unwrap();
        let catalog = DatastoreCatalog::new(repo.path().join("conf.xml"));
        let args = WizardArgs {
            existing: true,
            location: Some("notes.txt".into()),
            ..WizardArgs::default()
        };
        assert!(args.interactive());

        let err = run(&args, repo.path(), &catalog).unwrap_err();
        assert!(
            err.to_string().contains("only existing .csv and .tsv files"),
            "{}",
            err
        );
        assert!(!catalog.path().exists());
    }

    #[test]
    fn flags_are_matched_to_their_page() {
        let args = WizardArgs {
            location: Some("a.csv".into()),
            separator: Some(";".into()),
            ..WizardArgs::default()
        };
        assert!(!args.sets_values_for(&WizardPage::UploadOrExistingFile));
        assert!(!args.sets_values_for(&WizardPage::NameAndDescription {
            filename: "a.csv".into()
        }));
        assert!(WizardArgs::default().configuration_overrides().is_empty());
        assert!(!args.configuration_overrides().is_empty());
    }

    #[test]
    fn non_interactive_run_stops_on_invalid_input() {
        let repo = tempfile::tempdir().unwrap();
        let catalog = DatastoreCatalog::new(repo.path().join("conf.xml"));
        let args = WizardArgs {
            existing: true,
            location: Some("notes.txt".into()),
            ..non_interactive()
        };
        assert!(run(&args, repo.path(), &catalog).is_err());
        assert!(!catalog.path().exists());
    }
}
