//! CSV datastore wizard
//!
//! Walks a user through picking (or uploading) a delimited text file,
//! configuring how it is parsed and naming it. The finished session produces
//! a `<csv-datastore>` XML element that can be appended to a datastore
//! catalog file.

mod catalog;
mod context;
mod element;
mod error;
mod page;
mod session;
pub mod validation;
mod xml;

pub use catalog::DatastoreCatalog;
pub use context::DatastoreWizardContext;
pub use element::{CSV_DATASTORE_ELEMENT, DatastoreDefinition};
pub use error::{CatalogError, WizardError, XmlError};
pub use page::{FileSource, PageInput, WizardPage, configuration_from_form};
pub use session::{CsvDatastoreWizardSession, WizardProgress};
pub use xml::XmlElement;
