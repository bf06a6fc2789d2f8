//! Datastore catalog stored in `conf.xml`

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{CSV_DATASTORE_ELEMENT, CatalogError, DatastoreDefinition, XmlElement};

const ROOT_ELEMENT: &str = "configuration";
const CATALOG_ELEMENT: &str = "datastore-catalog";

/// The `<datastore-catalog>` section of a configuration file
#[derive(Debug, Clone)]
pub struct DatastoreCatalog {
    path: PathBuf,
}

impl DatastoreCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of every registered datastore, whatever its type
    pub fn names(&self) -> Result<Vec<String>, CatalogError> {
        let Some(document) = self.load()? else {
            return Ok(Vec::new());
        };
        Ok(catalog_section(&document)
            .map(|catalog| {
                catalog
                    .children
                    .iter()
                    .filter_map(|c| c.attribute("name"))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// All CSV datastores in file order
    pub fn list(&self) -> Result<Vec<DatastoreDefinition>, CatalogError> {
        let Some(document) = self.load()? else {
            return Ok(Vec::new());
        };
        let Some(catalog) = catalog_section(&document) else {
            return Ok(Vec::new());
        };
        catalog
            .children_named(CSV_DATASTORE_ELEMENT)
            .map(|element| {
                DatastoreDefinition::from_element(element).map_err(|source| CatalogError::Xml {
                    path: self.path.clone(),
                    source,
                })
            })
            .collect()
    }

    pub fn find(&self, name: &str) -> Result<Option<DatastoreDefinition>, CatalogError> {
        Ok(self.list()?.into_iter().find(|d| d.name == name))
    }

    /// Add a datastore, creating the file when missing
    #[tracing::instrument(skip(self, definition), fields(path = %self.path.display(), name = %definition.name))]
    pub fn append(&self, definition: &DatastoreDefinition) -> Result<(), CatalogError> {
        if self.names()?.iter().any(|n| *n == definition.name) {
            return Err(CatalogError::DuplicateName(definition.name.clone()));
        }

        let mut document = self
            .load()?
            .unwrap_or_else(|| XmlElement::new(ROOT_ELEMENT));
        if document.name != ROOT_ELEMENT {
            return Err(CatalogError::Xml {
                path: self.path.clone(),
                source: crate::XmlError::MissingElement(ROOT_ELEMENT.into()),
            });
        }

        let position = match document.children.iter().position(|c| c.name == CATALOG_ELEMENT) {
            Some(position) => position,
            None => {
                document.children.push(XmlElement::new(CATALOG_ELEMENT));
                document.children.len() - 1
            }
        };
        document.children[position]
            .children
            .push(definition.to_element());

        self.save(&document)?;
        tracing::info!("datastore added to catalog");
        Ok(())
    }

    fn load(&self) -> Result<Option<XmlElement>, CatalogError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };
        XmlElement::parse(&content)
            .map(Some)
            .map_err(|source| CatalogError::Xml {
                path: self.path.clone(),
                source,
            })
    }

    /// Write through a temporary file in the same directory, then rename
    fn save(&self, document: &XmlElement) -> Result<(), CatalogError> {
        let xml = document.to_xml_document().map_err(|source| CatalogError::Xml {
            path: self.path.clone(),
            source,
        })?;

        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(directory).map_err(|e| self.io_error(e))?;

        let mut temp = tempfile::NamedTempFile::new_in(directory).map_err(|e| self.io_error(e))?;
        temp.write_all(xml.as_bytes())
            .map_err(|e| self.io_error(e))?;
        temp.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> CatalogError {
        CatalogError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn catalog_section(document: &XmlElement) -> Option<&XmlElement> {
    if document.name == ROOT_ELEMENT {
        document.child(CATALOG_ELEMENT)
    } else {
        None
    }
}
