//! Integration tests for DatastoreCatalog

use dcprof_driver_csv::CsvConfiguration;
use dcprof_wizard::{CatalogError, DatastoreCatalog, DatastoreDefinition};
use pretty_assertions::assert_eq;

fn definition(name: &str, filename: &str) -> DatastoreDefinition {
    DatastoreDefinition {
        name: name.into(),
        description: None,
        filename: filename.into(),
        configuration: CsvConfiguration::default(),
    }
}

#[test]
fn missing_catalog_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = DatastoreCatalog::new(dir.path().join("conf.xml"));
    assert!(catalog.list().unwrap().is_empty());
    assert!(catalog.names().unwrap().is_empty());
    assert_eq!(catalog.find("orders").unwrap(), None);
}

#[test]
fn append_creates_file_and_keeps_order() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = DatastoreCatalog::new(dir.path().join("nested/conf.xml"));

    let mut orders = definition("orders", "orders.csv");
    orders.description = Some("Nightly <export>".into());
    orders.configuration.separator_char = '\t';
    orders.configuration.quote_char = None;

    catalog.append(&orders).unwrap();
    catalog.append(&definition("people", "people.tsv")).unwrap();

    let content = std::fs::read_to_string(catalog.path()).unwrap();
    assert!(content.starts_with("<?xml"));
    assert!(content.contains("<datastore-catalog>"));
    assert!(content.contains("<separator-char>\\t</separator-char>"));

    let listed = catalog.list().unwrap();
    assert_eq!(listed, vec![orders.clone(), definition("people", "people.tsv")]);
    assert_eq!(catalog.find("orders").unwrap(), Some(orders));
}

#[test]
fn duplicate_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = DatastoreCatalog::new(dir.path().join("conf.xml"));
    catalog.append(&definition("orders", "a.csv")).unwrap();

    let err = catalog.append(&definition("orders", "b.csv")).unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateName(name) if name == "orders"));
    assert_eq!(catalog.list().unwrap().len(), 1);
}

#[test]
fn other_datastore_types_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.xml");
    std::fs::write(
        &path,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<configuration>
  <datastore-catalog>
    <jdbc-datastore name="warehouse">
      <url>jdbc:h2:mem</url>
    </jdbc-datastore>
  </datastore-catalog>
  <reference-data-catalog/>
</configuration>
"#,
    )
    .unwrap();

    let catalog = DatastoreCatalog::new(&path);
    assert_eq!(catalog.names().unwrap(), vec!["warehouse"]);
    assert!(catalog.list().unwrap().is_empty());

    assert!(matches!(
        catalog.append(&definition("warehouse", "w.csv")),
        Err(CatalogError::DuplicateName(_))
    ));
    catalog.append(&definition("sales", "sales.csv")).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("<url>jdbc:h2:mem</url>"));
    assert!(content.contains("<reference-data-catalog/>"));
    assert_eq!(catalog.names().unwrap(), vec!["warehouse", "sales"]);
}

#[test]
fn malformed_catalog_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.xml");
    std::fs::write(&path, "<configuration><datastore-catalog>").unwrap();

    let catalog = DatastoreCatalog::new(&path);
    assert!(matches!(catalog.list(), Err(CatalogError::Xml { .. })));
    assert!(catalog.append(&definition("x", "x.csv")).is_err());
}
