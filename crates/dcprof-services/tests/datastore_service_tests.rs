//! Integration tests for DatastoreService
//!
//! Registers CSV datastores in a temporary catalog and previews them through
//! the real CSV driver.

mod common;

use std::sync::Arc;

use dcprof_core::Value;
use dcprof_driver_csv::CsvConfiguration;
use dcprof_drivers::DriverRegistry;
use dcprof_services::{DatastoreService, PreviewSourceDataAction, ServiceError};
use dcprof_wizard::{DatastoreCatalog, DatastoreDefinition};
use pretty_assertions::assert_eq;

use common::MockConnection;

fn service(repository: &std::path::Path) -> DatastoreService {
    DatastoreService::new(
        Arc::new(DriverRegistry::with_defaults()),
        DatastoreCatalog::new(repository.join("conf.xml")),
        repository,
    )
}

// ============ Catalog Tests ============

#[tokio::test]
async fn registered_datastore_opens_and_previews() {
    let repo = tempfile::tempdir().unwrap();
    std::fs::create_dir(repo.path().join("data")).unwrap();
    let mut content = String::from("id;city\n");
    for n in 1..=40 {
        content.push_str(&format!("{};city {}\n", n, n));
    }
    std::fs::write(repo.path().join("data/cities.csv"), content).unwrap();

    let service = service(repo.path());
    service
        .catalog()
        .append(&DatastoreDefinition {
            name: "cities".into(),
            description: None,
            filename: "data/cities.csv".into(),
            configuration: CsvConfiguration {
                separator_char: ';',
                ..CsvConfiguration::default()
            },
        })
        .unwrap();

    let listed = service.list_datastores().expect("should list datastores");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "cities");

    let connection = service.open("cities").await.expect("should open datastore");
    assert_eq!(connection.driver_name(), "csv");

    let table = service
        .default_table(connection.as_ref())
        .await
        .expect("should find the table");
    assert_eq!(table.name, "cities");
    assert_eq!(table.column_count(), 2);

    let mut window = PreviewSourceDataAction::from_table(connection, &table)
        .perform()
        .await
        .expect("should open preview");
    assert_eq!(window.total_rows(), Some(40));
    assert_eq!(window.rows().len(), 35);
    assert!(window.next_page().await.unwrap());
    assert_eq!(
        window.rows()[0].get_by_name("city"),
        Some(&Value::String("city 36".into()))
    );
}

#[tokio::test]
async fn unknown_datastore_is_not_found() {
    let repo = tempfile::tempdir().unwrap();
    let service = service(repo.path());

    assert!(service.list_datastores().unwrap().is_empty());
    let err = service.open("missing").await.err().expect("should fail");
    assert!(matches!(err, ServiceError::DatastoreNotFound(name) if name == "missing"));
}

#[tokio::test]
async fn registered_datastore_with_missing_file_fails_to_connect() {
    let repo = tempfile::tempdir().unwrap();
    let service = service(repo.path());
    service
        .catalog()
        .append(&DatastoreDefinition {
            name: "gone".into(),
            description: None,
            filename: "gone.csv".into(),
            configuration: CsvConfiguration::default(),
        })
        .unwrap();

    let err = service.open("gone").await.err().expect("should fail");
    assert!(matches!(err, ServiceError::ConnectionFailed(_)));
}

// ============ Ad-hoc file Tests ============

#[tokio::test]
async fn open_file_detects_configuration() {
    let repo = tempfile::tempdir().unwrap();
    let path = repo.path().join("people.tsv");
    std::fs::write(&path, "name\tage\nAnn\t31\nBob\t42\n").unwrap();

    let service = service(repo.path());
    let connection = service.open_file(&path).await.expect("should open file");
    let table = service.default_table(connection.as_ref()).await.unwrap();

    let window = PreviewSourceDataAction::from_table(connection, &table)
        .perform()
        .await
        .unwrap();
    assert_eq!(window.column_names(), vec!["name", "age"]);
    assert_eq!(
        window.rows()[1].get_by_name("age"),
        Some(&Value::String("42".into()))
    );
}

#[tokio::test]
async fn default_table_uses_schema_introspection() {
    let repo = tempfile::tempdir().unwrap();
    let service = service(repo.path());
    let conn = MockConnection::new("orders", &["id", "amount"]);

    let table = service.default_table(&conn).await.unwrap();
    assert_eq!(table.name, "orders");
    assert_eq!(table.column("amount").map(|c| c.ordinal), Some(1));
}
