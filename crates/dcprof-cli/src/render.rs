//! Terminal rendering with comfy-table

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use dcprof_core::{Row, Value};
use dcprof_driver_csv::format_char;
use dcprof_services::DataSetWindow;
use dcprof_wizard::DatastoreDefinition;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => "<null>".to_string(),
        other => other.to_string(),
    }
}

/// Grid of rows, numbered from `first_row_number`
pub fn grid(columns: &[String], rows: &[Row], first_row_number: usize) -> Table {
    let mut table = new_table();
    table.set_header(std::iter::once("#".to_string()).chain(columns.iter().cloned()));
    for (i, row) in rows.iter().enumerate() {
        table.add_row(
            std::iter::once((first_row_number + i).to_string())
                .chain(row.values.iter().map(cell)),
        );
    }
    table
}

/// "Page 2 of 3 (80 rows)"
pub fn page_footer(current_page: usize, page_count: Option<usize>, total_rows: Option<u64>) -> String {
    match (page_count, total_rows) {
        (Some(pages), Some(total)) => {
            format!("Page {} of {} ({} rows)", current_page + 1, pages, total)
        }
        _ => format!("Page {}", current_page + 1),
    }
}

pub fn print_window(window: &DataSetWindow) {
    println!("{}", window.title());
    println!(
        "{}",
        grid(&window.column_names(), window.rows(), window.first_row_number())
    );
    println!(
        "{}",
        page_footer(window.current_page(), window.page_count(), window.total_rows())
    );
    for warning in &window.result().warnings {
        eprintln!("warning: {}", warning);
    }
}

pub fn datastores(definitions: &[DatastoreDefinition]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Name",
        "File",
        "Separator",
        "Quote",
        "Escape",
        "Encoding",
        "Header line",
        "Description",
    ]);
    for definition in definitions {
        let configuration = &definition.configuration;
        table.add_row(vec![
            definition.name.clone(),
            definition.filename.clone(),
            format_char(Some(configuration.separator_char)),
            format_char(configuration.quote_char),
            format_char(configuration.escape_char),
            configuration.encoding.clone(),
            configuration.column_name_line_number.to_string(),
            definition.description.clone().unwrap_or_default(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcprof_driver_csv::CsvConfiguration;
    use pretty_assertions::assert_eq;

    #[test]
    fn grid_numbers_rows_from_offset() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let rows = vec![
            Row::new(columns.clone(), vec![Value::from("36"), Value::from("Ann")]),
            Row::new(columns.clone(), vec![Value::from("37"), Value::Null]),
        ];
        let rendered = grid(&columns, &rows, 36).to_string();
        assert!(rendered.contains("name"));
        assert!(rendered.contains("Ann"));
        assert!(rendered.contains("<null>"));
        assert!(rendered.contains("37"));
    }

    #[test]
    fn footer_with_and_without_total() {
        assert_eq!(page_footer(1, Some(3), Some(80)), "Page 2 of 3 (80 rows)");
        assert_eq!(page_footer(0, None, None), "Page 1");
    }

    #[test]
    fn datastore_table_shows_escaped_characters() {
        let definitions = vec![DatastoreDefinition {
            name: "people".into(),
            description: Some("Staff list".into()),
            filename: "people.tsv".into(),
            configuration: CsvConfiguration {
                quote_char: None,
                ..CsvConfiguration::tab_separated()
            },
        }];
        let rendered = datastores(&definitions).to_string();
        assert!(rendered.contains("people.tsv"));
        assert!(rendered.contains("\\t"));
        assert!(rendered.contains("NOT_A_CHAR"));
        assert!(rendered.contains("Staff list"));
    }
}
