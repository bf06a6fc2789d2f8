//! The `<csv-datastore>` configuration element

use dcprof_core::ConnectionConfig;
use dcprof_driver_csv::{CsvConfiguration, format_char, parse_char};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{XmlElement, XmlError};

pub const CSV_DATASTORE_ELEMENT: &str = "csv-datastore";

const FILENAME: &str = "filename";
const QUOTE_CHAR: &str = "quote-char";
const SEPARATOR_CHAR: &str = "separator-char";
const ESCAPE_CHAR: &str = "escape-char";
const ENCODING: &str = "encoding";
const FAIL_ON_INCONSISTENCIES: &str = "fail-on-inconsistencies";
const HEADER_LINE_NUMBER: &str = "header-line-number";

/// A registered CSV datastore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreDefinition {
    pub name: String,
    pub description: Option<String>,
    /// Path as entered by the user
    pub filename: String,
    pub configuration: CsvConfiguration,
}

impl DatastoreDefinition {
    /// Build the `<csv-datastore>` element.
    ///
    /// Child order is fixed: filename, quote-char, separator-char,
    /// escape-char, encoding, fail-on-inconsistencies, header-line-number.
    pub fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new(CSV_DATASTORE_ELEMENT).with_attribute("name", &self.name);
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            element.set_attribute("description", description);
        }

        let config = &self.configuration;
        element.push_text_child(FILENAME, &self.filename);
        element.push_text_child(QUOTE_CHAR, format_char(config.quote_char));
        element.push_text_child(SEPARATOR_CHAR, format_char(Some(config.separator_char)));
        element.push_text_child(ESCAPE_CHAR, format_char(config.escape_char));
        if !config.encoding.is_empty() {
            element.push_text_child(ENCODING, &config.encoding);
        }
        element.push_text_child(
            FAIL_ON_INCONSISTENCIES,
            config.fail_on_inconsistent_row_length.to_string(),
        );
        element.push_text_child(
            HEADER_LINE_NUMBER,
            config.column_name_line_number.to_string(),
        );
        element
    }

    /// Read a definition back from a `<csv-datastore>` element.
    /// Missing optional values fall back to the CSV defaults.
    pub fn from_element(element: &XmlElement) -> Result<Self, XmlError> {
        if element.name != CSV_DATASTORE_ELEMENT {
            return Err(XmlError::MissingElement(CSV_DATASTORE_ELEMENT.into()));
        }

        let name = element
            .attribute("name")
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| XmlError::MissingAttribute {
                element: CSV_DATASTORE_ELEMENT.into(),
                attribute: "name".into(),
            })?
            .to_string();
        let description = element
            .attribute("description")
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let filename = element
            .child_text(FILENAME)
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| XmlError::MissingElement(FILENAME.into()))?
            .to_string();

        let defaults = CsvConfiguration::default();
        let separator_char = match char_value(element, SEPARATOR_CHAR)? {
            Some(Some(c)) => c,
            Some(None) => {
                return Err(XmlError::InvalidValue {
                    element: SEPARATOR_CHAR.into(),
                    message: "a separator character is required".into(),
                });
            }
            None => defaults.separator_char,
        };

        let configuration = CsvConfiguration {
            separator_char,
            quote_char: char_value(element, QUOTE_CHAR)?.unwrap_or(defaults.quote_char),
            escape_char: char_value(element, ESCAPE_CHAR)?.unwrap_or(defaults.escape_char),
            encoding: element
                .child_text(ENCODING)
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .unwrap_or(defaults.encoding),
            column_name_line_number: parsed_value(element, HEADER_LINE_NUMBER)?
                .unwrap_or(defaults.column_name_line_number),
            fail_on_inconsistent_row_length: parsed_value(element, FAIL_ON_INCONSISTENCIES)?
                .unwrap_or(defaults.fail_on_inconsistent_row_length),
        };

        Ok(Self {
            name,
            description,
            filename,
            configuration,
        })
    }

    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        self.to_element().to_xml_string()
    }

    /// Driver parameters for opening this datastore with the CSV driver.
    /// Relative filenames are resolved against `base_dir`.
    pub fn to_connection_config(&self, base_dir: &Path) -> ConnectionConfig {
        let path = base_dir.join(&self.filename);
        let mut config = ConnectionConfig::new("csv", &self.name);
        config.description = self.description.clone();
        self.configuration
            .apply_to(config)
            .with_param("path", path.to_string_lossy().into_owned())
    }
}

/// `None` when the child is absent, `Some(None)` for NOT_A_CHAR
fn char_value(element: &XmlElement, name: &str) -> Result<Option<Option<char>>, XmlError> {
    element
        .child_text(name)
        .map(|raw| {
            parse_char(raw).map_err(|e| XmlError::InvalidValue {
                element: name.into(),
                message: e.to_string(),
            })
        })
        .transpose()
}

fn parsed_value<T>(element: &XmlElement, name: &str) -> Result<Option<T>, XmlError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    element
        .child_text(name)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| XmlError::InvalidValue {
                element: name.into(),
                message: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn orders() -> DatastoreDefinition {
        DatastoreDefinition {
            name: "orders".into(),
            description: Some("Nightly export".into()),
            filename: "data/orders.csv".into(),
            configuration: CsvConfiguration {
                separator_char: '\t',
                quote_char: Some('"'),
                escape_char: None,
                encoding: "UTF-8".into(),
                column_name_line_number: 1,
                fail_on_inconsistent_row_length: false,
            },
        }
    }

    #[test]
    fn element_children_in_order() {
        let element = orders().to_element();
        let names: Vec<&str> = element.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "filename",
                "quote-char",
                "separator-char",
                "escape-char",
                "encoding",
                "fail-on-inconsistencies",
                "header-line-number"
            ]
        );
        assert_eq!(element.attribute("name"), Some("orders"));
        assert_eq!(element.attribute("description"), Some("Nightly export"));
        assert_eq!(element.child_text("separator-char"), Some("\\t"));
        assert_eq!(element.child_text("escape-char"), Some("NOT_A_CHAR"));
        assert_eq!(element.child_text("fail-on-inconsistencies"), Some("false"));
    }

    #[test]
    fn empty_description_is_omitted() {
        let mut definition = orders();
        definition.description = Some(String::new());
        assert_eq!(definition.to_element().attribute("description"), None);

        definition.description = None;
        assert_eq!(definition.to_element().attribute("description"), None);
    }

    #[test]
    fn xml_round_trip_keeps_special_characters() {
        for (separator, quote, escape) in [
            ('\t', Some('"'), None),
            ('\n', Some('\''), Some('\\')),
            ('\r', None, Some('\t')),
            (';', Some('<'), Some('&')),
        ] {
            let mut definition = orders();
            definition.configuration.separator_char = separator;
            definition.configuration.quote_char = quote;
            definition.configuration.escape_char = escape;
            definition.configuration.column_name_line_number = 0;
            definition.configuration.fail_on_inconsistent_row_length = true;

            let xml = definition.to_xml_string().unwrap();
            let parsed =
                DatastoreDefinition::from_element(&XmlElement::parse(&xml).unwrap()).unwrap();
            assert_eq!(parsed, definition);
        }
    }

    #[test]
    fn missing_values_use_defaults() {
        let xml = "<csv-datastore name=\"x\"><filename>x.csv</filename></csv-datastore>";
        let parsed = DatastoreDefinition::from_element(&XmlElement::parse(xml).unwrap()).unwrap();
        assert_eq!(parsed.configuration, CsvConfiguration::default());
        assert_eq!(parsed.description, None);
    }

    #[test]
    fn invalid_elements_are_rejected() {
        let cases = [
            "<csv-datastore><filename>x.csv</filename></csv-datastore>",
            "<csv-datastore name=\"x\"></csv-datastore>",
            "<csv-datastore name=\"x\"><filename>x.csv</filename><separator-char>NOT_A_CHAR</separator-char></csv-datastore>",
            "<csv-datastore name=\"x\"><filename>x.csv</filename><quote-char>ab</quote-char></csv-datastore>",
            "<csv-datastore name=\"x\"><filename>x.csv</filename><header-line-number>one</header-line-number></csv-datastore>",
            "<excel-datastore name=\"x\"><filename>x.xlsx</filename></excel-datastore>",
        ];
        for xml in cases {
            let element = XmlElement::parse(xml).unwrap();
            assert!(DatastoreDefinition::from_element(&element).is_err(), "{}", xml);
        }
    }

    #[test]
    fn connection_config_carries_path_and_options() {
        let base = Path::new("/srv/repo");
        let config = orders().to_connection_config(base);
        assert_eq!(config.driver, "csv");
        assert_eq!(config.name, "orders");
        assert_eq!(
            config.get_string("path").map(std::path::PathBuf::from),
            Some(base.join("data/orders.csv"))
        );

        let mut absolute = orders();
        absolute.filename = "/data/orders.csv".into();
        assert_eq!(
            absolute.to_connection_config(base).get_string("path").as_deref(),
            Some("/data/orders.csv")
        );
        assert_eq!(config.get_string("separator_char").as_deref(), Some("\\t"));
    }
}
