//! Minimal XML element tree on top of quick-xml

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::XmlError;

/// An element with attributes, child elements and text content.
///
/// Text is only kept for leaf elements; whitespace between child elements
/// is dropped when reading.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: Option<String>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Append a `<name>text</name>` child
    pub fn push_text_child(&mut self, name: impl Into<String>, text: impl Into<String>) {
        let mut child = XmlElement::new(name);
        child.text = Some(text.into());
        self.children.push(child);
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_deref().unwrap_or_default())
    }

    /// Serialize the element, indented by two spaces
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_to(&mut writer)?;
        into_string(writer)
    }

    /// Serialize as a standalone document with an XML declaration
    pub fn to_xml_document(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(|e| XmlError::Write(e.to_string()))?;
        self.write_to(&mut writer)?;
        let mut output = into_string(writer)?;
        output.push('\n');
        Ok(output)
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        let text = self.text.as_deref().filter(|t| !t.is_empty());
        if self.children.is_empty() && text.is_none() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(|e| XmlError::Write(e.to_string()));
        }

        writer
            .write_event(Event::Start(start))
            .map_err(|e| XmlError::Write(e.to_string()))?;
        if self.children.is_empty() {
            if let Some(text) = text {
                writer
                    .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))
                    .map_err(|e| XmlError::Write(e.to_string()))?;
            }
        } else {
            for child in &self.children {
                child.write_to(writer)?;
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(|e| XmlError::Write(e.to_string()))
    }

    /// Parse the root element of a document
    pub fn parse(content: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| XmlError::Malformed(e.to_string()))?;
            match event {
                Event::Start(e) => {
                    stack.push(element_from_start(&e)?);
                }
                Event::Empty(e) => {
                    let element = element_from_start(&e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| XmlError::Malformed("unexpected closing tag".into()))?;
                    if !element.children.is_empty() {
                        element.text = None;
                    }
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    let text = e
                        .unescape()
                        .map_err(|err| XmlError::Malformed(err.to_string()))?;
                    append_text(&mut stack, &text)?;
                }
                Event::CData(e) => {
                    let text = String::from_utf8(e.into_inner().into_owned())
                        .map_err(|err| XmlError::Malformed(err.to_string()))?;
                    append_text(&mut stack, &text)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(XmlError::Malformed("unclosed element".into()));
        }
        root.ok_or_else(|| XmlError::Malformed("document has no root element".into()))
    }
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String, XmlError> {
    String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, XmlError> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| XmlError::Malformed(e.to_string()))?
        .to_string();
    let mut element = XmlElement::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Malformed(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| XmlError::Malformed(e.to_string()))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::Malformed(e.to_string()))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::Malformed("multiple root elements".into())),
    }
}

fn append_text(stack: &mut [XmlElement], text: &str) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(current) => {
            current.text.get_or_insert_with(String::new).push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlError::Malformed("text outside of root element".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn writes_nested_elements() {
        let mut root = XmlElement::new("configuration").with_attribute("version", "1");
        let mut child = XmlElement::new("item");
        child.push_text_child("value", "a < b & \"c\"");
        root.children.push(child);
        root.children.push(XmlElement::new("empty"));

        let xml = root.to_xml_string().unwrap();
        assert!(xml.starts_with("<configuration version=\"1\">"));
        assert!(xml.contains("<value>a &lt; b &amp; \"c\"</value>"));
        assert!(xml.contains("<empty/>"));
        assert!(xml.ends_with("</configuration>"));
    }

    #[test]
    fn parse_keeps_leaf_whitespace() {
        let xml = "<?xml version=\"1.0\"?>\n<a x=\"1 &amp; 2\">\n  <b> </b>\n  <c>t&lt;x</c>\n  <d/>\n</a>\n";
        let root = XmlElement::parse(xml).unwrap();

        assert_eq!(root.name, "a");
        assert_eq!(root.attribute("x"), Some("1 & 2"));
        assert_eq!(root.text, None);
        assert_eq!(root.child_text("b"), Some(" "));
        assert_eq!(root.child_text("c"), Some("t<x"));
        assert_eq!(root.child_text("d"), Some(""));
        assert_eq!(root.child_text("missing"), None);
    }

    #[test]
    fn parse_then_write_is_stable() {
        let mut root = XmlElement::new("r");
        root.push_text_child("tab", "\\t");
        let xml = root.to_xml_document().unwrap();
        let parsed = XmlElement::parse(&xml).unwrap();
        assert_eq!(parsed, root);
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(XmlElement::parse("").is_err());
        assert!(XmlElement::parse("<a><b></a>").is_err());
        assert!(XmlElement::parse("<a/><b/>").is_err());
    }
}
