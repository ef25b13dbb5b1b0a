//! Owned, immutable XML element tree
//!
//! The engine never tokenizes XML itself during parsing: it works on this
//! already-parsed tree. [`Element::parse`] builds one from text with
//! `roxmltree`, and the builder methods construct one programmatically.
//! [`Element::to_xml`] writes an element back out (used to hand GML geometry
//! fragments to the backend verbatim).

use crate::error::{Error, Result};
use crate::parser::MAX_NESTING_DEPTH;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use roxmltree::Document;
use std::fmt;
use std::io::Cursor;

/// Namespace-qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: Option<&str>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local: local.into(),
        }
    }

    pub fn ns(namespace: &str, local: impl Into<String>) -> Self {
        Self::new(Some(namespace), local)
    }

    pub fn local(local: impl Into<String>) -> Self {
        Self::new(None, local)
    }
}

/// Clark notation: `{namespace}local`
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: QName,
    attributes: Vec<Attribute>,
    text: Option<String>,
    children: Vec<Element>,
    /// In-scope prefix → namespace declarations (`None` is the default namespace)
    namespaces: Vec<(Option<String>, String)>,
}

impl Element {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    /// Parse XML text and return its root element.
    ///
    /// Documents nested deeper than [`MAX_DOCUMENT_DEPTH`] are rejected before
    /// the tree is built.
    pub fn parse(xml: &str) -> Result<Self> {
        check_depth(xml)?;
        let doc = Document::parse(xml)?;
        Ok(Self::from_node(doc.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let tag = node.tag_name();
        let attributes = node
            .attributes()
            .map(|a| Attribute {
                name: QName::new(a.namespace(), a.name()),
                value: a.value().to_string(),
            })
            .collect();

        let text: String = node
            .children()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();
        let text = text.trim();

        let namespaces = node
            .namespaces()
            .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
            .collect();

        Self {
            name: QName::new(tag.namespace(), tag.name()),
            attributes,
            text: (!text.is_empty()).then(|| text.to_string()),
            children: node
                .children()
                .filter(|n| n.is_element())
                .map(Self::from_node)
                .collect(),
            namespaces,
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            name: QName::local(name),
            value: value.into(),
        });
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_namespace(mut self, prefix: Option<&str>, uri: &str) -> Self {
        self.namespaces
            .push((prefix.map(str::to_string), uri.to_string()));
        self
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    pub fn namespace(&self) -> Option<&str> {
        self.name.namespace.as_deref()
    }

    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace() == Some(namespace) && self.local_name() == local
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Trimmed text content, `None` when empty.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Unqualified attribute lookup.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace.is_none() && a.name.local == name)
            .map(|a| a.value.as_str())
    }

    pub fn attribute_ns(&self, namespace: &str, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace.as_deref() == Some(namespace) && a.name.local == name)
            .map(|a| a.value.as_str())
    }

    /// Unqualified attribute lookup that fails when the attribute is absent.
    pub fn require_attribute(&self, name: &str) -> Result<&str> {
        self.attribute(name).ok_or_else(|| Error::MissingAttribute {
            element: self.name.local.clone(),
            attribute: name.to_string(),
        })
    }

    /// Resolve a prefix (`None` for the default namespace) to its URI.
    pub fn resolve_prefix(&self, prefix: Option<&str>) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|(p, _)| p.as_deref() == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    fn prefix_for(&self, namespace: &str) -> Option<Option<&str>> {
        self.namespaces
            .iter()
            .find(|(_, uri)| uri == namespace)
            .map(|(p, _)| p.as_deref())
    }

    fn qualified(&self, name: &QName) -> String {
        match name.namespace.as_deref().and_then(|ns| self.prefix_for(ns)) {
            Some(Some(prefix)) => format!("{}:{}", prefix, name.local),
            _ => name.local.clone(),
        }
    }

    /// Serialize the element (and its subtree) back to XML text.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        self.write(&mut writer, true)?;
        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| Error::Xml(e.to_string()))
    }

    fn write(&self, writer: &mut Writer<Cursor<Vec<u8>>>, is_root: bool) -> Result<()> {
        let tag = self.qualified(&self.name);
        let mut start = BytesStart::new(tag.as_str());

        if is_root {
            for (prefix, uri) in &self.namespaces {
                if prefix.as_deref() == Some("xml") {
                    continue;
                }
                let decl = match prefix {
                    Some(p) => format!("xmlns:{}", p),
                    None => "xmlns".to_string(),
                };
                start.push_attribute((decl.as_str(), uri.as_str()));
            }
            if let Some(ns) = self.namespace() {
                if self.prefix_for(ns).is_none() {
                    start.push_attribute(("xmlns", ns));
                }
            }
        }

        for attr in &self.attributes {
            let name = self.qualified(&attr.name);
            start.push_attribute((name.as_str(), attr.value.as_str()));
        }

        if self.children.is_empty() && self.text.is_none() {
            writer.write_event(Event::Empty(start)).map_err(write_err)?;
            return Ok(());
        }

        writer.write_event(Event::Start(start)).map_err(write_err)?;
        if let Some(text) = &self.text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_err)?;
        }
        for child in &self.children {
            child.write(writer, false)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(tag.as_str())))
            .map_err(write_err)?;
        Ok(())
    }
}

/// Element nesting allowed in a document; GML geometries sit below the
/// filter operators, so this is larger than the operator nesting limit.
pub const MAX_DOCUMENT_DEPTH: usize = MAX_NESTING_DEPTH * 4;

/// Streaming depth check. Syntax errors are left for roxmltree to report.
fn check_depth(xml: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                depth += 1;
                if depth > MAX_DOCUMENT_DEPTH {
                    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                    return Err(Error::malformed(
                        name,
                        format!("document nesting exceeds {} levels", MAX_DOCUMENT_DEPTH),
                    ));
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) | Err(_) => return Ok(()),
            Ok(_) => {}
        }
    }
}

fn write_err(err: impl fmt::Display) -> Error {
    Error::Xml(err.to_string())
}
