//! SAX Event Types
//!
//! Owned values for the events an upstream scanner delivers to a
//! [`DocumentHandler`](super::DocumentHandler). Names arrive already
//! resolved: the scanner owns namespace binding, so a [`QName`] carries its
//! URI alongside the raw name.

use memchr::memchr;

use super::DocumentHandler;
use crate::error::BuildError;

/// Split a raw `prefix:local` name at its first colon.
///
/// Names with a leading or trailing colon are treated as unprefixed.
#[inline]
pub fn split_qname(raw: &str) -> (Option<&str>, &str) {
    match memchr(b':', raw.as_bytes()) {
        Some(pos) if pos > 0 && pos + 1 < raw.len() => (Some(&raw[..pos]), &raw[pos + 1..]),
        _ => (None, raw),
    }
}

/// A qualified name as reported by the scanner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QName {
    /// Namespace prefix, if the raw name has one
    pub prefix: Option<String>,
    /// Local part of the name
    pub local_part: String,
    /// Name exactly as written in the markup
    pub raw_name: String,
    /// Namespace URI bound to the prefix (or the default namespace)
    pub uri: Option<String>,
}

impl QName {
    /// Create a name with no namespace binding
    pub fn new(raw: &str) -> Self {
        let (prefix, local) = split_qname(raw);
        QName {
            prefix: prefix.map(str::to_owned),
            local_part: local.to_owned(),
            raw_name: raw.to_owned(),
            uri: None,
        }
    }

    /// Create a name bound to a namespace URI
    pub fn with_uri(uri: &str, raw: &str) -> Self {
        let mut name = QName::new(raw);
        name.uri = Some(uri.to_owned());
        name
    }
}

impl From<&str> for QName {
    fn from(raw: &str) -> Self {
        QName::new(raw)
    }
}

/// Document position supplied with `start_document`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locator {
    pub line: u32,
    pub column: u32,
    pub system_id: Option<String>,
}

/// A single attribute of a start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
    /// False when the value was defaulted from the DTD
    pub specified: bool,
}

/// Attributes of a start tag, in the order the scanner reported them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    items: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Attributes { items: Vec::new() }
    }

    /// Append an attribute
    pub fn push(&mut self, name: QName, value: impl Into<String>) {
        self.items.push(Attribute {
            name,
            value: value.into(),
            specified: true,
        });
    }

    /// Builder-style append of an unbound attribute
    pub fn with(mut self, raw_name: &str, value: impl Into<String>) -> Self {
        self.push(QName::new(raw_name), value);
        self
    }

    /// Builder-style append of a namespace-bound attribute
    pub fn with_ns(mut self, uri: &str, raw_name: &str, value: impl Into<String>) -> Self {
        self.push(QName::with_uri(uri, raw_name), value);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.items.iter()
    }

    pub fn name(&self, index: usize) -> Option<&QName> {
        self.items.get(index).map(|a| &a.name)
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(|a| a.value.as_str())
    }

    /// Value of the first attribute with this raw name
    pub fn get(&self, raw_name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|a| a.name.raw_name == raw_name)
            .map(|a| a.value.as_str())
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// An owned document event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaxEvent {
    StartDocument {
        locator: Option<Locator>,
        encoding: Option<String>,
    },
    XmlDecl {
        version: String,
        encoding: Option<String>,
        standalone: Option<String>,
    },
    DoctypeDecl {
        root_element: String,
        public_id: Option<String>,
        system_id: Option<String>,
    },
    StartDtd,
    EndDtd,
    StartElement {
        name: QName,
        attributes: Attributes,
    },
    EmptyElement {
        name: QName,
        attributes: Attributes,
    },
    EndElement {
        name: QName,
    },
    Characters(String),
    IgnorableWhitespace(String),
    StartCData,
    EndCData,
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
    StartEntity {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
        base_system_id: Option<String>,
        encoding: Option<String>,
    },
    EndEntity {
        name: String,
    },
    StartPrefixMapping {
        prefix: String,
        uri: String,
    },
    EndPrefixMapping {
        prefix: String,
    },
    EndDocument,
}

impl SaxEvent {
    pub fn start_document() -> Self {
        SaxEvent::StartDocument {
            locator: None,
            encoding: None,
        }
    }

    pub fn start_element(raw_name: &str) -> Self {
        SaxEvent::StartElement {
            name: QName::new(raw_name),
            attributes: Attributes::new(),
        }
    }

    pub fn start_element_with(name: QName, attributes: Attributes) -> Self {
        SaxEvent::StartElement { name, attributes }
    }

    pub fn end_element(raw_name: &str) -> Self {
        SaxEvent::EndElement {
            name: QName::new(raw_name),
        }
    }

    pub fn characters(text: &str) -> Self {
        SaxEvent::Characters(text.to_owned())
    }

    pub fn ignorable_whitespace(text: &str) -> Self {
        SaxEvent::IgnorableWhitespace(text.to_owned())
    }

    pub fn comment(text: &str) -> Self {
        SaxEvent::Comment(text.to_owned())
    }

    pub fn processing_instruction(target: &str, data: &str) -> Self {
        SaxEvent::ProcessingInstruction {
            target: target.to_owned(),
            data: data.to_owned(),
        }
    }

    pub fn doctype(root_element: &str, public_id: Option<&str>, system_id: Option<&str>) -> Self {
        SaxEvent::DoctypeDecl {
            root_element: root_element.to_owned(),
            public_id: public_id.map(str::to_owned),
            system_id: system_id.map(str::to_owned),
        }
    }

    pub fn start_entity(name: &str) -> Self {
        SaxEvent::StartEntity {
            name: name.to_owned(),
            public_id: None,
            system_id: None,
            base_system_id: None,
            encoding: None,
        }
    }

    pub fn end_entity(name: &str) -> Self {
        SaxEvent::EndEntity {
            name: name.to_owned(),
        }
    }

    /// Short label used in logs and error messages
    pub fn label(&self) -> &'static str {
        match self {
            SaxEvent::StartDocument { .. } => "start_document",
            SaxEvent::XmlDecl { .. } => "xml_decl",
            SaxEvent::DoctypeDecl { .. } => "doctype_decl",
            SaxEvent::StartDtd => "start_dtd",
            SaxEvent::EndDtd => "end_dtd",
            SaxEvent::StartElement { .. } => "start_element",
            SaxEvent::EmptyElement { .. } => "empty_element",
            SaxEvent::EndElement { .. } => "end_element",
            SaxEvent::Characters(_) => "characters",
            SaxEvent::IgnorableWhitespace(_) => "ignorable_whitespace",
            SaxEvent::StartCData => "start_cdata",
            SaxEvent::EndCData => "end_cdata",
            SaxEvent::Comment(_) => "comment",
            SaxEvent::ProcessingInstruction { .. } => "processing_instruction",
            SaxEvent::StartEntity { .. } => "start_entity",
            SaxEvent::EndEntity { .. } => "end_entity",
            SaxEvent::StartPrefixMapping { .. } => "start_prefix_mapping",
            SaxEvent::EndPrefixMapping { .. } => "end_prefix_mapping",
            SaxEvent::EndDocument => "end_document",
        }
    }

    /// Deliver this event to a handler
    pub fn dispatch<H: DocumentHandler + ?Sized>(&self, handler: &mut H) -> Result<(), BuildError> {
        match self {
            SaxEvent::StartDocument { locator, encoding } => {
                handler.start_document(locator.as_ref(), encoding.as_deref())
            }
            SaxEvent::XmlDecl {
                version,
                encoding,
                standalone,
            } => handler.xml_decl(version, encoding.as_deref(), standalone.as_deref()),
            SaxEvent::DoctypeDecl {
                root_element,
                public_id,
                system_id,
            } => handler.doctype_decl(root_element, public_id.as_deref(), system_id.as_deref()),
            SaxEvent::StartDtd => handler.start_dtd(),
            SaxEvent::EndDtd => handler.end_dtd(),
            SaxEvent::StartElement { name, attributes } => handler.start_element(name, attributes),
            SaxEvent::EmptyElement { name, attributes } => handler.empty_element(name, attributes),
            SaxEvent::EndElement { name } => handler.end_element(name),
            SaxEvent::Characters(text) => handler.characters(text),
            SaxEvent::IgnorableWhitespace(text) => handler.ignorable_whitespace(text),
            SaxEvent::StartCData => handler.start_cdata(),
            SaxEvent::EndCData => handler.end_cdata(),
            SaxEvent::Comment(text) => handler.comment(text),
            SaxEvent::ProcessingInstruction { target, data } => {
                handler.processing_instruction(target, data)
            }
            SaxEvent::StartEntity {
                name,
                public_id,
                system_id,
                base_system_id,
                encoding,
            } => handler.start_entity(
                name,
                public_id.as_deref(),
                system_id.as_deref(),
                base_system_id.as_deref(),
                encoding.as_deref(),
            ),
            SaxEvent::EndEntity { name } => handler.end_entity(name),
            SaxEvent::StartPrefixMapping { prefix, uri } => handler.start_prefix_mapping(prefix, uri),
            SaxEvent::EndPrefixMapping { prefix } => handler.end_prefix_mapping(prefix),
            SaxEvent::EndDocument => handler.end_document(),
        }
    }
}
