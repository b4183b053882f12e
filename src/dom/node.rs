//! XML Node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.

use crate::sax::split_qname;

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Type of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node
    Element,
    /// Attribute of an element
    Attribute,
    /// Text content
    Text,
    /// CDATA section
    CData,
    /// Comment
    Comment,
    /// Processing instruction
    ProcessingInstruction,
    /// Reference to a general entity, parent of its expansion
    EntityReference,
    /// Document type declaration
    DocumentType,
}

impl NodeKind {
    /// Text, CDATA and comments hold mutable character data
    #[inline]
    pub fn is_character_data(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::CData | NodeKind::Comment)
    }

    /// Kinds that can hold child nodes
    #[inline]
    pub fn can_have_children(self) -> bool {
        matches!(
            self,
            NodeKind::Document | NodeKind::Element | NodeKind::EntityReference
        )
    }

    /// DOM node name for kinds whose name is fixed
    pub fn fixed_name(self) -> Option<&'static str> {
        match self {
            NodeKind::Document => Some("#document"),
            NodeKind::Text => Some("#text"),
            NodeKind::CData => Some("#cdata-section"),
            NodeKind::Comment => Some("#comment"),
            _ => None,
        }
    }
}

/// Element or attribute name, split once at creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    raw: String,
    /// Byte offset of the prefix separator
    colon: Option<u32>,
    namespace: Option<String>,
    namespace_aware: bool,
}

impl QualifiedName {
    /// A name created without namespace processing
    pub fn plain(raw: &str) -> Self {
        QualifiedName {
            raw: raw.to_owned(),
            colon: None,
            namespace: None,
            namespace_aware: false,
        }
    }

    /// A namespace-aware name; `uri` is `None` for names in no namespace
    pub fn namespaced(uri: Option<&str>, raw: &str) -> Self {
        let colon = match split_qname(raw) {
            (Some(prefix), _) => Some(prefix.len() as u32),
            (None, _) => None,
        };
        QualifiedName {
            raw: raw.to_owned(),
            colon,
            namespace: uri.filter(|u| !u.is_empty()).map(str::to_owned),
            namespace_aware: true,
        }
    }

    #[inline]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn prefix(&self) -> Option<&str> {
        self.colon.map(|pos| &self.raw[..pos as usize])
    }

    /// Local part; `None` for names created without namespace processing
    pub fn local_name(&self) -> Option<&str> {
        if !self.namespace_aware {
            return None;
        }
        Some(match self.colon {
            Some(pos) => &self.raw[pos as usize + 1..],
            None => &self.raw,
        })
    }

    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Whether two attribute names address the same attribute slot.
    ///
    /// Matched on the qualified name, so `p:a` and `q:a` stay distinct
    /// even when both prefixes bind the same namespace.
    pub fn same_attribute(&self, other: &QualifiedName) -> bool {
        self.raw == other.raw
    }
}

/// Kind-specific payload of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element {
        name: QualifiedName,
        /// Attribute nodes in attachment order
        attributes: Vec<NodeId>,
    },
    Attribute {
        name: QualifiedName,
        value: String,
        owner: Option<NodeId>,
    },
    Text {
        data: String,
        /// Whitespace the scanner reported as ignorable
        ignorable: bool,
    },
    CData(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
    EntityReference {
        name: String,
    },
    DocumentType {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
    },
}

/// An XML node in the arena
#[derive(Debug, Clone)]
pub struct XmlNode {
    /// Parent node (None for the document and for attributes)
    pub parent: Option<NodeId>,
    /// First child node
    pub first_child: Option<NodeId>,
    /// Last child node
    pub last_child: Option<NodeId>,
    /// Previous sibling
    pub prev_sibling: Option<NodeId>,
    /// Next sibling
    pub next_sibling: Option<NodeId>,
    /// Payload
    pub data: NodeData,
}

impl XmlNode {
    /// Create a detached node
    pub fn new(data: NodeData) -> Self {
        XmlNode {
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            data,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Document => NodeKind::Document,
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Attribute { .. } => NodeKind::Attribute,
            NodeData::Text { .. } => NodeKind::Text,
            NodeData::CData(_) => NodeKind::CData,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::ProcessingInstruction { .. } => NodeKind::ProcessingInstruction,
            NodeData::EntityReference { .. } => NodeKind::EntityReference,
            NodeData::DocumentType { .. } => NodeKind::DocumentType,
        }
    }

    /// Check if this is an element node
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element { .. })
    }

    /// Check if this is a text node
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text { .. })
    }

    /// Check if this node has children
    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }

    /// Element or attribute name
    pub fn qualified_name(&self) -> Option<&QualifiedName> {
        match &self.data {
            NodeData::Element { name, .. } | NodeData::Attribute { name, .. } => Some(name),
            _ => None,
        }
    }

    /// DOM node name
    pub fn node_name(&self) -> &str {
        match &self.data {
            NodeData::Element { name, .. } | NodeData::Attribute { name, .. } => name.raw(),
            NodeData::ProcessingInstruction { target, .. } => target,
            NodeData::EntityReference { name } | NodeData::DocumentType { name, .. } => name,
            _ => self.kind().fixed_name().unwrap_or(""),
        }
    }

    /// DOM node value
    pub fn node_value(&self) -> Option<&str> {
        match &self.data {
            NodeData::Attribute { value, .. } => Some(value),
            NodeData::Text { data, .. } => Some(data),
            NodeData::CData(data) | NodeData::Comment(data) => Some(data),
            NodeData::ProcessingInstruction { data, .. } => Some(data),
            _ => None,
        }
    }

    /// True for text nodes flagged as ignorable whitespace
    pub fn is_ignorable_whitespace(&self) -> bool {
        matches!(self.data, NodeData::Text { ignorable: true, .. })
    }
}
