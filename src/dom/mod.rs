//! DOM Module - Arena-based XML Document
//!
//! Implements an efficient DOM representation using:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - String interning for names in deferred documents

pub mod document;
pub mod node;
pub mod strings;

pub use document::{ChildIter, DescendantIter, Document};
pub use node::{NodeData, NodeId, NodeKind, QualifiedName, XmlNode};
pub use strings::StringPool;

/// Read access shared by eager and deferred documents
///
/// Lets callers walk either representation without knowing which strategy
/// built it. Node ids are only meaningful for the document that issued them.
pub trait DocumentAccess {
    /// Id of the document node
    fn document_node(&self) -> NodeId {
        0
    }

    /// Number of node slots, detached nodes and attributes included
    fn node_count(&self) -> usize;

    fn node_kind(&self, id: NodeId) -> Option<NodeKind>;

    fn parent_node(&self, id: NodeId) -> Option<NodeId>;

    /// Children in document order - returns collected Vec for trait object compatibility
    fn children_vec(&self, id: NodeId) -> Vec<NodeId>;

    /// DOM node name (`#text`, element raw name, PI target, ...)
    fn node_name(&self, id: NodeId) -> Option<&str>;

    /// DOM node value; `None` for elements, entity references and the like
    fn node_value(&self, id: NodeId) -> Option<&str>;

    fn namespace_uri(&self, id: NodeId) -> Option<&str>;

    fn local_name(&self, id: NodeId) -> Option<&str>;

    /// Get attribute value by raw name
    fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str>;

    /// Get all attribute names and values, in attachment order
    fn attribute_values(&self, id: NodeId) -> Vec<(&str, &str)>;

    fn is_ignorable_whitespace(&self, id: NodeId) -> bool;

    /// Public and system identifiers of a document type node
    fn document_type_ids(&self, id: NodeId) -> Option<(Option<&str>, Option<&str>)>;

    /// Get the document element
    fn document_element(&self) -> Option<NodeId> {
        self.children_vec(self.document_node())
            .into_iter()
            .find(|&id| self.node_kind(id) == Some(NodeKind::Element))
    }

    fn doctype(&self) -> Option<NodeId> {
        self.children_vec(self.document_node())
            .into_iter()
            .find(|&id| self.node_kind(id) == Some(NodeKind::DocumentType))
    }

    /// Descendants in document order - returns collected Vec for trait object compatibility
    fn descendants_vec(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children_vec(id).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children_vec(current).into_iter().rev());
        }
        out
    }

    /// Concatenated text and CDATA content below a node
    fn text_content(&self, id: NodeId) -> String {
        let is_text = |n: NodeId| {
            matches!(self.node_kind(n), Some(NodeKind::Text | NodeKind::CData))
        };
        if is_text(id) {
            return self.node_value(id).unwrap_or_default().to_owned();
        }
        let mut out = String::new();
        for n in self.descendants_vec(id) {
            if is_text(n) {
                out.push_str(self.node_value(n).unwrap_or_default());
            }
        }
        out
    }
}
