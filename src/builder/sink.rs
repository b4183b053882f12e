//! Tree sink abstraction
//!
//! The operations the builder needs from a node representation. Handles
//! are opaque; only the sink that issued a [`NodeRef`] can interpret it.

use crate::error::BuildError;
use crate::sax::{Attributes, QName};

/// Opaque handle to a node inside the active sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(pub(crate) u32);

pub trait TreeSink {
    /// The document root, created with the sink
    fn document_node(&self) -> NodeRef;

    /// `None` when this kind of document does not carry doctype nodes
    fn create_document_type(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Option<NodeRef>;

    /// Create an element with its attributes attached in event order
    fn create_element(&mut self, name: &QName, attributes: &Attributes) -> Result<NodeRef, BuildError>;

    fn create_text(&mut self, data: &str, ignorable: bool) -> NodeRef;

    fn create_cdata_section(&mut self, data: &str) -> NodeRef;

    fn create_comment(&mut self, data: &str) -> NodeRef;

    fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeRef;

    fn create_entity_reference(&mut self, name: &str) -> NodeRef;

    fn append_child(&mut self, parent: NodeRef, child: NodeRef) -> Result<(), BuildError>;

    fn parent_of(&self, node: NodeRef) -> Option<NodeRef>;

    fn last_child(&self, node: NodeRef) -> Option<NodeRef>;

    /// True for plain text nodes; CDATA sections do not count
    fn is_text(&self, node: NodeRef) -> bool;

    fn append_text_data(&mut self, node: NodeRef, text: &str) -> Result<(), BuildError>;

    /// Called once at end of document
    fn finish(&mut self);
}
