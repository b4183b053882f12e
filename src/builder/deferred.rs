//! Deferred strategy: events are appended to a [`DeferredDocument`] pool.

use super::sink::{NodeRef, TreeSink};
use crate::deferred::slot::{link, NO_NODE};
use crate::deferred::DeferredDocument;
use crate::dom::NodeKind;
use crate::error::BuildError;
use crate::sax::{Attributes, QName};

/// A document under construction by the deferred strategy
#[derive(Debug)]
pub struct DeferredTree {
    pub(crate) document: DeferredDocument,
}

impl DeferredTree {
    pub fn new(namespace_aware: bool) -> Self {
        DeferredTree {
            document: DeferredDocument::new(namespace_aware),
        }
    }

    pub fn document(&self) -> &DeferredDocument {
        &self.document
    }

    pub fn into_document(self) -> DeferredDocument {
        self.document
    }
}

impl TreeSink for DeferredTree {
    fn document_node(&self) -> NodeRef {
        NodeRef(0)
    }

    fn create_document_type(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Option<NodeRef> {
        Some(NodeRef(
            self.document.create_document_type(name, public_id, system_id),
        ))
    }

    fn create_element(&mut self, name: &QName, attributes: &Attributes) -> Result<NodeRef, BuildError> {
        Ok(NodeRef(self.document.create_element(name, attributes)))
    }

    fn create_text(&mut self, data: &str, ignorable: bool) -> NodeRef {
        NodeRef(self.document.create_text(data, ignorable))
    }

    fn create_cdata_section(&mut self, data: &str) -> NodeRef {
        NodeRef(self.document.create_cdata_section(data))
    }

    fn create_comment(&mut self, data: &str) -> NodeRef {
        NodeRef(self.document.create_comment(data))
    }

    fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeRef {
        NodeRef(self.document.create_processing_instruction(target, data))
    }

    fn create_entity_reference(&mut self, name: &str) -> NodeRef {
        NodeRef(self.document.create_entity_reference(name))
    }

    fn append_child(&mut self, parent: NodeRef, child: NodeRef) -> Result<(), BuildError> {
        self.document.append_child(parent.0, child.0)?;
        Ok(())
    }

    fn parent_of(&self, node: NodeRef) -> Option<NodeRef> {
        link(self.document.slot(node.0)?.parent).map(NodeRef)
    }

    fn last_child(&self, node: NodeRef) -> Option<NodeRef> {
        let last = self.document.slot(node.0).map_or(NO_NODE, |s| s.last_child);
        link(last).map(NodeRef)
    }

    fn is_text(&self, node: NodeRef) -> bool {
        self.document
            .slot(node.0)
            .map_or(false, |s| s.kind == NodeKind::Text)
    }

    fn append_text_data(&mut self, node: NodeRef, text: &str) -> Result<(), BuildError> {
        self.document.append_text(node.0, text)?;
        Ok(())
    }

    fn finish(&mut self) {
        self.document.finish();
    }
}
