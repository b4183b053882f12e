//! Eager strategy: every event becomes a real [`Document`] node at once.

use super::sink::{NodeRef, TreeSink};
use crate::dom::Document;
use crate::error::BuildError;
use crate::factory::DocumentFactory;
use crate::sax::{Attributes, QName};

/// A document under construction by the eager strategy
#[derive(Debug)]
pub struct MaterializedTree {
    pub(crate) document: Document,
    doctype_supported: bool,
    relaxed: bool,
    namespace_aware: bool,
}

impl MaterializedTree {
    /// Start a document from `factory`, relaxing its hierarchy checks if the
    /// factory allows it
    pub fn new(factory: &dyn DocumentFactory, namespace_aware: bool) -> Self {
        let mut document = factory.create_document();
        let relaxed = factory.supports_relaxed_checks();
        if relaxed {
            document.set_error_checking(false);
        }
        MaterializedTree {
            document,
            doctype_supported: factory.supports_document_type(),
            relaxed,
            namespace_aware,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

impl TreeSink for MaterializedTree {
    fn document_node(&self) -> NodeRef {
        NodeRef(Document::ROOT)
    }

    fn create_document_type(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Option<NodeRef> {
        if !self.doctype_supported {
            return None;
        }
        Some(NodeRef(
            self.document.create_document_type(name, public_id, system_id),
        ))
    }

    fn create_element(&mut self, name: &QName, attributes: &Attributes) -> Result<NodeRef, BuildError> {
        let doc = &mut self.document;
        let element = if self.namespace_aware {
            doc.create_element_ns(name.uri.as_deref(), &name.raw_name)
        } else {
            doc.create_element(&name.raw_name)
        };
        for attr in attributes {
            let node = if self.namespace_aware {
                doc.create_attribute_ns(attr.name.uri.as_deref(), &attr.name.raw_name, &attr.value)
            } else {
                doc.create_attribute(&attr.name.raw_name, &attr.value)
            };
            doc.set_attribute_node(element, node)?;
        }
        Ok(NodeRef(element))
    }

    fn create_text(&mut self, data: &str, ignorable: bool) -> NodeRef {
        NodeRef(self.document.create_text_node_with(data, ignorable))
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
        self.document.parent_node(node.0).map(NodeRef)
    }

    fn last_child(&self, node: NodeRef) -> Option<NodeRef> {
        self.document.last_child(node.0).map(NodeRef)
    }

    fn is_text(&self, node: NodeRef) -> bool {
        self.document.get_node(node.0).map_or(false, |n| n.is_text())
    }

    fn append_text_data(&mut self, node: NodeRef, text: &str) -> Result<(), BuildError> {
        self.document.append_data(node.0, text)?;
        Ok(())
    }

    fn finish(&mut self) {
        if self.relaxed {
            self.document.set_error_checking(true);
        }
    }
}
