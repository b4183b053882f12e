//! Deferred Document View
//!
//! Read access to a [`DeferredDocument`]. Names are split and attribute
//! maps resolved only when asked for; [`DeferredDocument::expand`] turns
//! the whole pool into an eager [`Document`].

use std::rc::Rc;

use super::pool::DeferredDocument;
use super::slot::{link, slot_flags, NO_NODE};
use crate::dom::{Document, DocumentAccess, NodeId, NodeKind};
use crate::error::DomError;
use crate::sax::split_qname;

/// Resolved attributes of one element: indices into the attribute table,
/// one per distinct name, in first-seen position with the last-seen value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: Vec<u32>,
}

impl AttributeMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DeferredDocument {
    #[inline]
    fn string(&self, id: u32) -> &str {
        self.strings.get(id).unwrap_or_default()
    }

    fn build_attribute_map(&self, id: NodeId) -> AttributeMap {
        let mut map = AttributeMap::default();
        let Some(slot) = self.slot(id) else {
            return map;
        };
        let start = slot.attr_start;
        for index in start..start + slot.attr_count {
            let attr = &self.attributes[index as usize];
            let existing = map
                .entries
                .iter()
                .position(|&e| self.attributes[e as usize].name == attr.name);
            match existing {
                Some(pos) => map.entries[pos] = index,
                None => map.entries.push(index),
            }
        }
        map
    }

    /// Resolved attribute map of an element, cached after first access
    pub fn attribute_map(&self, id: NodeId) -> Rc<AttributeMap> {
        let has_attributes = self
            .slot(id)
            .map_or(false, |s| s.kind == NodeKind::Element && s.has_attributes());
        if !has_attributes {
            return Rc::new(AttributeMap::default());
        }

        if let Some(map) = self.attribute_cache.borrow_mut().get(&id) {
            return Rc::clone(map);
        }
        let map = Rc::new(self.build_attribute_map(id));
        self.attribute_cache.borrow_mut().put(id, Rc::clone(&map));
        map
    }

    /// Number of elements with a cached attribute map
    pub fn cached_attribute_maps(&self) -> usize {
        self.attribute_cache.borrow().len()
    }

    fn attribute_pairs(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> + '_ {
        let map = self.attribute_map(id);
        (0..map.len()).map(move |i| {
            let attr = &self.attributes[map.entries[i] as usize];
            (self.string(attr.name), attr.value.as_str(&self.text))
        })
    }

    /// Materialize the whole pool as an eager document
    pub fn expand(&self) -> Result<Document, DomError> {
        let mut doc = Document::with_capacity(self.slots.len() + self.attributes.len());
        doc.set_error_checking(false);

        let mut stack: Vec<(NodeId, NodeId)> = self
            .children_vec(0)
            .into_iter()
            .rev()
            .map(|c| (c, Document::ROOT))
            .collect();
        while let Some((slot_id, parent)) = stack.pop() {
            let node = self.materialize(&mut doc, slot_id)?;
            doc.append_child(parent, node)?;
            stack.extend(self.children_vec(slot_id).into_iter().rev().map(|c| (c, node)));
        }

        doc.set_error_checking(true);
        Ok(doc)
    }

    fn materialize(&self, doc: &mut Document, id: NodeId) -> Result<NodeId, DomError> {
        let slot = self.slot(id).ok_or(DomError::NotFound(id))?;
        let value = slot.value.as_str(&self.text);
        let node = match slot.kind {
            NodeKind::Element => {
                let raw = self.string(slot.name);
                let element = if slot.has_flag(slot_flags::NAMESPACE_AWARE) {
                    doc.create_element_ns(self.namespace_uri(id), raw)
                } else {
                    doc.create_element(raw)
                };
                let map = self.attribute_map(id);
                for &index in &map.entries {
                    let attr = &self.attributes[index as usize];
                    let name = self.string(attr.name);
                    let attr_value = attr.value.as_str(&self.text);
                    let node = if self.namespace_aware {
                        let uri = Some(self.string(attr.uri)).filter(|u| !u.is_empty());
                        doc.create_attribute_ns(uri, name, attr_value)
                    } else {
                        doc.create_attribute(name, attr_value)
                    };
                    doc.set_attribute_node(element, node)?;
                }
                element
            }
            NodeKind::Text => doc.create_text_node_with(value, slot.has_flag(slot_flags::IGNORABLE)),
            NodeKind::CData => doc.create_cdata_section(value),
            NodeKind::Comment => doc.create_comment(value),
            NodeKind::ProcessingInstruction => {
                doc.create_processing_instruction(self.string(slot.name), value)
            }
            NodeKind::EntityReference => doc.create_entity_reference(self.string(slot.name)),
            NodeKind::DocumentType => {
                let (public_id, system_id) = self.document_type_ids(id).unwrap_or((None, None));
                doc.create_document_type(self.string(slot.name), public_id, system_id)
            }
            NodeKind::Document | NodeKind::Attribute => {
                return Err(DomError::HierarchyRequest {
                    parent: NodeKind::Document,
                    child: slot.kind,
                })
            }
        };
        Ok(node)
    }
}

// =============================================================================
// DocumentAccess trait implementation
// =============================================================================

impl DocumentAccess for DeferredDocument {
    fn node_count(&self) -> usize {
        self.slots.len()
    }

    fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.slot(id).map(|s| s.kind)
    }

    fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        link(self.slot(id)?.parent)
    }

    fn children_vec(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut child = self.slot(id).map_or(NO_NODE, |s| s.first_child);
        while let Some(current) = link(child) {
            out.push(current);
            child = self.slots[current as usize].next_sibling;
        }
        out
    }

    fn node_name(&self, id: NodeId) -> Option<&str> {
        let slot = self.slot(id)?;
        match slot.kind {
            NodeKind::Element
            | NodeKind::ProcessingInstruction
            | NodeKind::EntityReference
            | NodeKind::DocumentType => Some(self.string(slot.name)),
            kind => kind.fixed_name(),
        }
    }

    fn node_value(&self, id: NodeId) -> Option<&str> {
        let slot = self.slot(id)?;
        match slot.kind {
            NodeKind::Text | NodeKind::CData | NodeKind::Comment | NodeKind::ProcessingInstruction => {
                Some(slot.value.as_str(&self.text))
            }
            _ => None,
        }
    }

    fn namespace_uri(&self, id: NodeId) -> Option<&str> {
        let slot = self.slot(id)?;
        if slot.kind == NodeKind::Element && slot.uri != 0 {
            self.strings.get(slot.uri)
        } else {
            None
        }
    }

    fn local_name(&self, id: NodeId) -> Option<&str> {
        let slot = self.slot(id)?;
        if slot.kind == NodeKind::Element && slot.has_flag(slot_flags::NAMESPACE_AWARE) {
            Some(split_qname(self.string(slot.name)).1)
        } else {
            None
        }
    }

    fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attribute_pairs(id)
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    fn attribute_values(&self, id: NodeId) -> Vec<(&str, &str)> {
        self.attribute_pairs(id).collect()
    }

    fn is_ignorable_whitespace(&self, id: NodeId) -> bool {
        self.slot(id)
            .map_or(false, |s| s.kind == NodeKind::Text && s.has_flag(slot_flags::IGNORABLE))
    }

    fn document_type_ids(&self, id: NodeId) -> Option<(Option<&str>, Option<&str>)> {
        let slot = self.slot(id)?;
        if slot.kind != NodeKind::DocumentType {
            return None;
        }
        let public_id = Some(self.string(slot.uri)).filter(|s| !s.is_empty());
        let system_id = Some(slot.value.as_str(&self.text)).filter(|s| !s.is_empty());
        Some((public_id, system_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sax::{Attributes, QName};

    fn sample(namespace_aware: bool) -> (DeferredDocument, NodeId) {
        let mut doc = DeferredDocument::new(namespace_aware);
        let attrs = Attributes::new()
            .with("id", "1")
            .with("class", "c")
            .with("id", "2");
        let root = doc.create_element(&QName::with_uri("urn:r", "r:root"), &attrs);
        doc.append_child(0, root).unwrap();
        (doc, root)
    }

    #[test]
    fn test_attribute_map_last_value_wins() {
        let (doc, root) = sample(false);
        assert_eq!(doc.attribute_values(root), vec![("id", "2"), ("class", "c")]);
        assert_eq!(doc.get_attribute(root, "id"), Some("2"));
        assert_eq!(doc.get_attribute(root, "missing"), None);
    }

    #[test]
    fn test_attribute_map_keyed_by_qualified_name() {
        let mut doc = DeferredDocument::new(true);
        let attrs = Attributes::new()
            .with_ns("urn:x", "p:a", "1")
            .with_ns("urn:x", "q:a", "2")
            .with_ns("urn:x", "p:a", "3");
        let root = doc.create_element(&QName::new("e"), &attrs);
        doc.append_child(0, root).unwrap();
        assert_eq!(doc.attribute_values(root), vec![("p:a", "3"), ("q:a", "2")]);
    }

    #[test]
    fn test_attribute_map_cached() {
        let (doc, root) = sample(false);
        assert_eq!(doc.cached_attribute_maps(), 0);
        let first = doc.attribute_map(root);
        let second = doc.attribute_map(root);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(doc.cached_attribute_maps(), 1);
    }

    #[test]
    fn test_names_split_on_access() {
        let (doc, root) = sample(true);
        assert_eq!(doc.node_name(root), Some("r:root"));
        assert_eq!(doc.local_name(root), Some("root"));
        assert_eq!(doc.namespace_uri(root), Some("urn:r"));

        let (plain, root) = sample(false);
        assert_eq!(plain.local_name(root), None);
        assert_eq!(plain.namespace_uri(root), None);
    }

    #[test]
    fn test_fixed_names_and_values() {
        let mut doc = DeferredDocument::new(false);
        let t = doc.create_text("hi", true);
        let pi = doc.create_processing_instruction("xml-stylesheet", "href=\"a\"");
        doc.append_child(0, t).unwrap();
        doc.append_child(0, pi).unwrap();
        assert_eq!(doc.node_name(0), Some("#document"));
        assert_eq!(doc.node_name(t), Some("#text"));
        assert_eq!(doc.node_value(t), Some("hi"));
        assert!(doc.is_ignorable_whitespace(t));
        assert_eq!(doc.node_name(pi), Some("xml-stylesheet"));
        assert_eq!(doc.node_value(pi), Some("href=\"a\""));
        assert_eq!(doc.children_vec(0), vec![t, pi]);
        assert_eq!(doc.parent_node(pi), Some(0));
        assert_eq!(doc.parent_node(0), None);
    }

    #[test]
    fn test_doctype_ids() {
        let mut doc = DeferredDocument::new(false);
        let dt = doc.create_document_type("html", None, Some("about:legacy-compat"));
        doc.append_child(0, dt).unwrap();
        assert_eq!(doc.doctype(), Some(dt));
        assert_eq!(doc.document_type_ids(dt), Some((None, Some("about:legacy-compat"))));
    }

    #[test]
    fn test_expand_matches_pool() {
        let (mut doc, root) = sample(true);
        let text = doc.create_text("a", false);
        let cdata = doc.create_cdata_section("b");
        let er = doc.create_entity_reference("ent");
        let inner = doc.create_text("c", false);
        doc.append_child(root, text).unwrap();
        doc.append_child(root, cdata).unwrap();
        doc.append_child(root, er).unwrap();
        doc.append_child(er, inner).unwrap();

        let eager = doc.expand().unwrap();
        assert!(eager.error_checking());
        let el = eager.document_element().unwrap();
        assert_eq!(DocumentAccess::local_name(&eager, el), Some("root"));
        assert_eq!(DocumentAccess::namespace_uri(&eager, el), Some("urn:r"));
        assert_eq!(
            DocumentAccess::attribute_values(&eager, el),
            vec![("id", "2"), ("class", "c")]
        );
        let kinds: Vec<_> = eager
            .children(el)
            .filter_map(|c| DocumentAccess::node_kind(&eager, c))
            .collect();
        assert_eq!(kinds, vec![NodeKind::Text, NodeKind::CData, NodeKind::EntityReference]);
        assert_eq!(eager.text_content(el), "abc");
    }
}
