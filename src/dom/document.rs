//! XML Document - Arena-based DOM representation
//!
//! The eager tree: every node is fully formed when it is created and the
//! document owns the whole arena, so dropping the document releases every
//! node at once.
//!
//! Hierarchy checks can be switched off while a trusted builder is
//! constructing the tree and switched back on once it is done. Arena
//! integrity (node existence, single parent) is checked either way.

use super::node::{NodeData, NodeId, NodeKind, QualifiedName, XmlNode};
use super::DocumentAccess;
use crate::error::DomError;

/// An XML document stored in arena format
#[derive(Debug, Clone)]
pub struct Document {
    /// Arena of nodes, index 0 is the document node
    nodes: Vec<XmlNode>,
    /// Enforce DOM hierarchy rules on insertion
    error_checking: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Id of the document node
    pub const ROOT: NodeId = 0;

    /// Create an empty document with error checking enabled
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create an empty document with room for `nodes` nodes
    pub fn with_capacity(nodes: usize) -> Self {
        let mut arena = Vec::with_capacity(nodes.max(1));
        arena.push(XmlNode::new(NodeData::Document));
        Document {
            nodes: arena,
            error_checking: true,
        }
    }

    /// Whether hierarchy rules are enforced on insertion
    pub fn error_checking(&self) -> bool {
        self.error_checking
    }

    pub fn set_error_checking(&mut self, enabled: bool) {
        self.error_checking = enabled;
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(XmlNode::new(data));
        id
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    /// Create an element without namespace processing
    pub fn create_element(&mut self, raw_name: &str) -> NodeId {
        self.push(NodeData::Element {
            name: QualifiedName::plain(raw_name),
            attributes: Vec::new(),
        })
    }

    /// Create a namespace-aware element
    pub fn create_element_ns(&mut self, uri: Option<&str>, raw_name: &str) -> NodeId {
        self.push(NodeData::Element {
            name: QualifiedName::namespaced(uri, raw_name),
            attributes: Vec::new(),
        })
    }

    /// Create an attribute without namespace processing
    pub fn create_attribute(&mut self, raw_name: &str, value: &str) -> NodeId {
        self.push(NodeData::Attribute {
            name: QualifiedName::plain(raw_name),
            value: value.to_owned(),
            owner: None,
        })
    }

    /// Create a namespace-aware attribute
    pub fn create_attribute_ns(&mut self, uri: Option<&str>, raw_name: &str, value: &str) -> NodeId {
        self.push(NodeData::Attribute {
            name: QualifiedName::namespaced(uri, raw_name),
            value: value.to_owned(),
            owner: None,
        })
    }

    pub fn create_text_node(&mut self, data: &str) -> NodeId {
        self.create_text_node_with(data, false)
    }

    /// Text node carrying the ignorable-whitespace flag
    pub fn create_text_node_with(&mut self, data: &str, ignorable: bool) -> NodeId {
        self.push(NodeData::Text {
            data: data.to_owned(),
            ignorable,
        })
    }

    pub fn create_cdata_section(&mut self, data: &str) -> NodeId {
        self.push(NodeData::CData(data.to_owned()))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.push(NodeData::Comment(data.to_owned()))
    }

    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        self.push(NodeData::ProcessingInstruction {
            target: target.to_owned(),
            data: data.to_owned(),
        })
    }

    pub fn create_entity_reference(&mut self, name: &str) -> NodeId {
        self.push(NodeData::EntityReference {
            name: name.to_owned(),
        })
    }

    pub fn create_document_type(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> NodeId {
        self.push(NodeData::DocumentType {
            name: name.to_owned(),
            public_id: public_id.map(str::to_owned),
            system_id: system_id.map(str::to_owned),
        })
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    fn check_exists(&self, id: NodeId) -> Result<(), DomError> {
        if (id as usize) < self.nodes.len() {
            Ok(())
        } else {
            Err(DomError::NotFound(id))
        }
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_exists(parent)?;
        self.check_exists(child)?;

        let child_kind = self.nodes[child as usize].kind();
        if matches!(child_kind, NodeKind::Document | NodeKind::Attribute) {
            return Err(DomError::HierarchyRequest {
                parent: self.nodes[parent as usize].kind(),
                child: child_kind,
            });
        }
        if self.nodes[child as usize].parent.is_some() || child == parent {
            return Err(DomError::InUse(child));
        }
        if self.error_checking {
            self.check_hierarchy(parent, child, child_kind)?;
        }

        self.link_child(parent, child);
        Ok(())
    }

    fn check_hierarchy(&self, parent: NodeId, child: NodeId, child_kind: NodeKind) -> Result<(), DomError> {
        let parent_kind = self.nodes[parent as usize].kind();
        let rejected = DomError::HierarchyRequest {
            parent: parent_kind,
            child: child_kind,
        };
        if !parent_kind.can_have_children() {
            return Err(rejected);
        }

        match parent_kind {
            NodeKind::Document => match child_kind {
                NodeKind::Comment | NodeKind::ProcessingInstruction => {}
                NodeKind::Element | NodeKind::DocumentType => {
                    if self.children(parent).any(|c| self.nodes[c as usize].kind() == child_kind) {
                        return Err(rejected);
                    }
                }
                _ => return Err(rejected),
            },
            _ => {
                if child_kind == NodeKind::DocumentType {
                    return Err(rejected);
                }
            }
        }

        // A detached subtree must not be grafted below itself
        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(rejected);
            }
            ancestor = self.nodes[id as usize].parent;
        }
        Ok(())
    }

    /// Link a child node to its parent
    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        // Get parent's last_child first to avoid borrow issues
        let last_child_opt = self.nodes[parent_id as usize].last_child;

        if let Some(last_child_id) = last_child_opt {
            // Link to previous sibling
            self.nodes[child_id as usize].prev_sibling = Some(last_child_id);
            self.nodes[last_child_id as usize].next_sibling = Some(child_id);
        } else {
            // First child
            self.nodes[parent_id as usize].first_child = Some(child_id);
        }
        self.nodes[parent_id as usize].last_child = Some(child_id);
        self.nodes[child_id as usize].parent = Some(parent_id);
    }

    /// Append character data to a text, CDATA or comment node
    pub fn append_data(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        self.check_exists(id)?;
        match &mut self.nodes[id as usize].data {
            NodeData::Text { data, .. } | NodeData::CData(data) | NodeData::Comment(data) => {
                data.push_str(text);
                Ok(())
            }
            _ => Err(DomError::NotCharacterData(id)),
        }
    }

    /// Attach an attribute node to an element.
    ///
    /// An attribute with the same name is replaced in place and returned.
    pub fn set_attribute_node(&mut self, element: NodeId, attr: NodeId) -> Result<Option<NodeId>, DomError> {
        self.check_exists(element)?;
        self.check_exists(attr)?;

        let new_name = match &self.nodes[attr as usize].data {
            NodeData::Attribute { owner: Some(owner), .. } if *owner != element => {
                return Err(DomError::InUse(attr));
            }
            NodeData::Attribute { owner: Some(_), .. } => return Ok(None),
            NodeData::Attribute { name, .. } => name.clone(),
            _ => {
                return Err(DomError::HierarchyRequest {
                    parent: NodeKind::Element,
                    child: self.nodes[attr as usize].kind(),
                })
            }
        };

        let existing = match &self.nodes[element as usize].data {
            NodeData::Element { attributes, .. } => attributes.iter().position(|&a| {
                self.nodes[a as usize]
                    .qualified_name()
                    .map_or(false, |n| n.same_attribute(&new_name))
            }),
            _ => return Err(DomError::NotElement(element)),
        };

        let replaced = match &mut self.nodes[element as usize].data {
            NodeData::Element { attributes, .. } => match existing {
                Some(pos) => Some(std::mem::replace(&mut attributes[pos], attr)),
                None => {
                    attributes.push(attr);
                    None
                }
            },
            _ => None,
        };

        if let NodeData::Attribute { owner, .. } = &mut self.nodes[attr as usize].data {
            *owner = Some(element);
        }
        if let Some(old) = replaced {
            if let NodeData::Attribute { owner, .. } = &mut self.nodes[old as usize].data {
                *owner = None;
            }
        }
        Ok(replaced)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    /// Get the document element
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(Self::ROOT)
            .find(|&id| self.nodes[id as usize].is_element())
    }

    pub fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.last_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.next_sibling
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.prev_sibling
    }

    /// Attribute nodes of an element, in attachment order
    pub fn attributes(&self, id: NodeId) -> &[NodeId] {
        match self.get_node(id).map(|n| &n.data) {
            Some(NodeData::Element { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    /// Element that owns an attribute node
    pub fn owner_element(&self, attr: NodeId) -> Option<NodeId> {
        match self.get_node(attr)?.data {
            NodeData::Attribute { owner, .. } => owner,
            _ => None,
        }
    }

    /// Get attribute value by raw name
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id).iter().find_map(|&a| {
            let node = &self.nodes[a as usize];
            if node.node_name() == name {
                node.node_value()
            } else {
                None
            }
        })
    }

    /// Get attribute value by namespace URI and local name
    pub fn get_attribute_ns(&self, id: NodeId, uri: Option<&str>, local_name: &str) -> Option<&str> {
        self.attributes(id).iter().find_map(|&a| {
            let node = &self.nodes[a as usize];
            let name = node.qualified_name()?;
            if name.namespace_uri() == uri && name.local_name() == Some(local_name) {
                node.node_value()
            } else {
                None
            }
        })
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let first = self.get_node(id).and_then(|n| n.first_child);
        ChildIter { doc: self, next: first }
    }

    /// Iterate over all descendants of a node
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        // Initialize stack with all children in reverse order (so first is processed first)
        let mut stack = Vec::new();
        if let Some(node) = self.get_node(id) {
            let mut child_id = node.last_child;
            while let Some(cid) = child_id {
                stack.push(cid);
                child_id = self.get_node(cid).and_then(|n| n.prev_sibling);
            }
        }
        DescendantIter { doc: self, stack }
    }

    /// Get total number of nodes, attributes and detached nodes included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Iterator over child nodes
pub struct ChildIter<'d> {
    doc: &'d Document,
    next: Option<NodeId>,
}

impl<'d> Iterator for ChildIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.get_node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Iterator over descendant nodes (depth-first)
pub struct DescendantIter<'d> {
    doc: &'d Document,
    stack: Vec<NodeId>,
}

impl<'d> Iterator for DescendantIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        // Add children to stack in reverse order (so first child is processed first)
        if let Some(node) = self.doc.get_node(current) {
            let mut child_id = node.last_child;
            while let Some(id) = child_id {
                self.stack.push(id);
                child_id = self.doc.get_node(id).and_then(|n| n.prev_sibling);
            }
        }

        Some(current)
    }
}

// =============================================================================
// DocumentAccess trait implementation
// =============================================================================

impl DocumentAccess for Document {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get_node(id).map(XmlNode::kind)
    }

    fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        Document::parent_node(self, id)
    }

    fn children_vec(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).collect()
    }

    fn node_name(&self, id: NodeId) -> Option<&str> {
        self.get_node(id).map(XmlNode::node_name)
    }

    fn node_value(&self, id: NodeId) -> Option<&str> {
        self.get_node(id)?.node_value()
    }

    fn namespace_uri(&self, id: NodeId) -> Option<&str> {
        self.get_node(id)?.qualified_name()?.namespace_uri()
    }

    fn local_name(&self, id: NodeId) -> Option<&str> {
        self.get_node(id)?.qualified_name()?.local_name()
    }

    fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        Document::get_attribute(self, id, name)
    }

    fn attribute_values(&self, id: NodeId) -> Vec<(&str, &str)> {
        self.attributes(id)
            .iter()
            .filter_map(|&a| {
                let node = self.get_node(a)?;
                Some((node.node_name(), node.node_value()?))
            })
            .collect()
    }

    fn is_ignorable_whitespace(&self, id: NodeId) -> bool {
        self.get_node(id).map_or(false, XmlNode::is_ignorable_whitespace)
    }

    fn document_type_ids(&self, id: NodeId) -> Option<(Option<&str>, Option<&str>)> {
        match &self.get_node(id)?.data {
            NodeData::DocumentType {
                public_id,
                system_id,
                ..
            } => Some((public_id.as_deref(), system_id.as_deref())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.create_element("root");
        doc.append_child(Document::ROOT, root).unwrap();
        (doc, root)
    }

    #[test]
    fn test_build_nested() {
        let (mut doc, root) = sample();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(root, a).unwrap();
        doc.append_child(a, b).unwrap();

        assert_eq!(doc.document_element(), Some(root));
        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![a]);
        assert_eq!(doc.descendants(Document::ROOT).collect::<Vec<_>>(), vec![root, a, b]);
        assert_eq!(doc.parent_node(b), Some(a));
    }

    #[test]
    fn test_siblings() {
        let (mut doc, root) = sample();
        let ids: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|n| {
                let id = doc.create_element(n);
                doc.append_child(root, id).unwrap();
                id
            })
            .collect();

        let first = doc.get_node(ids[0]).unwrap();
        assert!(first.prev_sibling.is_none());
        assert_eq!(first.next_sibling, Some(ids[1]));
        assert_eq!(doc.last_child(root), Some(ids[2]));
        assert_eq!(doc.prev_sibling(ids[2]), Some(ids[1]));
    }

    #[test]
    fn test_hierarchy_checks_enforced() {
        let (mut doc, _root) = sample();
        let second = doc.create_element("second");
        assert_eq!(
            doc.append_child(Document::ROOT, second),
            Err(DomError::HierarchyRequest {
                parent: NodeKind::Document,
                child: NodeKind::Element,
            })
        );

        let text = doc.create_text_node("stray");
        assert!(doc.append_child(Document::ROOT, text).is_err());

        let comment = doc.create_comment("c");
        let leaf = doc.create_text_node("leaf");
        assert!(doc.append_child(comment, leaf).is_err());
    }

    #[test]
    fn test_hierarchy_checks_relaxed() {
        let (mut doc, _root) = sample();
        doc.set_error_checking(false);
        let text = doc.create_text_node("\n");
        assert_eq!(doc.append_child(Document::ROOT, text), Ok(()));
        doc.set_error_checking(true);
        assert!(doc.error_checking());
    }

    #[test]
    fn test_integrity_checked_when_relaxed() {
        let (mut doc, root) = sample();
        doc.set_error_checking(false);
        let a = doc.create_element("a");
        doc.append_child(root, a).unwrap();
        assert_eq!(doc.append_child(root, a), Err(DomError::InUse(a)));
        assert_eq!(doc.append_child(root, 999), Err(DomError::NotFound(999)));
        let attr = doc.create_attribute("id", "1");
        assert!(matches!(
            doc.append_child(root, attr),
            Err(DomError::HierarchyRequest { .. })
        ));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut doc = Document::new();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(a, b).unwrap();
        // `a` is detached but is an ancestor of `b`
        assert!(doc.append_child(b, a).is_err());
    }

    #[test]
    fn test_append_data() {
        let (mut doc, root) = sample();
        let text = doc.create_text_node("x");
        doc.append_child(root, text).unwrap();
        doc.append_data(text, "y").unwrap();
        assert_eq!(doc.get_node(text).unwrap().node_value(), Some("xy"));
        assert_eq!(doc.append_data(root, "z"), Err(DomError::NotCharacterData(root)));
    }

    #[test]
    fn test_text_node_ignorable_flag() {
        let mut doc = Document::new();
        let plain = doc.create_text_node("x");
        let space = doc.create_text_node_with(" ", true);
        assert!(!doc.get_node(plain).unwrap().is_ignorable_whitespace());
        assert!(doc.get_node(space).unwrap().is_ignorable_whitespace());
        doc.append_data(space, "x").unwrap();
        assert!(doc.get_node(space).unwrap().is_ignorable_whitespace());
    }

    #[test]
    fn test_attribute_replacement() {
        let (mut doc, root) = sample();
        let first = doc.create_attribute("id", "1");
        let other = doc.create_attribute("class", "c");
        let second = doc.create_attribute("id", "2");
        assert_eq!(doc.set_attribute_node(root, first), Ok(None));
        assert_eq!(doc.set_attribute_node(root, other), Ok(None));
        assert_eq!(doc.set_attribute_node(root, second), Ok(Some(first)));

        assert_eq!(doc.attributes(root), &[second, other]);
        assert_eq!(doc.get_attribute(root, "id"), Some("2"));
        assert_eq!(doc.owner_element(second), Some(root));
        assert_eq!(doc.owner_element(first), None);
    }

    #[test]
    fn test_attribute_ns_lookup() {
        let mut doc = Document::new();
        let el = doc.create_element_ns(Some("urn:a"), "a:el");
        let attr = doc.create_attribute_ns(Some("urn:b"), "b:ref", "x");
        doc.set_attribute_node(el, attr).unwrap();
        assert_eq!(doc.get_attribute_ns(el, Some("urn:b"), "ref"), Some("x"));
        assert_eq!(doc.get_attribute_ns(el, None, "ref"), None);
        assert_eq!(DocumentAccess::local_name(&doc, el), Some("el"));
        assert_eq!(DocumentAccess::namespace_uri(&doc, el), Some("urn:a"));
    }

    #[test]
    fn test_attribute_owned_elsewhere() {
        let mut doc = Document::new();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        let attr = doc.create_attribute("id", "1");
        doc.set_attribute_node(a, attr).unwrap();
        assert_eq!(doc.set_attribute_node(b, attr), Err(DomError::InUse(attr)));
    }

    #[test]
    fn test_text_content() {
        let (mut doc, root) = sample();
        let t = doc.create_text_node("a");
        let c = doc.create_comment("skip");
        let cd = doc.create_cdata_section("b");
        for id in [t, c, cd] {
            doc.append_child(root, id).unwrap();
        }
        assert_eq!(doc.text_content(root), "ab");
    }
}
