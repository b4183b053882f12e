//! Deferred Pool Slot Types
//!
//! Compact structures holding only raw payload: interned name ids and spans
//! into the text buffer. Qualified-name splitting and attribute maps are
//! computed when a node is read, not when it is stored.

use super::span::Span;
use crate::dom::NodeKind;

/// Flags for DeferredSlot
pub mod slot_flags {
    /// Text node reported as ignorable whitespace
    pub const IGNORABLE: u16 = 0x0001;
    /// Element name was recorded with namespace processing
    pub const NAMESPACE_AWARE: u16 = 0x0002;
}

/// Sentinel value for "no node"
pub const NO_NODE: u32 = u32::MAX;

#[inline]
pub(crate) fn link(handle: u32) -> Option<u32> {
    if handle == NO_NODE {
        None
    } else {
        Some(handle)
    }
}

/// One node in the deferred pool
///
/// Payload fields are interpreted per kind:
///
/// | kind | `name` | `uri` | `value` |
/// |------|--------|-------|---------|
/// | Element | raw name | namespace URI | - |
/// | Text, CData, Comment | - | - | data |
/// | ProcessingInstruction | target | - | data |
/// | EntityReference | name | - | - |
/// | DocumentType | root name | public id | system id |
///
/// String ids index the document's string pool; id 0 is the empty string.
#[derive(Debug, Clone, Copy)]
pub struct DeferredSlot {
    pub kind: NodeKind,
    /// Flags (see slot_flags)
    pub flags: u16,
    /// Parent slot (NO_NODE for the document and detached slots)
    pub parent: u32,
    /// First child slot (NO_NODE if no children)
    pub first_child: u32,
    /// Last child slot (for efficient appendChild)
    pub last_child: u32,
    /// Next sibling slot (NO_NODE if last child)
    pub next_sibling: u32,
    /// Previous sibling slot (NO_NODE if first child)
    pub prev_sibling: u32,
    pub name: u32,
    pub uri: u32,
    pub value: Span,
    /// Start index in attributes array
    pub attr_start: u32,
    /// Number of attributes
    pub attr_count: u32,
}

impl DeferredSlot {
    /// Create a detached slot
    #[inline]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            flags: 0,
            parent: NO_NODE,
            first_child: NO_NODE,
            last_child: NO_NODE,
            next_sibling: NO_NODE,
            prev_sibling: NO_NODE,
            name: 0,
            uri: 0,
            value: Span::empty(),
            attr_start: 0,
            attr_count: 0,
        }
    }

    /// Check if this slot has children
    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child != NO_NODE
    }

    /// Check if this slot has attributes
    #[inline]
    pub fn has_attributes(&self) -> bool {
        self.attr_count > 0
    }

    #[inline]
    pub fn has_flag(&self, flag: u16) -> bool {
        self.flags & flag != 0
    }
}

/// An attribute as delivered with its start tag, before any
/// duplicate-name resolution
#[derive(Debug, Clone, Copy)]
pub struct DeferredAttribute {
    /// Raw name string id
    pub name: u32,
    /// Namespace URI string id (0 = none)
    pub uri: u32,
    pub value: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_slot_detached() {
        let slot = DeferredSlot::new(NodeKind::Element);
        assert_eq!(slot.parent, NO_NODE);
        assert!(!slot.has_children());
        assert!(!slot.has_attributes());
        assert!(!slot.has_flag(slot_flags::IGNORABLE));
    }

    #[test]
    fn test_link() {
        assert_eq!(link(NO_NODE), None);
        assert_eq!(link(3), Some(3));
    }
}
