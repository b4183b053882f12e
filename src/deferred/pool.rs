//! Deferred Document - index-addressed node pool
//!
//! Stores the whole document as fixed-size slots linked by u32 handles,
//! with names interned and character data in one append-only buffer.
//! Slot 0 is always the document node.
//!
//! Construction only checks arena integrity; there is no hierarchy
//! validation while the pool grows.

use std::cell::RefCell;
use std::fmt;
use std::num::NonZeroUsize;
use std::rc::Rc;

use lru::LruCache;

use super::slot::{slot_flags, DeferredAttribute, DeferredSlot, NO_NODE};
use super::span::Span;
use super::view::AttributeMap;
use crate::dom::{NodeId, NodeKind, StringPool};
use crate::error::DomError;
use crate::sax::{Attributes, QName};

/// Number of elements whose resolved attribute maps are kept
const ATTRIBUTE_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::MIN.saturating_add(63);

/// A document stored as a compact node pool
pub struct DeferredDocument {
    /// Slots (index 0 is the document node)
    pub(crate) slots: Vec<DeferredSlot>,
    /// Attributes (referenced by elements via attr_start/attr_count)
    pub(crate) attributes: Vec<DeferredAttribute>,
    pub(crate) strings: StringPool,
    /// Character data of every text-bearing node
    pub(crate) text: String,
    pub(crate) namespace_aware: bool,
    /// Resolved attribute maps, built on first access
    pub(crate) attribute_cache: RefCell<LruCache<u32, Rc<AttributeMap>>>,
}

impl fmt::Debug for DeferredDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredDocument")
            .field("slots", &self.slots.len())
            .field("attributes", &self.attributes.len())
            .field("strings", &self.strings.len())
            .field("text_bytes", &self.text.len())
            .field("namespace_aware", &self.namespace_aware)
            .finish()
    }
}

impl DeferredDocument {
    /// Create a pool holding only the document node
    pub fn new(namespace_aware: bool) -> Self {
        let mut slots = Vec::with_capacity(256);
        slots.push(DeferredSlot::new(NodeKind::Document));
        Self {
            slots,
            attributes: Vec::with_capacity(128),
            strings: StringPool::new(),
            text: String::with_capacity(4096),
            namespace_aware,
            attribute_cache: RefCell::new(LruCache::new(ATTRIBUTE_CACHE_CAPACITY)),
        }
    }

    /// Whether element and attribute names carry namespace information
    pub fn namespace_aware(&self) -> bool {
        self.namespace_aware
    }

    /// Get a slot by index
    #[inline]
    pub fn slot(&self, id: NodeId) -> Option<&DeferredSlot> {
        self.slots.get(id as usize)
    }

    /// Number of slots, the document node included
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of attributes stored, duplicates included
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Bytes of character data held by the pool
    pub fn text_bytes(&self) -> usize {
        self.text.len()
    }

    fn push(&mut self, slot: DeferredSlot) -> NodeId {
        let id = self.slots.len() as NodeId;
        self.slots.push(slot);
        id
    }

    fn store_text(&mut self, data: &str) -> Span {
        let offset = self.text.len() as u32;
        self.text.push_str(data);
        Span::new(offset, data.len() as u32)
    }

    fn intern_uri(&mut self, uri: Option<&str>) -> u32 {
        match uri {
            Some(uri) if self.namespace_aware => self.strings.intern(uri),
            _ => 0,
        }
    }

    // ------------------------------------------------------------------
    // Slot creation
    // ------------------------------------------------------------------

    /// Create an element slot and store its attributes in event order
    pub fn create_element(&mut self, name: &QName, attributes: &Attributes) -> NodeId {
        let mut slot = DeferredSlot::new(NodeKind::Element);
        slot.name = self.strings.intern(&name.raw_name);
        slot.uri = self.intern_uri(name.uri.as_deref());
        if self.namespace_aware {
            slot.flags |= slot_flags::NAMESPACE_AWARE;
        }

        slot.attr_start = self.attributes.len() as u32;
        for attr in attributes {
            let stored = DeferredAttribute {
                name: self.strings.intern(&attr.name.raw_name),
                uri: self.intern_uri(attr.name.uri.as_deref()),
                value: self.store_text(&attr.value),
            };
            self.attributes.push(stored);
        }
        slot.attr_count = attributes.len() as u32;
        self.push(slot)
    }

    pub fn create_text(&mut self, data: &str, ignorable: bool) -> NodeId {
        let mut slot = DeferredSlot::new(NodeKind::Text);
        slot.value = self.store_text(data);
        if ignorable {
            slot.flags |= slot_flags::IGNORABLE;
        }
        self.push(slot)
    }

    pub fn create_cdata_section(&mut self, data: &str) -> NodeId {
        let mut slot = DeferredSlot::new(NodeKind::CData);
        slot.value = self.store_text(data);
        self.push(slot)
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        let mut slot = DeferredSlot::new(NodeKind::Comment);
        slot.value = self.store_text(data);
        self.push(slot)
    }

    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        let mut slot = DeferredSlot::new(NodeKind::ProcessingInstruction);
        slot.name = self.strings.intern(target);
        slot.value = self.store_text(data);
        self.push(slot)
    }

    pub fn create_entity_reference(&mut self, name: &str) -> NodeId {
        let mut slot = DeferredSlot::new(NodeKind::EntityReference);
        slot.name = self.strings.intern(name);
        self.push(slot)
    }

    /// Create a document type slot; empty identifiers read back as absent
    pub fn create_document_type(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> NodeId {
        let mut slot = DeferredSlot::new(NodeKind::DocumentType);
        slot.name = self.strings.intern(name);
        slot.uri = self.strings.intern(public_id.unwrap_or_default());
        slot.value = self.store_text(system_id.unwrap_or_default());
        self.push(slot)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.slot(parent).is_none() {
            return Err(DomError::NotFound(parent));
        }
        let child_slot = self.slot(child).ok_or(DomError::NotFound(child))?;
        if child_slot.parent != NO_NODE || child == parent || child == 0 {
            return Err(DomError::InUse(child));
        }

        let last = self.slots[parent as usize].last_child;
        if last == NO_NODE {
            self.slots[parent as usize].first_child = child;
        } else {
            self.slots[last as usize].next_sibling = child;
            self.slots[child as usize].prev_sibling = last;
        }
        self.slots[parent as usize].last_child = child;
        self.slots[child as usize].parent = parent;
        Ok(())
    }

    /// Append character data to a text, CDATA or comment slot.
    ///
    /// The newest span sits at the end of the buffer and grows in place;
    /// an older span is first moved to the end so it stays contiguous.
    pub fn append_text(&mut self, id: NodeId, data: &str) -> Result<(), DomError> {
        let slot = self.slot(id).ok_or(DomError::NotFound(id))?;
        if !slot.kind.is_character_data() {
            return Err(DomError::NotCharacterData(id));
        }

        let mut span = slot.value;
        if span.end() as usize != self.text.len() {
            let moved = span.as_str(&self.text).to_owned();
            span = self.store_text(&moved);
        }
        self.text.push_str(data);
        span.len += data.len() as u32;
        self.slots[id as usize].value = span;
        Ok(())
    }

    /// Release over-allocated capacity once construction is complete
    pub fn finish(&mut self) {
        self.slots.shrink_to_fit();
        self.attributes.shrink_to_fit();
        self.strings.shrink_to_fit();
        self.text.shrink_to_fit();
        log::debug!(
            target: "rustyxml_dom::deferred",
            "pool finished: {} slots, {} attributes, {} text bytes, {} names",
            self.slots.len(),
            self.attributes.len(),
            self.text.len(),
            self.strings.len()
        );
    }
}
