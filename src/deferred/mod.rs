//! Deferred Document Module
//!
//! A compact node pool for documents that are built once and read later.
//! Construction stores only raw payload:
//!
//! - **Interned names**: element names, PI targets and namespace URIs are
//!   stored once in a string pool and referenced by id.
//! - **One text buffer**: character data is appended to a single buffer
//!   and referenced by spans, so coalescing text grows a span in place.
//! - **Lazy views**: qualified-name splits and duplicate-free attribute
//!   maps are computed on access; attribute maps sit in an LRU cache.
//!
//! ## Architecture
//!
//! ```text
//! DeferredDocument
//! ├── slots: Vec<DeferredSlot>            # slot 0 = document
//! ├── attributes: Vec<DeferredAttribute>  # (attr_start, attr_count) per element
//! ├── strings: StringPool
//! ├── text: String                        # append-only
//! └── attribute_cache: LruCache<slot, AttributeMap>
//! ```

pub mod pool;
pub mod slot;
pub mod span;
pub mod view;

pub use pool::DeferredDocument;
pub use slot::{DeferredSlot, NO_NODE};
pub use span::Span;
pub use view::AttributeMap;
