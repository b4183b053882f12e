//! rustyxml-dom - Event-to-tree DOM construction
//!
//! Consumes the document events of an upstream XML scanner and builds an
//! in-memory tree. Two strategies:
//! Eager: every node is materialized in an arena [`Document`] on arrival
//! Deferred: nodes are stored raw in a [`DeferredDocument`] pool and
//!   expanded on access
//!
//! ```
//! use rustyxml_dom::{DocumentAccess, DomBuilder, SaxEvent};
//!
//! let mut builder = DomBuilder::new();
//! let events = vec![
//!     SaxEvent::start_document(),
//!     SaxEvent::start_element("a"),
//!     SaxEvent::characters("x"),
//!     SaxEvent::characters("y"),
//!     SaxEvent::end_element("a"),
//!     SaxEvent::EndDocument,
//! ];
//! let built = builder.build(events.into_iter().map(Ok)).unwrap();
//! let doc = built.access();
//! let a = doc.document_element().unwrap();
//! assert_eq!(doc.text_content(a), "xy");
//! ```

pub mod builder;
pub mod config;
pub mod deferred;
pub mod dom;
pub mod error;
pub mod factory;
pub mod sax;

pub use builder::{BuiltDocument, DocumentRef, DomBuilder, NodeRef, Strategy, TreeSink};
pub use config::{Configuration, FeatureSnapshot, ParserConfiguration, PropertyValue};
pub use deferred::DeferredDocument;
pub use dom::{Document, DocumentAccess, NodeId, NodeKind};
pub use error::{BuildError, ConfigError, DomError, UpstreamError};
pub use factory::{DefaultDocumentFactory, DocumentFactory, FactoryRegistry, DEFAULT_DOCUMENT_FACTORY};
pub use sax::{replay, Attributes, DocumentHandler, EventRecorder, Locator, QName, SaxEvent};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "memory_tracking")]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
    pub static PEAK_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

    pub struct TrackingAllocator;

    #[cfg(feature = "mimalloc")]
    static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;
    #[cfg(not(feature = "mimalloc"))]
    static UNDERLYING: std::alloc::System = std::alloc::System;

    unsafe impl GlobalAlloc for TrackingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = UNDERLYING.alloc(layout);
            if !ptr.is_null() {
                let current = ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
                let mut peak = PEAK_ALLOCATED.load(Ordering::Relaxed);
                while current > peak {
                    match PEAK_ALLOCATED.compare_exchange_weak(
                        peak,
                        current,
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    ) {
                        Ok(_) => break,
                        Err(p) => peak = p,
                    }
                }
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
            UNDERLYING.dealloc(ptr, layout)
        }
    }
}

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator = tracking::TrackingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Heap accounting for comparing eager and deferred peak memory.
///
/// Every function reports 0 unless the `memory_tracking` feature is on.
pub mod memory {
    #[cfg(feature = "memory_tracking")]
    use std::sync::atomic::Ordering;

    /// Bytes currently allocated
    #[cfg(feature = "memory_tracking")]
    pub fn allocated() -> usize {
        super::tracking::ALLOCATED.load(Ordering::SeqCst)
    }

    /// Highest allocation seen since start or the last reset
    #[cfg(feature = "memory_tracking")]
    pub fn peak() -> usize {
        super::tracking::PEAK_ALLOCATED.load(Ordering::SeqCst)
    }

    /// Reset the peak to the current allocation, returning (current, old peak)
    #[cfg(feature = "memory_tracking")]
    pub fn reset_peak() -> (usize, usize) {
        let current = super::tracking::ALLOCATED.load(Ordering::SeqCst);
        let peak = super::tracking::PEAK_ALLOCATED.swap(current, Ordering::SeqCst);
        (current, peak)
    }

    #[cfg(not(feature = "memory_tracking"))]
    pub fn allocated() -> usize {
        0
    }

    #[cfg(not(feature = "memory_tracking"))]
    pub fn peak() -> usize {
        0
    }

    #[cfg(not(feature = "memory_tracking"))]
    pub fn reset_peak() -> (usize, usize) {
        (0, 0)
    }
}
