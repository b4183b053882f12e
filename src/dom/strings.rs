//! String Interning Pool
//!
//! Deduplicated storage for element names, attribute names and namespace
//! URIs of a deferred document. Every string is copied into one shared
//! buffer; id 0 is reserved for the empty string.
//!
//! Uses hash-based lookup to avoid storing duplicate string data.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Location of an interned string in the pool buffer: (offset, length)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StringEntry(u32, u32);

/// String interning pool
///
/// Memory layout:
/// - `entries`: offset/length for each interned string ID
/// - `data`: buffer holding every interned string
/// - `hash_index`: hash -> list of IDs (handles rare collisions)
#[derive(Debug, Clone)]
pub struct StringPool {
    /// Entries indexed by string ID
    entries: Vec<StringEntry>,
    /// Buffer for interned strings
    data: String,
    /// Hash of string content -> list of IDs with that hash
    hash_index: HashMap<u64, Vec<u32>>,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    /// Create a new empty string pool
    pub fn new() -> Self {
        let mut pool = StringPool {
            entries: Vec::with_capacity(64),
            data: String::with_capacity(1024),
            hash_index: HashMap::new(),
        };
        // Entry 0 is reserved for the empty string
        pool.entries.push(StringEntry(0, 0));
        pool
    }

    /// Compute hash of a string
    #[inline]
    fn compute_hash(s: &str) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Intern a string, returning its id
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(id) = self.lookup(s) {
            return id;
        }

        let offset = self.data.len() as u32;
        self.data.push_str(s);

        let id = self.entries.len() as u32;
        self.entries.push(StringEntry(offset, s.len() as u32));
        self.hash_index
            .entry(Self::compute_hash(s))
            .or_default()
            .push(id);
        id
    }

    /// Id of an already interned string
    pub fn lookup(&self, s: &str) -> Option<u32> {
        if s.is_empty() {
            return Some(0);
        }
        self.hash_index
            .get(&Self::compute_hash(s))?
            .iter()
            .copied()
            .find(|&id| self.get(id) == Some(s))
    }

    /// Get a string by ID
    pub fn get(&self, id: u32) -> Option<&str> {
        let StringEntry(offset, len) = *self.entries.get(id as usize)?;
        let start = offset as usize;
        self.data.get(start..start + len as usize)
    }

    /// Get the number of unique strings stored, the empty string included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1 // Entry 0 is reserved
    }

    /// Get total bytes used for string storage
    pub fn bytes_used(&self) -> usize {
        self.data.len()
    }

    /// Release spare capacity once the pool stops growing
    pub fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit();
        self.data.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern() {
        let mut pool = StringPool::new();
        let id = pool.intern("hello");
        assert!(id > 0);
        assert_eq!(pool.get(id), Some("hello"));
    }

    #[test]
    fn test_intern_duplicate() {
        let mut pool = StringPool::new();
        let id1 = pool.intern("hello");
        let id2 = pool.intern("hello");
        assert_eq!(id1, id2);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.bytes_used(), 5);
    }

    #[test]
    fn test_intern_different() {
        let mut pool = StringPool::new();
        let id1 = pool.intern("hello");
        let id2 = pool.intern("world");
        assert_ne!(id1, id2);
        assert_eq!(pool.lookup("world"), Some(id2));
        assert_eq!(pool.lookup("absent"), None);
    }

    #[test]
    fn test_empty_string() {
        let mut pool = StringPool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.intern(""), 0);
        assert_eq!(pool.get(0), Some(""));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_multibyte() {
        let mut pool = StringPool::new();
        let a = pool.intern("größe");
        let b = pool.intern("naïve");
        assert_eq!(pool.get(a), Some("größe"));
        assert_eq!(pool.get(b), Some("naïve"));
    }
}
