//! Document factories
//!
//! The builder creates eager documents through a named factory looked up in
//! a [`FactoryRegistry`]. The name comes from configuration and is checked
//! at `reset`, before any event arrives.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dom::Document;
use crate::error::ConfigError;

/// Name of the factory that produces the builder's own [`Document`]
pub const DEFAULT_DOCUMENT_FACTORY: &str = "rustyxml_dom::Document";

/// Produces empty documents for the eager strategy
pub trait DocumentFactory: Send + Sync + fmt::Debug {
    /// A fresh document holding only its document node
    fn create_document(&self) -> Document;

    /// Whether documents from this factory carry document type nodes
    fn supports_document_type(&self) -> bool {
        true
    }

    /// Whether hierarchy checks may be switched off while building
    fn supports_relaxed_checks(&self) -> bool {
        true
    }
}

/// Factory for the builder's own document type
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDocumentFactory;

impl DocumentFactory for DefaultDocumentFactory {
    fn create_document(&self) -> Document {
        Document::new()
    }
}

/// A registry entry
#[derive(Debug, Clone)]
pub enum Registration {
    Document(Arc<dyn DocumentFactory>),
    /// A name bound to something that cannot build documents
    Other(&'static str),
}

/// A factory chosen for one parse
#[derive(Debug, Clone)]
pub struct ResolvedFactory {
    pub name: String,
    pub factory: Arc<dyn DocumentFactory>,
    /// True only for the built-in default factory
    pub is_default: bool,
}

/// Table of named document factories
#[derive(Debug, Clone)]
pub struct FactoryRegistry {
    entries: HashMap<String, Registration>,
    builtin: Arc<dyn DocumentFactory>,
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FactoryRegistry {
    /// Registry holding only the default factory
    pub fn new() -> Self {
        let builtin: Arc<dyn DocumentFactory> = Arc::new(DefaultDocumentFactory);
        let mut entries = HashMap::new();
        entries.insert(
            DEFAULT_DOCUMENT_FACTORY.to_owned(),
            Registration::Document(Arc::clone(&builtin)),
        );
        FactoryRegistry { entries, builtin }
    }

    /// Register a document factory, returning the entry it replaced
    pub fn register<F>(&mut self, name: &str, factory: F) -> Option<Registration>
    where
        F: DocumentFactory + 'static,
    {
        self.entries
            .insert(name.to_owned(), Registration::Document(Arc::new(factory)))
    }

    /// Bind a name to a non-document type
    pub fn register_other(&mut self, name: &str, kind: &'static str) -> Option<Registration> {
        self.entries.insert(name.to_owned(), Registration::Other(kind))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Look up a factory; a missing or empty name means the default
    pub fn resolve(&self, name: Option<&str>) -> Result<ResolvedFactory, ConfigError> {
        let name = match name {
            Some(n) if !n.is_empty() => n,
            _ => DEFAULT_DOCUMENT_FACTORY,
        };
        match self.entries.get(name) {
            Some(Registration::Document(factory)) => Ok(ResolvedFactory {
                name: name.to_owned(),
                is_default: Arc::ptr_eq(factory, &self.builtin),
                factory: Arc::clone(factory),
            }),
            Some(Registration::Other(kind)) => Err(ConfigError::FactoryNotDocument {
                name: name.to_owned(),
                found: kind,
            }),
            None => Err(ConfigError::FactoryNotFound(name.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Plain;

    impl DocumentFactory for Plain {
        fn create_document(&self) -> Document {
            Document::new()
        }

        fn supports_document_type(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_default_resolution() {
        let registry = FactoryRegistry::new();
        for name in [None, Some(""), Some(DEFAULT_DOCUMENT_FACTORY)] {
            let resolved = registry.resolve(name).unwrap();
            assert!(resolved.is_default);
            assert_eq!(resolved.name, DEFAULT_DOCUMENT_FACTORY);
        }
    }

    #[test]
    fn test_custom_factory() {
        let mut registry = FactoryRegistry::new();
        assert!(registry.register("plain", Plain).is_none());
        let resolved = registry.resolve(Some("plain")).unwrap();
        assert!(!resolved.is_default);
        assert!(!resolved.factory.supports_document_type());
        assert!(resolved.factory.supports_relaxed_checks());
    }

    #[test]
    fn test_replacing_default_is_not_default() {
        let mut registry = FactoryRegistry::new();
        registry.register(DEFAULT_DOCUMENT_FACTORY, Plain);
        assert!(!registry.resolve(None).unwrap().is_default);
    }

    #[test]
    fn test_unknown_and_nonconforming() {
        let mut registry = FactoryRegistry::new();
        registry.register_other("text-sink", "text writer");
        assert_eq!(
            registry.resolve(Some("missing")).unwrap_err(),
            ConfigError::FactoryNotFound("missing".into())
        );
        assert_eq!(
            registry.resolve(Some("text-sink")).unwrap_err(),
            ConfigError::FactoryNotDocument {
                name: "text-sink".into(),
                found: "text writer",
            }
        );
    }
}
