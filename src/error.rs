//! Error types
//!
//! Configuration failures are raised at `reset`, upstream failures are
//! passed through untouched, and tree errors only surface when a document
//! keeps its hierarchy checks on during construction.

use thiserror::Error;

use crate::dom::{NodeId, NodeKind};
use crate::sax::Locator;

/// Configuration could not be read or the document factory is unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("feature not recognized: {0}")]
    FeatureNotRecognized(String),

    #[error("property not recognized: {0}")]
    PropertyNotRecognized(String),

    #[error("property {id} has the wrong type, expected {expected}")]
    PropertyType { id: String, expected: &'static str },

    #[error("document factory \"{0}\" not found")]
    FactoryNotFound(String),

    #[error("document factory \"{name}\" is a {found}, not a document factory")]
    FactoryNotDocument { name: String, found: &'static str },
}

/// Failure reported by the event source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", location_suffix(.locator))]
pub struct UpstreamError {
    pub message: String,
    pub locator: Option<Locator>,
}

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        UpstreamError {
            message: message.into(),
            locator: None,
        }
    }

    pub fn at(message: impl Into<String>, locator: Locator) -> Self {
        UpstreamError {
            message: message.into(),
            locator: Some(locator),
        }
    }
}

fn location_suffix(locator: &Option<Locator>) -> String {
    match locator {
        Some(loc) => format!(" at line {}, column {}", loc.line, loc.column),
        None => String::new(),
    }
}

/// Structural error raised by an eager [`Document`](crate::dom::Document)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0} does not exist in this document")]
    NotFound(NodeId),

    #[error("a {child:?} node may not be inserted under a {parent:?} node")]
    HierarchyRequest { parent: NodeKind, child: NodeKind },

    #[error("node {0} already has a parent")]
    InUse(NodeId),

    #[error("node {0} does not hold character data")]
    NotCharacterData(NodeId),

    #[error("node {0} is not an element")]
    NotElement(NodeId),
}

/// Any failure surfaced by the builder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("tree construction failed: {0}")]
    Tree(#[from] DomError),

    #[error("start_document called without a successful reset")]
    NotConfigured,

    #[error("{event} received outside of a document")]
    NoActiveDocument { event: &'static str },

    #[error("{event} has no open node to close")]
    Unbalanced { event: &'static str },
}

impl BuildError {
    /// True for errors raised while reading configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, BuildError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_with_location() {
        let err = UpstreamError::at(
            "unexpected end of input",
            Locator {
                line: 3,
                column: 7,
                system_id: None,
            },
        );
        assert_eq!(err.to_string(), "unexpected end of input at line 3, column 7");
        assert_eq!(UpstreamError::new("boom").to_string(), "boom");
    }

    #[test]
    fn test_upstream_passes_through_transparently() {
        let err: BuildError = UpstreamError::new("bad token").into();
        assert_eq!(err.to_string(), "bad token");
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_configuration_classification() {
        let err: BuildError = ConfigError::FactoryNotFound("x".into()).into();
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "configuration error: document factory \"x\" not found"
        );
    }
}
