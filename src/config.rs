//! Configuration bridge
//!
//! Features and properties live in an external store behind
//! [`ParserConfiguration`]. The builder registers the ids it understands
//! once, then takes an immutable [`FeatureSnapshot`] at every `reset`.

use std::collections::{HashMap, HashSet};

use crate::error::ConfigError;
use crate::factory::{FactoryRegistry, ResolvedFactory, DEFAULT_DOCUMENT_FACTORY};

/// Namespace processing, owned by the upstream scanner
pub const NAMESPACES: &str = "http://xml.org/sax/features/namespaces";
/// Create entity reference nodes for general entity expansions
pub const CREATE_ENTITY_REF_NODES: &str =
    "http://apache.org/xml/features/dom/create-entity-ref-nodes";
/// Keep ignorable whitespace as flagged text nodes
pub const INCLUDE_IGNORABLE_WHITESPACE: &str =
    "http://apache.org/xml/features/dom/include-ignorable-whitespace";
/// Build into the deferred node pool
pub const DEFER_NODE_EXPANSION: &str = "http://apache.org/xml/features/dom/defer-node-expansion";
/// Name of the document factory, resolved through a [`FactoryRegistry`]
pub const DOCUMENT_FACTORY: &str = "http://apache.org/xml/properties/dom/document-class-name";

/// Features the builder registers
pub const BUILDER_FEATURES: [&str; 3] = [
    CREATE_ENTITY_REF_NODES,
    INCLUDE_IGNORABLE_WHITESPACE,
    DEFER_NODE_EXPANSION,
];

/// Properties the builder registers
pub const BUILDER_PROPERTIES: [&str; 1] = [DOCUMENT_FACTORY];

/// A property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_owned())
    }
}

/// External feature and property store
pub trait ParserConfiguration {
    fn add_recognized_features(&mut self, ids: &[&str]);

    fn add_recognized_properties(&mut self, ids: &[&str]);

    fn set_feature(&mut self, id: &str, value: bool) -> Result<(), ConfigError>;

    /// Value of a recognized feature; unset features read as false
    fn get_feature(&self, id: &str) -> Result<bool, ConfigError>;

    fn set_property(&mut self, id: &str, value: PropertyValue) -> Result<(), ConfigError>;

    /// Value of a recognized property, if one was set
    fn get_property(&self, id: &str) -> Result<Option<PropertyValue>, ConfigError>;
}

/// In-memory configuration
#[derive(Debug, Clone)]
pub struct Configuration {
    recognized_features: HashSet<String>,
    recognized_properties: HashSet<String>,
    features: HashMap<String, bool>,
    properties: HashMap<String, PropertyValue>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl Configuration {
    /// A store that only knows the namespaces feature, enabled
    pub fn new() -> Self {
        let mut config = Configuration {
            recognized_features: HashSet::new(),
            recognized_properties: HashSet::new(),
            features: HashMap::new(),
            properties: HashMap::new(),
        };
        config.recognized_features.insert(NAMESPACES.to_owned());
        config.features.insert(NAMESPACES.to_owned(), true);
        config
    }

    /// A store with the builder's features and properties registered at
    /// their defaults
    pub fn with_builder_defaults() -> Self {
        let mut config = Self::new();
        config.add_recognized_features(&BUILDER_FEATURES);
        config.add_recognized_properties(&BUILDER_PROPERTIES);
        for id in BUILDER_FEATURES {
            config.features.insert(id.to_owned(), true);
        }
        config
            .properties
            .insert(DOCUMENT_FACTORY.to_owned(), DEFAULT_DOCUMENT_FACTORY.into());
        config
    }
}

impl ParserConfiguration for Configuration {
    fn add_recognized_features(&mut self, ids: &[&str]) {
        self.recognized_features
            .extend(ids.iter().map(|id| (*id).to_owned()));
    }

    fn add_recognized_properties(&mut self, ids: &[&str]) {
        self.recognized_properties
            .extend(ids.iter().map(|id| (*id).to_owned()));
    }

    fn set_feature(&mut self, id: &str, value: bool) -> Result<(), ConfigError> {
        if !self.recognized_features.contains(id) {
            return Err(ConfigError::FeatureNotRecognized(id.to_owned()));
        }
        self.features.insert(id.to_owned(), value);
        Ok(())
    }

    fn get_feature(&self, id: &str) -> Result<bool, ConfigError> {
        if !self.recognized_features.contains(id) {
            return Err(ConfigError::FeatureNotRecognized(id.to_owned()));
        }
        Ok(self.features.get(id).copied().unwrap_or(false))
    }

    fn set_property(&mut self, id: &str, value: PropertyValue) -> Result<(), ConfigError> {
        if !self.recognized_properties.contains(id) {
            return Err(ConfigError::PropertyNotRecognized(id.to_owned()));
        }
        self.properties.insert(id.to_owned(), value);
        Ok(())
    }

    fn get_property(&self, id: &str) -> Result<Option<PropertyValue>, ConfigError> {
        if !self.recognized_properties.contains(id) {
            return Err(ConfigError::PropertyNotRecognized(id.to_owned()));
        }
        Ok(self.properties.get(id).cloned())
    }
}

/// Register the builder's features and properties and set their defaults
pub fn register_builder_features<C>(config: &mut C) -> Result<(), ConfigError>
where
    C: ParserConfiguration + ?Sized,
{
    config.add_recognized_features(&BUILDER_FEATURES);
    config.add_recognized_properties(&BUILDER_PROPERTIES);
    for id in BUILDER_FEATURES {
        config.set_feature(id, true)?;
    }
    config.set_property(DOCUMENT_FACTORY, DEFAULT_DOCUMENT_FACTORY.into())
}

/// Configuration values fixed for one parse
#[derive(Debug, Clone)]
pub struct FeatureSnapshot {
    pub create_entity_ref_nodes: bool,
    pub include_ignorable_whitespace: bool,
    /// Effective value: false whenever a non-default factory is configured
    pub defer_node_expansion: bool,
    pub namespace_aware: bool,
    pub factory: ResolvedFactory,
}

impl FeatureSnapshot {
    /// Read every builder setting and resolve the document factory
    pub fn read<C>(config: &C, registry: &FactoryRegistry) -> Result<Self, ConfigError>
    where
        C: ParserConfiguration + ?Sized,
    {
        let name = match config.get_property(DOCUMENT_FACTORY)? {
            None => None,
            Some(PropertyValue::Text(name)) => Some(name),
            Some(PropertyValue::Flag(_)) => {
                return Err(ConfigError::PropertyType {
                    id: DOCUMENT_FACTORY.to_owned(),
                    expected: "factory name",
                })
            }
        };
        let factory = registry.resolve(name.as_deref())?;
        let defer_requested = config.get_feature(DEFER_NODE_EXPANSION)?;

        Ok(FeatureSnapshot {
            create_entity_ref_nodes: config.get_feature(CREATE_ENTITY_REF_NODES)?,
            include_ignorable_whitespace: config.get_feature(INCLUDE_IGNORABLE_WHITESPACE)?,
            defer_node_expansion: defer_requested && factory.is_default,
            namespace_aware: config.get_feature(NAMESPACES)?,
            factory,
        })
    }
}
