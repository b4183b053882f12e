//! DOM Builder
//!
//! Turns a stream of document events into a tree. The builder owns one
//! insertion cursor and forwards every structural event to the active
//! [`TreeSink`]:
//!
//! ```text
//! DocumentHandler events
//!         |
//!     DomBuilder ── cursor, CDATA / entity / DTD state
//!         |
//!     TreeSink
//!      ├── MaterializedTree  (eager, factory document)
//!      └── DeferredTree      (deferred, node pool)
//! ```
//!
//! The strategy is picked at `reset` from a [`FeatureSnapshot`] and stays
//! fixed until the next `reset`.

pub mod deferred;
pub mod eager;
pub mod sink;


pub use deferred::DeferredTree;
pub use eager::MaterializedTree;
pub use sink::{NodeRef, TreeSink};

use crate::config::{register_builder_features, Configuration, FeatureSnapshot, ParserConfiguration};
use crate::deferred::DeferredDocument;
use crate::dom::{Document, DocumentAccess};
use crate::error::{BuildError, ConfigError, DomError, UpstreamError};
use crate::factory::FactoryRegistry;
use crate::sax::{replay, Attributes, DocumentHandler, Locator, QName, SaxEvent};

const LOG_TARGET: &str = "rustyxml_dom::builder";

/// Node construction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Eager,
    Deferred,
}

/// The tree currently being built
#[derive(Debug)]
enum Tree {
    Materialized(MaterializedTree),
    Deferred(DeferredTree),
}

impl Tree {
    fn sink(&mut self) -> &mut dyn TreeSink {
        match self {
            Tree::Materialized(tree) => tree,
            Tree::Deferred(tree) => tree,
        }
    }

    fn sink_ref(&self) -> &dyn TreeSink {
        match self {
            Tree::Materialized(tree) => tree,
            Tree::Deferred(tree) => tree,
        }
    }
}

/// Borrowed view of the most recent tree
#[derive(Debug, Clone, Copy)]
pub enum DocumentRef<'a> {
    Materialized(&'a Document),
    Deferred(&'a DeferredDocument),
}

impl<'a> DocumentRef<'a> {
    pub fn access(self) -> &'a dyn DocumentAccess {
        match self {
            DocumentRef::Materialized(doc) => doc,
            DocumentRef::Deferred(doc) => doc,
        }
    }

    pub fn strategy(self) -> Strategy {
        match self {
            DocumentRef::Materialized(_) => Strategy::Eager,
            DocumentRef::Deferred(_) => Strategy::Deferred,
        }
    }
}

/// A finished tree handed over to the caller
#[derive(Debug)]
pub enum BuiltDocument {
    Materialized(Document),
    Deferred(DeferredDocument),
}

impl BuiltDocument {
    pub fn access(&self) -> &dyn DocumentAccess {
        match self {
            BuiltDocument::Materialized(doc) => doc,
            BuiltDocument::Deferred(doc) => doc,
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            BuiltDocument::Materialized(_) => Strategy::Eager,
            BuiltDocument::Deferred(_) => Strategy::Deferred,
        }
    }

    /// The eager form, expanding a deferred pool if needed
    pub fn into_materialized(self) -> Result<Document, DomError> {
        match self {
            BuiltDocument::Materialized(doc) => Ok(doc),
            BuiltDocument::Deferred(doc) => doc.expand(),
        }
    }
}

/// Event handler that builds a DOM tree
#[derive(Debug)]
pub struct DomBuilder<C: ParserConfiguration = Configuration> {
    config: C,
    registry: FactoryRegistry,
    /// Snapshot taken by the last successful reset
    features: Option<FeatureSnapshot>,
    tree: Option<Tree>,
    cursor: Option<NodeRef>,
    /// CDATA node of the current region, once its first chunk arrived
    open_cdata: Option<NodeRef>,
    in_document: bool,
    in_dtd: bool,
    in_cdata: bool,
}

impl Default for DomBuilder<Configuration> {
    fn default() -> Self {
        Self::new()
    }
}

impl DomBuilder<Configuration> {
    /// Builder over an in-memory configuration with default settings
    pub fn new() -> Self {
        Self::from_parts(Configuration::with_builder_defaults(), FactoryRegistry::new())
    }
}

impl<C: ParserConfiguration> DomBuilder<C> {
    /// Builder over an external configuration store; registers the
    /// builder's features and properties with their defaults
    pub fn with_configuration(mut config: C) -> Result<Self, ConfigError> {
        register_builder_features(&mut config)?;
        Ok(Self::from_parts(config, FactoryRegistry::new()))
    }

    fn from_parts(config: C, registry: FactoryRegistry) -> Self {
        DomBuilder {
            config,
            registry,
            features: None,
            tree: None,
            cursor: None,
            open_cdata: None,
            in_document: false,
            in_dtd: false,
            in_cdata: false,
        }
    }

    pub fn configuration(&self) -> &C {
        &self.config
    }

    /// Changes take effect at the next reset
    pub fn configuration_mut(&mut self) -> &mut C {
        &mut self.config
    }

    pub fn registry(&self) -> &FactoryRegistry {
        &self.registry
    }

    /// Changes take effect at the next reset
    pub fn registry_mut(&mut self) -> &mut FactoryRegistry {
        &mut self.registry
    }

    /// Snapshot read by the last successful reset
    pub fn features(&self) -> Option<&FeatureSnapshot> {
        self.features.as_ref()
    }

    /// Strategy selected by the last successful reset
    pub fn strategy(&self) -> Option<Strategy> {
        self.features.as_ref().map(|f| {
            if f.defer_node_expansion {
                Strategy::Deferred
            } else {
                Strategy::Eager
            }
        })
    }

    /// The most recent tree, complete or not
    pub fn document(&self) -> Option<DocumentRef<'_>> {
        Some(match self.tree.as_ref()? {
            Tree::Materialized(tree) => DocumentRef::Materialized(&tree.document),
            Tree::Deferred(tree) => DocumentRef::Deferred(&tree.document),
        })
    }

    /// Whether the builder is between start and end of document
    pub fn in_document(&self) -> bool {
        self.in_document
    }

    /// Hand the tree over to the caller, leaving the builder without one
    pub fn take_document(&mut self) -> Option<BuiltDocument> {
        let mut tree = self.tree.take()?;
        if self.in_document {
            tree.sink().finish();
        }
        self.cursor = None;
        self.open_cdata = None;
        self.in_document = false;
        self.in_cdata = false;
        Some(match tree {
            Tree::Materialized(tree) => BuiltDocument::Materialized(tree.into_document()),
            Tree::Deferred(tree) => BuiltDocument::Deferred(tree.into_document()),
        })
    }

    /// Reset, replay `events` and hand over the resulting tree
    pub fn build<I>(&mut self, events: I) -> Result<BuiltDocument, BuildError>
    where
        I: IntoIterator<Item = Result<SaxEvent, UpstreamError>>,
    {
        self.reset()?;
        replay(events, &mut *self)?;
        self.take_document()
            .ok_or(BuildError::NoActiveDocument { event: "end_document" })
    }

    /// Sink and cursor for an event that needs an open document
    fn active(&mut self, event: &'static str) -> Result<(&mut dyn TreeSink, NodeRef), BuildError> {
        let cursor = self.cursor.ok_or(BuildError::NoActiveDocument { event })?;
        let tree = self
            .tree
            .as_mut()
            .ok_or(BuildError::NoActiveDocument { event })?;
        Ok((tree.sink(), cursor))
    }

    /// Move the cursor to its parent
    fn ascend(&mut self, event: &'static str) -> Result<(), BuildError> {
        let cursor = self.cursor.ok_or(BuildError::NoActiveDocument { event })?;
        let tree = self
            .tree
            .as_ref()
            .ok_or(BuildError::NoActiveDocument { event })?;
        let parent = tree
            .sink_ref()
            .parent_of(cursor)
            .ok_or(BuildError::Unbalanced { event })?;
        self.cursor = Some(parent);
        Ok(())
    }

    /// Append to the cursor's last child if it is text, else add a text node
    fn coalesce_text(&mut self, text: &str, ignorable: bool, event: &'static str) -> Result<(), BuildError> {
        let (sink, cursor) = self.active(event)?;
        match sink.last_child(cursor) {
            Some(last) if sink.is_text(last) => sink.append_text_data(last, text),
            _ => {
                let node = sink.create_text(text, ignorable);
                sink.append_child(cursor, node)
            }
        }
    }

    /// Append to the open CDATA node, opening one on the first chunk
    fn cdata_text(&mut self, text: &str, event: &'static str) -> Result<(), BuildError> {
        let open = self.open_cdata;
        let (sink, cursor) = self.active(event)?;
        match open {
            Some(node) => sink.append_text_data(node, text),
            None => {
                let node = sink.create_cdata_section(text);
                sink.append_child(cursor, node)?;
                self.open_cdata = Some(node);
                self.cursor = Some(node);
                Ok(())
            }
        }
    }

    fn entity_nodes_enabled(&self) -> bool {
        self.in_document
            && !self.in_dtd
            && self
                .features
                .as_ref()
                .map_or(false, |f| f.create_entity_ref_nodes)
    }
}

impl<C: ParserConfiguration> DocumentHandler for DomBuilder<C> {
    fn reset(&mut self) -> Result<(), BuildError> {
        self.tree = None;
        self.cursor = None;
        self.open_cdata = None;
        self.in_document = false;
        self.in_dtd = false;
        self.in_cdata = false;
        self.features = None;

        let features = FeatureSnapshot::read(&self.config, &self.registry)?;
        log::debug!(
            target: LOG_TARGET,
            "reset: factory={} deferred={} namespaces={} entity_refs={} ignorable_ws={}",
            features.factory.name,
            features.defer_node_expansion,
            features.namespace_aware,
            features.create_entity_ref_nodes,
            features.include_ignorable_whitespace
        );
        self.features = Some(features);
        Ok(())
    }

    fn start_document(&mut self, locator: Option<&Locator>, encoding: Option<&str>) -> Result<(), BuildError> {
        let features = self.features.as_ref().ok_or(BuildError::NotConfigured)?;
        let mut tree = if features.defer_node_expansion {
            Tree::Deferred(DeferredTree::new(features.namespace_aware))
        } else {
            Tree::Materialized(MaterializedTree::new(
                features.factory.factory.as_ref(),
                features.namespace_aware,
            ))
        };
        log::debug!(
            target: LOG_TARGET,
            "start_document: strategy={:?} system_id={:?} encoding={:?}",
            self.strategy(),
            locator.and_then(|l| l.system_id.as_deref()),
            encoding
        );

        self.cursor = Some(tree.sink().document_node());
        self.tree = Some(tree);
        self.open_cdata = None;
        self.in_document = true;
        self.in_cdata = false;
        Ok(())
    }

    fn doctype_decl(
        &mut self,
        root_element: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<(), BuildError> {
        let public_id = public_id.filter(|s| !s.is_empty());
        let system_id = system_id.filter(|s| !s.is_empty());
        let (sink, cursor) = self.active("doctype_decl")?;
        match sink.create_document_type(root_element, public_id, system_id) {
            Some(node) => sink.append_child(cursor, node),
            None => {
                log::trace!(target: LOG_TARGET, "doctype_decl: factory has no doctype support");
                Ok(())
            }
        }
    }

    fn start_dtd(&mut self) -> Result<(), BuildError> {
        self.in_dtd = true;
        Ok(())
    }

    fn end_dtd(&mut self) -> Result<(), BuildError> {
        self.in_dtd = false;
        Ok(())
    }

    fn start_element(&mut self, name: &QName, attributes: &Attributes) -> Result<(), BuildError> {
        log::trace!(target: LOG_TARGET, "start_element {} ({} attributes)", name.raw_name, attributes.len());
        let (sink, cursor) = self.active("start_element")?;
        let element = sink.create_element(name, attributes)?;
        sink.append_child(cursor, element)?;
        self.cursor = Some(element);
        Ok(())
    }

    fn end_element(&mut self, name: &QName) -> Result<(), BuildError> {
        log::trace!(target: LOG_TARGET, "end_element {}", name.raw_name);
        self.ascend("end_element")
    }

    fn characters(&mut self, text: &str) -> Result<(), BuildError> {
        if self.in_cdata {
            return self.cdata_text(text, "characters");
        }
        if self.in_dtd {
            return Ok(());
        }
        self.coalesce_text(text, false, "characters")
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), BuildError> {
        let include = self
            .features
            .as_ref()
            .map_or(false, |f| f.include_ignorable_whitespace);
        if !include || self.in_dtd {
            return Ok(());
        }
        if self.in_cdata {
            return self.cdata_text(text, "ignorable_whitespace");
        }
        self.coalesce_text(text, true, "ignorable_whitespace")
    }

    fn start_cdata(&mut self) -> Result<(), BuildError> {
        self.in_cdata = true;
        self.open_cdata = None;
        Ok(())
    }

    fn end_cdata(&mut self) -> Result<(), BuildError> {
        self.in_cdata = false;
        if self.open_cdata.take().is_some() {
            self.ascend("end_cdata")?;
        }
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), BuildError> {
        if self.in_dtd {
            return Ok(());
        }
        let (sink, cursor) = self.active("comment")?;
        let node = sink.create_comment(text);
        sink.append_child(cursor, node)
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), BuildError> {
        if self.in_dtd {
            return Ok(());
        }
        let (sink, cursor) = self.active("processing_instruction")?;
        let node = sink.create_processing_instruction(target, data);
        sink.append_child(cursor, node)
    }

    fn start_entity(
        &mut self,
        name: &str,
        _public_id: Option<&str>,
        _system_id: Option<&str>,
        _base_system_id: Option<&str>,
        _encoding: Option<&str>,
    ) -> Result<(), BuildError> {
        if !self.entity_nodes_enabled() {
            log::trace!(target: LOG_TARGET, "start_entity {} ignored", name);
            return Ok(());
        }
        let (sink, cursor) = self.active("start_entity")?;
        let node = sink.create_entity_reference(name);
        sink.append_child(cursor, node)?;
        self.cursor = Some(node);
        Ok(())
    }

    fn end_entity(&mut self, name: &str) -> Result<(), BuildError> {
        if !self.entity_nodes_enabled() {
            log::trace!(target: LOG_TARGET, "end_entity {} ignored", name);
            return Ok(());
        }
        self.ascend("end_entity")
    }

    fn end_document(&mut self) -> Result<(), BuildError> {
        let tree = self
            .tree
            .as_mut()
            .ok_or(BuildError::NoActiveDocument { event: "end_document" })?;
        if self.in_document {
            tree.sink().finish();
        }
        self.in_document = false;
        self.cursor = None;
        self.open_cdata = None;
        self.in_cdata = false;
        log::debug!(
            target: LOG_TARGET,
            "end_document: {} nodes",
            self.document().map_or(0, |d| d.access().node_count())
        );
        Ok(())
    }
}
