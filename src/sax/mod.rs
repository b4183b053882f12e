//! SAX (Simple API for XML) Module
//!
//! The inbound event contract between an upstream scanner and a tree
//! builder.
//!
//! ## Architecture
//!
//! ```text
//! Scanner/Validator ---> DocumentHandler ---> DomBuilder ---> Document
//!        |                                        |
//!        v                                        v
//!   EventRecorder (SaxEvent[]) --- replay --> DeferredDocument
//! ```
//!
//! Events arrive synchronously and in document order. Every handler method
//! may fail; failures are propagated to the caller and never swallowed.

pub mod collector;
pub mod events;

pub use collector::{replay, EventRecorder};
pub use events::{split_qname, Attribute, Attributes, Locator, QName, SaxEvent};

use crate::error::BuildError;

/// Receiver of document-structure events
///
/// Only the structural events are required. Declaration and prefix-mapping
/// events default to no-ops, and `empty_element` defaults to a start/end
/// pair.
pub trait DocumentHandler {
    /// Prepare for a new document; called before any other event
    fn reset(&mut self) -> Result<(), BuildError>;

    fn start_document(
        &mut self,
        locator: Option<&Locator>,
        encoding: Option<&str>,
    ) -> Result<(), BuildError>;

    fn xml_decl(
        &mut self,
        _version: &str,
        _encoding: Option<&str>,
        _standalone: Option<&str>,
    ) -> Result<(), BuildError> {
        Ok(())
    }

    fn doctype_decl(
        &mut self,
        root_element: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<(), BuildError>;

    /// The scanner entered the document type definition
    fn start_dtd(&mut self) -> Result<(), BuildError>;

    /// The scanner left the document type definition
    fn end_dtd(&mut self) -> Result<(), BuildError>;

    fn start_element(&mut self, name: &QName, attributes: &Attributes) -> Result<(), BuildError>;

    fn empty_element(&mut self, name: &QName, attributes: &Attributes) -> Result<(), BuildError> {
        self.start_element(name, attributes)?;
        self.end_element(name)
    }

    fn end_element(&mut self, name: &QName) -> Result<(), BuildError>;

    fn characters(&mut self, text: &str) -> Result<(), BuildError>;

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), BuildError>;

    fn start_cdata(&mut self) -> Result<(), BuildError>;

    fn end_cdata(&mut self) -> Result<(), BuildError>;

    fn comment(&mut self, text: &str) -> Result<(), BuildError>;

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), BuildError>;

    fn start_entity(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        base_system_id: Option<&str>,
        encoding: Option<&str>,
    ) -> Result<(), BuildError>;

    fn end_entity(&mut self, name: &str) -> Result<(), BuildError>;

    fn start_prefix_mapping(&mut self, _prefix: &str, _uri: &str) -> Result<(), BuildError> {
        Ok(())
    }

    fn end_prefix_mapping(&mut self, _prefix: &str) -> Result<(), BuildError> {
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), BuildError>;
}
