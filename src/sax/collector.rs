//! Event Recorder
//!
//! Implements DocumentHandler to capture events for later replay into a
//! builder, plus the replay driver itself.

use super::events::{Attributes, Locator, QName, SaxEvent};
use super::DocumentHandler;
use crate::error::{BuildError, UpstreamError};

/// Handler that records every event it receives as an owned [`SaxEvent`]
#[derive(Debug, Default)]
pub struct EventRecorder {
    /// Recorded events
    events: Vec<SaxEvent>,
    /// Number of times `reset` was called
    resets: usize,
}

impl EventRecorder {
    /// Create a new recorder
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(256),
            resets: 0,
        }
    }

    /// Take the recorded events
    pub fn take_events(&mut self) -> Vec<SaxEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get the recorded events as a slice
    pub fn events(&self) -> &[SaxEvent] {
        &self.events
    }

    /// Get number of recorded events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn reset_count(&self) -> usize {
        self.resets
    }

    #[inline]
    fn record(&mut self, event: SaxEvent) -> Result<(), BuildError> {
        self.events.push(event);
        Ok(())
    }
}

fn owned(s: Option<&str>) -> Option<String> {
    s.map(str::to_owned)
}

impl DocumentHandler for EventRecorder {
    fn reset(&mut self) -> Result<(), BuildError> {
        self.events.clear();
        self.resets += 1;
        Ok(())
    }

    fn start_document(
        &mut self,
        locator: Option<&Locator>,
        encoding: Option<&str>,
    ) -> Result<(), BuildError> {
        self.record(SaxEvent::StartDocument {
            locator: locator.cloned(),
            encoding: owned(encoding),
        })
    }

    fn xml_decl(
        &mut self,
        version: &str,
        encoding: Option<&str>,
        standalone: Option<&str>,
    ) -> Result<(), BuildError> {
        self.record(SaxEvent::XmlDecl {
            version: version.to_owned(),
            encoding: owned(encoding),
            standalone: owned(standalone),
        })
    }

    fn doctype_decl(
        &mut self,
        root_element: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<(), BuildError> {
        self.record(SaxEvent::doctype(root_element, public_id, system_id))
    }

    fn start_dtd(&mut self) -> Result<(), BuildError> {
        self.record(SaxEvent::StartDtd)
    }

    fn end_dtd(&mut self) -> Result<(), BuildError> {
        self.record(SaxEvent::EndDtd)
    }

    fn start_element(&mut self, name: &QName, attributes: &Attributes) -> Result<(), BuildError> {
        self.record(SaxEvent::StartElement {
            name: name.clone(),
            attributes: attributes.clone(),
        })
    }

    // Recorded as one event so replay reproduces the scanner's own shape
    fn empty_element(&mut self, name: &QName, attributes: &Attributes) -> Result<(), BuildError> {
        self.record(SaxEvent::EmptyElement {
            name: name.clone(),
            attributes: attributes.clone(),
        })
    }

    fn end_element(&mut self, name: &QName) -> Result<(), BuildError> {
        self.record(SaxEvent::EndElement { name: name.clone() })
    }

    fn characters(&mut self, text: &str) -> Result<(), BuildError> {
        self.record(SaxEvent::characters(text))
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), BuildError> {
        self.record(SaxEvent::ignorable_whitespace(text))
    }

    fn start_cdata(&mut self) -> Result<(), BuildError> {
        self.record(SaxEvent::StartCData)
    }

    fn end_cdata(&mut self) -> Result<(), BuildError> {
        self.record(SaxEvent::EndCData)
    }

    fn comment(&mut self, text: &str) -> Result<(), BuildError> {
        self.record(SaxEvent::comment(text))
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), BuildError> {
        self.record(SaxEvent::processing_instruction(target, data))
    }

    fn start_entity(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        base_system_id: Option<&str>,
        encoding: Option<&str>,
    ) -> Result<(), BuildError> {
        self.record(SaxEvent::StartEntity {
            name: name.to_owned(),
            public_id: owned(public_id),
            system_id: owned(system_id),
            base_system_id: owned(base_system_id),
            encoding: owned(encoding),
        })
    }

    fn end_entity(&mut self, name: &str) -> Result<(), BuildError> {
        self.record(SaxEvent::end_entity(name))
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<(), BuildError> {
        self.record(SaxEvent::StartPrefixMapping {
            prefix: prefix.to_owned(),
            uri: uri.to_owned(),
        })
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<(), BuildError> {
        self.record(SaxEvent::EndPrefixMapping {
            prefix: prefix.to_owned(),
        })
    }

    fn end_document(&mut self) -> Result<(), BuildError> {
        self.record(SaxEvent::EndDocument)
    }
}

/// Drive a handler from a stream of events.
///
/// Stops at the first failure. An upstream error is returned unchanged as
/// [`BuildError::Upstream`]; events delivered before it stay applied.
pub fn replay<H, I>(events: I, handler: &mut H) -> Result<(), BuildError>
where
    H: DocumentHandler + ?Sized,
    I: IntoIterator<Item = Result<SaxEvent, UpstreamError>>,
{
    for event in events {
        let event = event?;
        log::trace!(target: "rustyxml_dom::sax", "replay {}", event.label());
        event.dispatch(handler)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(events: Vec<SaxEvent>) -> impl Iterator<Item = Result<SaxEvent, UpstreamError>> {
        events.into_iter().map(Ok)
    }

    #[test]
    fn test_record_simple() {
        let mut recorder = EventRecorder::new();
        let events = vec![
            SaxEvent::start_document(),
            SaxEvent::start_element("a"),
            SaxEvent::characters("x"),
            SaxEvent::end_element("a"),
            SaxEvent::EndDocument,
        ];
        replay(ok(events.clone()), &mut recorder).unwrap();
        assert_eq!(recorder.events(), events.as_slice());
        assert_eq!(recorder.event_count(), 5);
    }

    #[test]
    fn test_empty_element_recorded_once() {
        let mut recorder = EventRecorder::new();
        recorder
            .empty_element(&QName::new("br"), &Attributes::new())
            .unwrap();
        assert_eq!(recorder.event_count(), 1);
        assert_eq!(recorder.events()[0].label(), "empty_element");
    }

    #[test]
    fn test_replay_stops_at_upstream_error() {
        let mut recorder = EventRecorder::new();
        let events = vec![
            Ok(SaxEvent::start_document()),
            Ok(SaxEvent::start_element("a")),
            Err(UpstreamError::new("unterminated tag")),
            Ok(SaxEvent::end_element("a")),
        ];
        let err = replay(events, &mut recorder).unwrap_err();
        assert_eq!(err, BuildError::Upstream(UpstreamError::new("unterminated tag")));
        // Events before the failure stay recorded, nothing after it
        assert_eq!(recorder.event_count(), 2);
    }

    #[test]
    fn test_reset_clears() {
        let mut recorder = EventRecorder::new();
        recorder.comment("c").unwrap();
        recorder.reset().unwrap();
        assert_eq!(recorder.event_count(), 0);
        assert_eq!(recorder.reset_count(), 1);
        let taken = {
            recorder.comment("d").unwrap();
            recorder.take_events()
        };
        assert_eq!(taken, vec![SaxEvent::comment("d")]);
        assert_eq!(recorder.event_count(), 0);
    }
}
