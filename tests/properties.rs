//! Property-based tests for the DOM builder
//!
//! Random but well-formed event streams are replayed into both
//! construction strategies; the resulting trees must obey the coalescing
//! and suppression rules for ANY stream, and both strategies must agree.

use proptest::prelude::*;
use rustyxml_dom::config::{
    CREATE_ENTITY_REF_NODES, DEFER_NODE_EXPANSION, INCLUDE_IGNORABLE_WHITESPACE,
};
use rustyxml_dom::{
    BuiltDocument, Configuration, DocumentAccess, DomBuilder, NodeId, NodeKind,
    ParserConfiguration, SaxEvent, Strategy as BuildStrategy,
};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 128,
        max_shrink_iters: 200,
        ..ProptestConfig::default()
    }
}

const BOTH: [BuildStrategy; 2] = [BuildStrategy::Eager, BuildStrategy::Deferred];

// =============================================================================
// Test Helpers
// =============================================================================

/// One step of a generated document body
#[derive(Debug, Clone)]
enum Token {
    Text(String),
    Space(String),
    CData(Vec<String>),
    Comment(String),
    Pi(String),
    Open(String),
    Close,
    EntityOpen(String),
    EntityClose,
}

fn token() -> impl Strategy<Value = Token> {
    prop_oneof![
        4 => "[a-z&<> ]{0,6}".prop_map(Token::Text),
        2 => "[ \n\t]{1,3}".prop_map(Token::Space),
        1 => prop::collection::vec("[a-z\\]]{0,4}", 0..4).prop_map(Token::CData),
        1 => "[a-z ]{0,6}".prop_map(Token::Comment),
        1 => "[a-z]{1,4}".prop_map(Token::Pi),
        2 => "[a-z]{1,3}".prop_map(Token::Open),
        2 => Just(Token::Close),
        1 => "[a-z]{1,3}".prop_map(Token::EntityOpen),
        1 => Just(Token::EntityClose),
    ]
}

fn tokens() -> impl Strategy<Value = Vec<Token>> {
    prop::collection::vec(token(), 0..40)
}

enum Open {
    Element(String),
    Entity(String),
}

fn close(open: Open) -> SaxEvent {
    match open {
        Open::Element(name) => SaxEvent::end_element(&name),
        Open::Entity(name) => SaxEvent::end_entity(&name),
    }
}

/// Balanced event stream for `<root>` holding the tokens
fn events(tokens: &[Token]) -> Vec<SaxEvent> {
    let mut out = vec![SaxEvent::start_document(), SaxEvent::start_element("root")];
    let mut stack = Vec::new();
    for token in tokens {
        match token {
            Token::Text(s) => out.push(SaxEvent::characters(s)),
            Token::Space(s) => out.push(SaxEvent::ignorable_whitespace(s)),
            Token::CData(chunks) => {
                out.push(SaxEvent::StartCData);
                out.extend(chunks.iter().map(|c| SaxEvent::characters(c)));
                out.push(SaxEvent::EndCData);
            }
            Token::Comment(s) => out.push(SaxEvent::comment(s)),
            Token::Pi(target) => out.push(SaxEvent::processing_instruction(target, "data")),
            Token::Open(name) => {
                out.push(SaxEvent::start_element(name));
                stack.push(Open::Element(name.clone()));
            }
            Token::EntityOpen(name) => {
                out.push(SaxEvent::start_entity(name));
                stack.push(Open::Entity(name.clone()));
            }
            Token::Close | Token::EntityClose => {
                if let Some(open) = stack.pop() {
                    out.push(close(open));
                }
            }
        }
    }
    while let Some(open) = stack.pop() {
        out.push(close(open));
    }
    out.push(SaxEvent::end_element("root"));
    out.push(SaxEvent::EndDocument);
    out
}

/// Character data the stream carries, in order
fn expected_text(tokens: &[Token], include_whitespace: bool) -> String {
    let mut text = String::new();
    for token in tokens {
        match token {
            Token::Text(s) => text.push_str(s),
            Token::Space(s) if include_whitespace => text.push_str(s),
            Token::CData(chunks) => chunks.iter().for_each(|c| text.push_str(c)),
            _ => {}
        }
    }
    text
}

fn build(
    strategy: BuildStrategy,
    configure: impl FnOnce(&mut Configuration),
    events: Vec<SaxEvent>,
) -> BuiltDocument {
    let mut builder = DomBuilder::new();
    builder
        .configuration_mut()
        .set_feature(DEFER_NODE_EXPANSION, strategy == BuildStrategy::Deferred)
        .unwrap();
    configure(builder.configuration_mut());
    builder.build(events.into_iter().map(Ok)).unwrap()
}

fn outline(doc: &dyn DocumentAccess) -> Vec<String> {
    doc.descendants_vec(doc.document_node())
        .into_iter()
        .map(|id| {
            let mut depth = 0;
            let mut up = doc.parent_node(id);
            while let Some(p) = up {
                depth += 1;
                up = doc.parent_node(p);
            }
            format!(
                "{depth} {:?} {:?} {:?} {}",
                doc.node_kind(id),
                doc.node_name(id),
                doc.node_value(id),
                doc.is_ignorable_whitespace(id)
            )
        })
        .collect()
}

fn count_kind(doc: &dyn DocumentAccess, kind: NodeKind) -> usize {
    doc.descendants_vec(doc.document_node())
        .into_iter()
        .filter(|&id| doc.node_kind(id) == Some(kind))
        .count()
}

fn root_children(doc: &dyn DocumentAccess) -> Vec<NodeId> {
    doc.document_element()
        .map(|root| doc.children_vec(root))
        .unwrap_or_default()
}

// =============================================================================
// Property: Coalescing
// =============================================================================

proptest! {
    #![proptest_config(config())]

    /// N consecutive character events become one text node
    #[test]
    fn characters_make_one_text_node(chunks in prop::collection::vec("[a-z <&]{0,8}", 1..12)) {
        let body: Vec<Token> = chunks.iter().cloned().map(Token::Text).collect();
        let expected = chunks.concat();
        for strategy in BOTH {
            let built = build(strategy, |_| {}, events(&body));
            let doc = built.access();
            let children = root_children(doc);
            prop_assert_eq!(children.len(), 1);
            prop_assert_eq!(doc.node_kind(children[0]), Some(NodeKind::Text));
            prop_assert_eq!(doc.node_value(children[0]), Some(expected.as_str()));
        }
    }

    /// A CDATA region becomes one CDATA node and leaves the cursor where it was
    #[test]
    fn cdata_region_makes_one_node(chunks in prop::collection::vec("[a-z\\]>]{0,8}", 1..12)) {
        let body = vec![Token::CData(chunks.clone()), Token::Text("after".into())];
        let expected = chunks.concat();
        for strategy in BOTH {
            let built = build(strategy, |_| {}, events(&body));
            let doc = built.access();
            let children = root_children(doc);
            prop_assert_eq!(children.len(), 2);
            prop_assert_eq!(doc.node_kind(children[0]), Some(NodeKind::CData));
            prop_assert_eq!(doc.node_value(children[0]), Some(expected.as_str()));
            prop_assert_eq!(doc.node_value(children[1]), Some("after"));
        }
    }

    /// Text siblings are never adjacent
    #[test]
    fn no_adjacent_text_siblings(body in tokens()) {
        for strategy in BOTH {
            let built = build(strategy, |_| {}, events(&body));
            let doc = built.access();
            let mut parents = vec![doc.document_node()];
            parents.extend(doc.descendants_vec(doc.document_node()));
            for parent in parents {
                let kinds: Vec<_> = doc
                    .children_vec(parent)
                    .into_iter()
                    .map(|c| doc.node_kind(c))
                    .collect();
                for pair in kinds.windows(2) {
                    prop_assert!(
                        !(pair[0] == Some(NodeKind::Text) && pair[1] == Some(NodeKind::Text)),
                        "adjacent text nodes under {}", parent
                    );
                }
            }
        }
    }

    /// All character data survives, in order
    #[test]
    fn text_content_preserved(body in tokens()) {
        for strategy in BOTH {
            let built = build(strategy, |_| {}, events(&body));
            let doc = built.access();
            prop_assert_eq!(doc.text_content(doc.document_node()), expected_text(&body, true));
        }
    }
}

// =============================================================================
// Property: Suppression
// =============================================================================

proptest! {
    #![proptest_config(config())]

    /// No entity reference nodes when the feature is off
    #[test]
    fn no_entity_references_when_disabled(body in tokens()) {
        for strategy in BOTH {
            let built = build(
                strategy,
                |c| c.set_feature(CREATE_ENTITY_REF_NODES, false).unwrap(),
                events(&body),
            );
            let doc = built.access();
            prop_assert_eq!(count_kind(doc, NodeKind::EntityReference), 0);
            prop_assert_eq!(doc.text_content(doc.document_node()), expected_text(&body, true));
        }
    }

    /// Nothing inside the DTD produces nodes
    #[test]
    fn dtd_content_produces_nothing(body in tokens()) {
        let mut stream = vec![SaxEvent::start_document(), SaxEvent::StartDtd];
        for token in &body {
            match token {
                Token::Text(s) => stream.push(SaxEvent::characters(s)),
                Token::Space(s) => stream.push(SaxEvent::ignorable_whitespace(s)),
                Token::Comment(s) => stream.push(SaxEvent::comment(s)),
                Token::Pi(t) => stream.push(SaxEvent::processing_instruction(t, "")),
                Token::EntityOpen(n) => stream.push(SaxEvent::start_entity(n)),
                Token::EntityClose | Token::Close => stream.push(SaxEvent::end_entity("x")),
                Token::Open(_) | Token::CData(_) => {}
            }
        }
        stream.extend([
            SaxEvent::EndDtd,
            SaxEvent::start_element("root"),
            SaxEvent::end_element("root"),
            SaxEvent::EndDocument,
        ]);

        for strategy in BOTH {
            let built = build(strategy, |_| {}, stream.clone());
            let doc = built.access();
            let top: Vec<_> = doc
                .children_vec(doc.document_node())
                .into_iter()
                .map(|c| doc.node_kind(c))
                .collect();
            prop_assert_eq!(top, vec![Some(NodeKind::Element)]);
            prop_assert!(root_children(doc).is_empty());
        }
    }

    /// With ignorable whitespace excluded the events mutate nothing
    #[test]
    fn excluded_whitespace_mutates_nothing(body in tokens()) {
        let with_space = events(&body);
        let without_space: Vec<_> = with_space
            .iter()
            .filter(|e| !matches!(e, SaxEvent::IgnorableWhitespace(_)))
            .cloned()
            .collect();

        for strategy in BOTH {
            let excluded = build(
                strategy,
                |c| c.set_feature(INCLUDE_IGNORABLE_WHITESPACE, false).unwrap(),
                with_space.clone(),
            );
            let reference = build(strategy, |_| {}, without_space.clone());
            prop_assert_eq!(outline(excluded.access()), outline(reference.access()));
        }
    }
}

// =============================================================================
// Property: Strategy Equivalence
// =============================================================================

proptest! {
    #![proptest_config(config())]

    /// Eager, deferred and expanded-deferred trees are the same tree
    #[test]
    fn strategies_agree(body in tokens(), entity_refs in any::<bool>()) {
        let configure = |c: &mut Configuration| {
            c.set_feature(CREATE_ENTITY_REF_NODES, entity_refs).unwrap()
        };
        let eager = build(BuildStrategy::Eager, configure, events(&body));
        let deferred = build(BuildStrategy::Deferred, configure, events(&body));
        prop_assert_eq!(eager.strategy(), BuildStrategy::Eager);
        prop_assert_eq!(deferred.strategy(), BuildStrategy::Deferred);

        let eager_outline = outline(eager.access());
        prop_assert_eq!(&eager_outline, &outline(deferred.access()));

        let expanded = deferred.into_materialized().unwrap();
        prop_assert_eq!(&eager_outline, &outline(&expanded));
    }
}
