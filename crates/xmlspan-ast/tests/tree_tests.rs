//! Tests for tree construction and navigation helpers.

use strum::IntoEnumIterator;
use xmlspan_ast::{
    AttributeData, CommentData, CommentKind, ElementData, NodeId, NodeKind, QuoteKind,
    SourceLocation, Span, Token, TokenKind, XmlTree,
};

/// Helper to create an element node and return its NodeId.
fn alloc_element(tree: &mut XmlTree, tag: &str) -> NodeId {
    tree.alloc(
        NodeKind::Element(ElementData::new(tag.to_string())),
        Span::default(),
        SourceLocation::default(),
    )
}

fn alloc_text(tree: &mut XmlTree, text: &str) -> NodeId {
    tree.alloc(
        NodeKind::Text(text.to_string()),
        Span::default(),
        SourceLocation::default(),
    )
}

fn token(kind: TokenKind, value: &str, start: usize) -> Token {
    Token::new(
        kind,
        value.to_string(),
        Span::new(start, start + value.len()),
        SourceLocation::default(),
    )
}

// ========== append_child ==========

#[test]
fn test_append_child_links_siblings() {
    let mut tree = XmlTree::new();
    let parent = alloc_element(&mut tree, "record");
    tree.set_root(parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_text(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.parent(b), Some(parent));
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(c), Some(b));
    assert_eq!(tree.next_sibling(c), None);
    assert_eq!(tree.first_child(parent), Some(a));
    assert_eq!(tree.last_child(parent), Some(c));
}

#[test]
fn test_preceding_siblings_walk_backwards() {
    let mut tree = XmlTree::new();
    let parent = alloc_element(&mut tree, "record");
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    let preceding: Vec<NodeId> = tree.preceding_siblings(c).collect();
    assert_eq!(preceding, vec![b, a]);
}

// ========== ancestors / descendants ==========

#[test]
fn test_ancestors_and_descendants() {
    let mut tree = XmlTree::new();
    let root = alloc_element(&mut tree, "root");
    let mid = alloc_element(&mut tree, "mid");
    let leaf = alloc_text(&mut tree, "leaf");
    let sibling = alloc_element(&mut tree, "sibling");
    tree.append_child(root, mid);
    tree.append_child(mid, leaf);
    tree.append_child(root, sibling);

    let ancestors: Vec<NodeId> = tree.ancestors(leaf).collect();
    assert_eq!(ancestors, vec![mid, root]);
    assert!(tree.is_descendant_of(leaf, root));
    assert!(!tree.is_descendant_of(sibling, mid));

    let order: Vec<NodeId> = tree.descendants(root).collect();
    assert_eq!(order, vec![root, mid, leaf, sibling]);
    assert_eq!(tree.text_content(root), "leaf");
}

// ========== attributes ==========

#[test]
fn test_attach_attribute_fills_side_table() {
    let mut tree = XmlTree::new();
    let element = alloc_element(&mut tree, "entityForm");
    let attribute = tree.alloc(
        NodeKind::Attribute(AttributeData {
            name: "scriptid".to_string(),
            value: "custform123".to_string(),
            name_token: token(TokenKind::AttrName, "scriptid", 12),
            value_token: Some(token(TokenKind::AttrValue, "custform123", 22)),
            quote: QuoteKind::Double,
        }),
        Span::new(12, 34),
        SourceLocation::default(),
    );

    tree.attach_attribute(element, attribute);

    let data = tree.as_element(element).unwrap();
    assert_eq!(data.attributes, vec![attribute]);
    assert_eq!(data.attribute("scriptid"), Some("custform123"));
    assert_eq!(tree.attribute_value(element, "missing"), None);
    assert_eq!(tree.parent(attribute), Some(element));
    // Attributes are not children
    assert!(tree.children(element).is_empty());
}

#[test]
fn test_attach_comment_sets_parent_without_child_link() {
    let mut tree = XmlTree::new();
    let element = alloc_element(&mut tree, "record");
    let comment = tree.alloc(
        NodeKind::Comment(CommentData {
            kind: CommentKind::Line,
            value: " note ".to_string(),
        }),
        Span::new(8, 21),
        SourceLocation::default(),
    );

    tree.attach_comment(element, comment);

    assert_eq!(tree.as_element(element).unwrap().comments, vec![comment]);
    assert_eq!(tree.parent(comment), Some(element));
    assert!(tree.children(element).is_empty());
    assert_eq!(tree.as_comment(comment).unwrap().kind, CommentKind::Line);
}

#[test]
fn test_child_elements_named_skips_text() {
    let mut tree = XmlTree::new();
    let root = alloc_element(&mut tree, "fields");
    let first = alloc_element(&mut tree, "field");
    let text = alloc_text(&mut tree, "\n");
    let second = alloc_element(&mut tree, "field");
    let other = alloc_element(&mut tree, "label");
    for child in [first, text, second, other] {
        tree.append_child(root, child);
    }

    assert_eq!(tree.child_elements_named(root, "field"), vec![first, second]);
}

// ========== tokens ==========

#[test]
fn test_token_kind_names() {
    assert_eq!(TokenKind::TagName.to_string(), "XmlTagName");
    assert_eq!(TokenKind::AttrOperator.as_ref(), "XmlAttrOperator");
    assert!(TokenKind::Indent.is_gap());
    assert!(!TokenKind::Text.is_gap());
    assert!(TokenKind::AttrValue.is_structural());
    assert!(!TokenKind::AttrQuote.is_structural());
}

#[test]
fn test_token_serializes_with_type_field() {
    let json = serde_json::to_value(token(TokenKind::TagBeginSoft, "<", 0)).unwrap();
    assert_eq!(json["type"], "XmlTagBeginSoft");
    assert_eq!(json["value"], "<");
    assert_eq!(json["range"]["start"], 0);
    assert_eq!(json["range"]["end"], 1);
}

#[test]
fn test_quote_kind_lengths() {
    assert_eq!(QuoteKind::Double.quote_len(), 1);
    assert_eq!(QuoteKind::Single.quote_len(), 1);
    assert_eq!(QuoteKind::Unquoted.quote_len(), 0);
    assert!(!QuoteKind::NoValue.is_quoted());
}

#[test]
fn test_span_slice() {
    let source = "<a>text</a>";
    assert_eq!(Span::new(3, 7).slice(source), Some("text"));
    assert_eq!(Span::new(3, 7).len(), 4);
    assert!(Span::new(5, 5).is_empty());
    assert_eq!(Span::new(8, 40).slice(source), None);
}

#[test]
fn test_every_token_kind_serializes_with_xml_prefix() {
    for kind in TokenKind::iter() {
        let json = serde_json::to_value(kind).unwrap();
        let name = json.as_str().unwrap();
        assert!(name.starts_with("Xml"), "{kind:?} serialized as {name}");
        assert_eq!(name, kind.to_string());
    }
    assert_eq!(TokenKind::iter().filter(|k| k.is_gap()).count(), 3);
    assert_eq!(TokenKind::iter().filter(|k| k.is_structural()).count(), 3);
}
