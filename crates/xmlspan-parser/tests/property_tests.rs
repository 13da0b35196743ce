//! Property tests over generated well-formed documents.

#![allow(clippy::needless_pass_by_value)]

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use xmlspan_ast::NodeKind;
use xmlspan_parser::{ParserOptions, TabWidth, parse, parse_with_options};

const NAMES: &[&str] = &["a", "record", "field", "entityForm", "x-y", "ns:tag"];
const ATTRIBUTE_NAMES: &[&str] = &["id", "scriptid", "label", "data-x"];
const VALUES: &[&str] = &["", "1", "two words", "<&amp;>", "custform_123"];
const SEPARATORS: &[&str] = &[" ", "  ", "\t", "\n", "\n  ", "\r\n    ", " \t "];
const TEXTS: &[&str] = &["hello", "a &amp; b", " ", "\n    ", "x > y", "héllo", "\t"];
const COMMENTS: &[&str] = &[" note ", "", "multi\nline", "-", "<b>"];

/// A generated document that parses without error.
#[derive(Debug, Clone)]
struct WellFormed(String);

fn pick(g: &mut Gen, options: &[&'static str]) -> &'static str {
    g.choose(options).copied().unwrap()
}

fn write_comment(g: &mut Gen, out: &mut String) {
    out.push_str("<!--");
    out.push_str(pick(g, COMMENTS));
    out.push_str("-->");
}

fn write_attribute(g: &mut Gen, out: &mut String) {
    out.push_str(pick(g, SEPARATORS));
    out.push_str(pick(g, ATTRIBUTE_NAMES));
    match u8::arbitrary(g) % 4 {
        0 => {}
        1 => {
            out.push_str("=v1");
        }
        2 => {
            out.push_str("=\"");
            out.push_str(pick(g, VALUES));
            out.push('"');
        }
        _ => {
            out.push_str(if bool::arbitrary(g) { " = '" } else { "='" });
            out.push_str(pick(g, VALUES));
            out.push('\'');
        }
    }
}

fn write_element(g: &mut Gen, out: &mut String, depth: usize) {
    let name = pick(g, NAMES);
    out.push('<');
    out.push_str(name);
    for _ in 0..u8::arbitrary(g) % 3 {
        write_attribute(g, out);
    }
    if bool::arbitrary(g) {
        out.push_str(pick(g, SEPARATORS));
    }

    if depth >= 3 || u8::arbitrary(g) % 4 == 0 {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for _ in 0..u8::arbitrary(g) % 4 {
        match u8::arbitrary(g) % 3 {
            0 => out.push_str(pick(g, TEXTS)),
            1 => write_comment(g, out),
            _ => write_element(g, out, depth + 1),
        }
    }
    out.push_str("</");
    out.push_str(name);
    if bool::arbitrary(g) {
        out.push(' ');
    }
    out.push('>');
}

impl Arbitrary for WellFormed {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut out = String::new();
        if bool::arbitrary(g) {
            out.push_str("<?xml version=\"1.0\"?>\n");
        }
        if bool::arbitrary(g) {
            write_comment(g, &mut out);
            out.push('\n');
        }
        write_element(g, &mut out, 0);
        if bool::arbitrary(g) {
            out.push('\n');
            write_comment(g, &mut out);
        }
        if bool::arbitrary(g) {
            out.push('\n');
        }
        Self(out)
    }
}

#[quickcheck]
fn prop_tokens_are_gapless_and_disjoint(doc: WellFormed) -> bool {
    let source = doc.0.as_str();
    let Ok(parsed) = parse(source) else {
        return false;
    };
    let mut cursor = 0;
    for token in &parsed.tokens {
        if token.range.start != cursor || token.range.slice(source) != Some(token.value.as_str()) {
            return false;
        }
        cursor = token.range.end;
    }
    cursor == source.len()
}

#[quickcheck]
fn prop_gapless_with_every_tab_width(doc: WellFormed) -> bool {
    [TabWidth::Two, TabWidth::Four, TabWidth::Tab].into_iter().all(|tab_width| {
        let options = ParserOptions::default().with_tab_width(tab_width);
        parse_with_options(&doc.0, &options).is_ok_and(|parsed| {
            parsed
                .tokens
                .windows(2)
                .all(|pair| pair[0].range.end == pair[1].range.start)
        })
    })
}

#[quickcheck]
fn prop_element_values_are_source_slices(doc: WellFormed) -> bool {
    let source = doc.0.as_str();
    let Ok(parsed) = parse(source) else {
        return false;
    };
    parsed.tree.ids().all(|id| {
        let Some(node) = parsed.tree.get(id) else {
            return false;
        };
        match &node.kind {
            NodeKind::Element(data) => {
                let Some(text) = node.range.slice(source) else {
                    return false;
                };
                data.value.as_deref() == Some(text)
                    && text.starts_with(&format!("<{}", data.tag_name))
                    && text.ends_with('>')
                    && data.is_closed == data.inner_content.is_none()
            }
            NodeKind::Attribute(data) => node
                .range
                .slice(source)
                .is_some_and(|text| text.starts_with(data.name.as_str())),
            NodeKind::Text(value) => node.range.slice(source) == Some(value.as_str()),
            NodeKind::Comment(data) => node
                .range
                .slice(source)
                .is_some_and(|text| text.starts_with("<!--") && text.contains(data.value.as_str())),
        }
    })
}

#[quickcheck]
fn prop_parents_and_children_agree(doc: WellFormed) -> bool {
    let Ok(parsed) = parse(&doc.0) else {
        return false;
    };
    let tree = &parsed.tree;
    tree.ids().all(|id| {
        tree.children(id).iter().all(|&child| tree.parent(child) == Some(id))
            && tree
                .as_element(id)
                .is_none_or(|e| e.attributes.iter().all(|&a| tree.parent(a) == Some(id)))
    })
}
