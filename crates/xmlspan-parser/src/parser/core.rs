use std::fmt::Write;

use tracing::debug;
use xmlspan_ast::{ElementData, NodeId, NodeKind, Position, Token, XmlTree};

use super::session::ParseSession;
use crate::error::Result;
use crate::options::ParserOptions;
use crate::position::PositionIndex;
use crate::tokenizer::XmlTokenizer;

/// The result of a successful parse.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Gapless master token list in source order.
    pub tokens: Vec<Token>,
    /// The node arena.
    pub tree: XmlTree,
    /// The document root element.
    pub root: NodeId,
    /// Every comment in document order, wherever it is attached.
    pub comments: Vec<NodeId>,
    /// Line/column lookup for the parsed source.
    pub index: PositionIndex,
}

impl ParsedDocument {
    /// Element data of the root.
    #[must_use]
    pub fn root_element(&self) -> Option<&ElementData> {
        self.tree.as_element(self.root)
    }

    /// Line and column of a byte offset in the parsed source.
    #[must_use]
    pub fn position(&self, offset: usize) -> Position {
        self.index.lookup(offset)
    }
}

/// Parser for one source text.
///
/// The position index is built on construction; [`parse`](Self::parse)
/// consumes the parser, so a parser instance runs at most once.
#[derive(Debug)]
pub struct XmlParser<'a> {
    source: &'a str,
    options: ParserOptions,
    index: PositionIndex,
}

impl<'a> XmlParser<'a> {
    /// Create a parser for `source`.
    #[must_use]
    pub fn new(source: &'a str, options: ParserOptions) -> Self {
        let index = PositionIndex::build(source, options.tab_width);
        Self {
            source,
            options,
            index,
        }
    }

    /// The position index over the source.
    #[must_use]
    pub const fn index(&self) -> &PositionIndex {
        &self.index
    }

    /// The options this parser was created with.
    #[must_use]
    pub const fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Run the tokenizer and reconcile its events into tokens and a tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`](crate::ParseError) encountered; no
    /// partial result is produced.
    pub fn parse(self) -> Result<ParsedDocument> {
        debug!(len = self.source.len(), options = ?self.options, "parse started");
        let (tokens, built) = {
            let mut session = ParseSession::new(self.source, &self.index, &self.options);
            let mut tokenizer = XmlTokenizer::new(self.source);
            if let Err(err) = tokenizer.run(&mut session) {
                debug!(%err, state = %tokenizer.state(), "parse failed");
                return Err(err);
            }
            session.into_parts()?
        };
        debug!(
            tokens = tokens.len(),
            nodes = built.tree.len(),
            comments = built.comments.len(),
            "parse finished"
        );
        Ok(ParsedDocument {
            tokens,
            tree: built.tree,
            root: built.root,
            comments: built.comments,
            index: self.index,
        })
    }
}

/// Parse `source` with default options.
///
/// # Errors
///
/// Returns the first [`ParseError`](crate::ParseError) encountered.
pub fn parse(source: &str) -> Result<ParsedDocument> {
    XmlParser::new(source, ParserOptions::default()).parse()
}

/// Parse `source` with the given options.
///
/// # Errors
///
/// Returns the first [`ParseError`](crate::ParseError) encountered.
pub fn parse_with_options(source: &str, options: &ParserOptions) -> Result<ParsedDocument> {
    XmlParser::new(source, options.clone()).parse()
}

/// Render the subtree at `id` as an indented outline, one node per line,
/// with each node's byte range. Text is shown as an escaped string literal. Leading and trailing comments of a root
/// element are rendered around it.
#[must_use]
pub fn render_tree(tree: &XmlTree, id: NodeId) -> String {
    let mut out = String::new();
    let element = tree.as_element(id);
    for &comment in element.map(|e| e.leading_comments.as_slice()).unwrap_or_default() {
        render_node(tree, comment, 0, &mut out);
    }
    render_node(tree, id, 0, &mut out);
    for &comment in element.map(|e| e.trailing_comments.as_slice()).unwrap_or_default() {
        render_node(tree, comment, 0, &mut out);
    }
    out
}

fn render_node(tree: &XmlTree, id: NodeId, indent: usize, out: &mut String) {
    let prefix = "  ".repeat(indent);
    let Some(node) = tree.get(id) else {
        return;
    };
    let range = node.range;
    match &node.kind {
        NodeKind::Element(data) => {
            let mut line = format!("<{}", data.tag_name);
            for &attr in &data.attributes {
                if let Some(a) = tree.as_attribute(attr) {
                    if a.value_token.is_some() {
                        let _ = write!(line, " {}=\"{}\"", a.name, a.value);
                    } else {
                        let _ = write!(line, " {}", a.name);
                    }
                }
            }
            line.push_str(if data.is_closed { "/>" } else { ">" });
            let _ = writeln!(out, "{prefix}{line} [{}, {})", range.start, range.end);
        }
        NodeKind::Text(data) => {
            let _ = writeln!(out, "{prefix}{data:?} [{}, {})", range.start, range.end);
        }
        NodeKind::Comment(data) => {
            let _ = writeln!(
                out,
                "{prefix}<!--{}--> {} [{}, {})",
                data.value, data.kind, range.start, range.end
            );
        }
        NodeKind::Attribute(data) => {
            let _ = writeln!(out, "{prefix}@{}=\"{}\" [{}, {})", data.name, data.value, range.start, range.end);
        }
    }
    for &child_id in tree.children(id) {
        render_node(tree, child_id, indent + 1, out);
    }
}
