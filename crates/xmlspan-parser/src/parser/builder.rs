//! Tree construction from structural events.
//!
//! Every element passes through three states: opening (its name token has
//! been claimed from the pending buffer), open (on the stack, collecting
//! attributes, children, and comments), and closed (popped with its range,
//! location, and inner content final). Comments seen while no element is
//! open wait in a deferred list until the root can take them.

use tracing::{debug, trace};
use xmlspan_ast::{
    AttributeData, CommentData, CommentKind, ElementData, NodeId, NodeKind, QuoteKind, Span,
    TokenKind, XmlTree,
};

use super::pending::PendingTokens;
use crate::error::{ParseError, Result};
use crate::options::ParserOptions;
use crate::position::PositionIndex;

/// One entry of the open-element stack.
#[derive(Debug, Clone, Copy)]
struct OpenFrame {
    id: NodeId,
    /// Offset just past the start tag's `>`, once seen.
    content_start: Option<usize>,
}

/// The pieces of a finished tree.
#[derive(Debug)]
pub struct BuiltTree {
    /// The arena.
    pub tree: XmlTree,
    /// The document root element.
    pub root: NodeId,
    /// Every comment node in document order.
    pub comments: Vec<NodeId>,
}

/// Assembles the tree, claiming structural tokens from the pending buffer
/// as each node is created.
#[derive(Debug)]
pub struct TreeBuilder<'a> {
    source: &'a str,
    index: &'a PositionIndex,
    options: ParserOptions,
    tree: XmlTree,
    open: Vec<OpenFrame>,
    deferred_comments: Vec<NodeId>,
    comments: Vec<NodeId>,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder for `source`.
    #[must_use]
    pub const fn new(source: &'a str, index: &'a PositionIndex, options: ParserOptions) -> Self {
        Self {
            source,
            index,
            options,
            tree: XmlTree::new(),
            open: Vec::new(),
            deferred_comments: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Number of currently open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    fn slice(&self, start: usize, end: usize) -> Result<&'a str> {
        self.source
            .get(start..end)
            .ok_or_else(|| ParseError::internal(format!("range [{start}, {end}) is outside the source"), start))
    }

    fn current(&self) -> Option<NodeId> {
        self.open.last().map(|frame| frame.id)
    }

    fn tag_name_of(&self, id: NodeId) -> String {
        self.tree
            .as_element(id)
            .map(|e| e.tag_name.clone())
            .unwrap_or_default()
    }

    /// A start tag name `[start, end)` was read.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MultipleRoots`] for a second top-level element
    /// and [`ParseError::UnmatchedPendingToken`] when the name token is not
    /// waiting in `pending`.
    pub fn open_element(&mut self, start: usize, end: usize, pending: &mut PendingTokens) -> Result<NodeId> {
        let raw = self.slice(start, end)?;
        let tag_start = start.saturating_sub(1);
        if self.open.is_empty() && self.tree.root().is_some() {
            return Err(ParseError::MultipleRoots {
                tag_name: raw.to_string(),
                offset: tag_start,
            });
        }
        let _ = pending.take_required(TokenKind::TagName, raw, start)?;

        let range = Span::new(tag_start, end);
        let element = ElementData::new(self.options.normalize_name(raw));
        let id = self.tree.alloc(NodeKind::Element(element), range, self.index.locate(range));

        match self.current() {
            Some(parent) => self.tree.append_child(parent, id),
            None => {
                self.tree.set_root(id);
                let leading = std::mem::take(&mut self.deferred_comments);
                debug!(tag = raw, leading = leading.len(), "root element opened");
                if let Some(root) = self.tree.as_element_mut(id) {
                    root.leading_comments = leading;
                }
            }
        }
        trace!(tag = raw, depth = self.open.len(), "element opened");
        self.open.push(OpenFrame {
            id,
            content_start: None,
        });
        Ok(id)
    }

    /// An attribute of the element on top of the stack is complete.
    ///
    /// `value` is the value range without quotes, or `None` for an
    /// attribute written without `=`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnmatchedPendingToken`] when the name or value
    /// token is not waiting in `pending`, and
    /// [`ParseError::InternalInconsistency`] when no element is open.
    pub fn add_attribute(
        &mut self,
        name: Span,
        value: Option<Span>,
        quote: QuoteKind,
        pending: &mut PendingTokens,
    ) -> Result<NodeId> {
        let element = self
            .current()
            .ok_or_else(|| ParseError::internal("attribute outside of a start tag", name.start))?;
        let raw_name = self.slice(name.start, name.end)?;
        let name_token = pending.take_required(TokenKind::AttrName, raw_name, name.start)?;

        let (value_token, end) = match value {
            Some(span) => {
                let raw_value = self.slice(span.start, span.end)?;
                let token = pending.take_required(TokenKind::AttrValue, raw_value, span.start)?;
                (Some(token), span.end + quote.quote_len())
            }
            None => (None, name.end),
        };

        let range = Span::new(name.start, end);
        let data = AttributeData {
            name: self.options.normalize_name(raw_name),
            value: value_token.as_ref().map(|t| t.value.clone()).unwrap_or_default(),
            name_token,
            value_token,
            quote,
        };
        let id = self.tree.alloc(NodeKind::Attribute(data), range, self.index.locate(range));
        self.tree.attach_attribute(element, id);
        Ok(id)
    }

    /// The start tag of the current element ended with the `>` at `end`.
    pub fn mark_open_tag_end(&mut self, end: usize) {
        if let Some(frame) = self.open.last_mut() {
            frame.content_start = Some(end + 1);
        }
    }

    /// An end tag with name `[start, end)` and `>` at `end_index`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnexpectedCloseTag`] when nothing is open,
    /// [`ParseError::StructuralMismatch`] when the name differs from the
    /// open element's, and [`ParseError::InternalInconsistency`] when the
    /// inner content cannot be extracted.
    pub fn close_element(
        &mut self,
        start: usize,
        end: usize,
        end_index: usize,
        pending: &mut PendingTokens,
    ) -> Result<NodeId> {
        let raw = self.slice(start, end)?;
        let Some(frame) = self.open.pop() else {
            return Err(ParseError::UnexpectedCloseTag {
                found: raw.to_string(),
                offset: start,
            });
        };
        let expected = self.tag_name_of(frame.id);
        if self.options.normalize_name(raw) != expected {
            return Err(ParseError::StructuralMismatch {
                expected,
                found: raw.to_string(),
                offset: start,
            });
        }
        let _ = pending.take_required(TokenKind::TagName, raw, start)?;

        let content_start = frame.content_start.ok_or_else(|| {
            ParseError::internal(format!("end tag for <{expected}> before its start tag ended"), start)
        })?;
        let content_end = start.saturating_sub(2);
        let inner = self
            .source
            .get(content_start..content_end)
            .ok_or_else(|| ParseError::internal(format!("no inner content for <{expected}>"), start))?;

        self.finish_element(frame.id, end_index + 1, Some(inner.to_string()))?;
        Ok(frame.id)
    }

    /// The current element ended with `/>` whose `>` is at `end`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InternalInconsistency`] when no element is open.
    pub fn self_close(&mut self, end: usize) -> Result<NodeId> {
        let frame = self
            .open
            .pop()
            .ok_or_else(|| ParseError::internal("self-closing tag with no open element", end))?;
        self.finish_element(frame.id, end + 1, None)?;
        Ok(frame.id)
    }

    fn finish_element(&mut self, id: NodeId, end: usize, inner_content: Option<String>) -> Result<()> {
        let start = self.tree.range(id).map_or(0, |r| r.start);
        let range = Span::new(start, end);
        let value = self.slice(start, end)?.to_string();
        let loc = self.index.locate(range);

        let is_closed = inner_content.is_none();
        if let Some(node) = self.tree.get_mut(id) {
            node.range = range;
            node.loc = loc;
            if let NodeKind::Element(data) = &mut node.kind {
                data.is_closed = is_closed;
                data.inner_content = inner_content;
                data.value = Some(value);
                trace!(tag = %data.tag_name, start, end, "element closed");
            }
        }
        Ok(())
    }

    /// Character data `range`. Dropped when no element is open.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InternalInconsistency`] when `range` does not
    /// fall inside the source.
    pub fn add_text(&mut self, range: Span) -> Result<Option<NodeId>> {
        let Some(parent) = self.current() else {
            trace!(start = range.start, end = range.end, "dropping text outside the root element");
            return Ok(None);
        };
        let value = self.slice(range.start, range.end)?.to_string();
        let id = self.tree.alloc(NodeKind::Text(value), range, self.index.locate(range));
        self.tree.append_child(parent, id);
        Ok(Some(id))
    }

    /// A comment covering `range` with the given body.
    pub fn add_comment(&mut self, range: Span, body: &str) -> NodeId {
        let loc = self.index.locate(range);
        let kind = if loc.is_multiline() {
            CommentKind::Block
        } else {
            CommentKind::Line
        };
        let data = CommentData {
            kind,
            value: body.to_string(),
        };
        let id = self.tree.alloc(NodeKind::Comment(data), range, loc);
        self.comments.push(id);

        match self.current() {
            Some(parent) => {
                self.tree.attach_comment(parent, id);
                if self.options.expose_comments_as_children {
                    self.tree.append_child(parent, id);
                }
            }
            None => {
                trace!(start = range.start, "deferring comment outside the root element");
                self.deferred_comments.push(id);
            }
        }
        id
    }

    /// The input ended.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnclosedElement`] when an element is still
    /// open, [`ParseError::MissingRoot`] when there was no element at all,
    /// and [`ParseError::ResidualPendingTokens`] when `pending` still holds
    /// tokens.
    pub fn finish(&mut self, pending: &PendingTokens) -> Result<()> {
        if let Some(frame) = self.open.last() {
            return Err(ParseError::UnclosedElement {
                tag_name: self.tag_name_of(frame.id),
                offset: self.tree.range(frame.id).map_or(0, |r| r.start),
            });
        }
        let root = self.tree.root().ok_or(ParseError::MissingRoot)?;

        let trailing = std::mem::take(&mut self.deferred_comments);
        if let Some(data) = self.tree.as_element_mut(root) {
            data.trailing_comments = trailing;
        }

        if let Some(first) = pending.first_live() {
            return Err(ParseError::ResidualPendingTokens {
                count: pending.len(),
                first_kind: first.kind,
                first_value: first.value.clone(),
                offset: first.range.start,
            });
        }
        Ok(())
    }

    /// Hand over the tree.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingRoot`] when no element was ever opened.
    pub fn into_tree(self) -> Result<BuiltTree> {
        let root = self.tree.root().ok_or(ParseError::MissingRoot)?;
        Ok(BuiltTree {
            tree: self.tree,
            root,
            comments: self.comments,
        })
    }
}
