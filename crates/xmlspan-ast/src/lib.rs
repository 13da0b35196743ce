//! Syntax tree and token types for xmlspan.
//!
//! This crate provides the shapes handed to consumers of a parse: the
//! gapless [`Token`] list and an arena-based [`XmlTree`] of elements,
//! attributes, text, and comments.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships.
//! A parent owns its children through the arena; children refer back to
//! their parent with a plain index, so there are no reference cycles and no
//! borrow checker issues when walking in either direction.

/// Byte ranges and line/column positions.
pub mod span;
/// Lexical tokens.
pub mod token;

use std::collections::HashMap;

use serde::Serialize;
use strum_macros::Display;

pub use span::{Position, SourceLocation, Span};
pub use token::{QuoteKind, Token, TokenKind};

/// Attribute side-table: attribute name to value for one element.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// One arena slot.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    /// What this node is.
    pub kind: NodeKind,

    /// Non-owning back-reference to the enclosing element.
    pub parent: Option<NodeId>,

    /// Owned children, in document order. Only elements have children.
    pub children: Vec<NodeId>,

    /// The node following this one in its parent's children.
    pub next_sibling: Option<NodeId>,

    /// The node preceding this one in its parent's children.
    pub prev_sibling: Option<NodeId>,

    /// Byte range.
    pub range: Span,

    /// Line/column range.
    pub loc: SourceLocation,
}

/// Node variants.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum NodeKind {
    /// An element, `<name ...>...</name>` or `<name .../>`.
    Element(ElementData),
    /// `name="value"` inside a start tag.
    Attribute(AttributeData),
    /// Character data.
    Text(String),
    /// `<!-- ... -->`.
    Comment(CommentData),
}

/// Element-specific data.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ElementData {
    /// The tag name, lowercased when names are case-insensitive.
    pub tag_name: String,

    /// Attribute nodes in source order.
    pub attributes: Vec<NodeId>,

    /// Name to value lookup over `attributes`. When a name repeats, the
    /// last occurrence wins.
    pub attrs: AttributesMap,

    /// Comments directly inside this element.
    pub comments: Vec<NodeId>,

    /// Comments before the root element. Only filled on the root.
    pub leading_comments: Vec<NodeId>,

    /// Comments after the root element. Only filled on the root.
    pub trailing_comments: Vec<NodeId>,

    /// True for `<name/>`.
    pub is_closed: bool,

    /// Everything between the start tag's `>` and the end tag's `</`.
    /// `None` for self-closing elements.
    pub inner_content: Option<String>,

    /// The element's full source text, set once the element is closed.
    pub value: Option<String>,
}

impl ElementData {
    /// Create element data with no attributes or comments.
    #[must_use]
    pub fn new(tag_name: String) -> Self {
        Self {
            tag_name,
            ..Self::default()
        }
    }

    /// Look up an attribute value by name through the side-table.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Attribute-specific data.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeData {
    /// The attribute name, lowercased when names are case-insensitive.
    pub name: String,
    /// The attribute value, verbatim. Empty for valueless attributes.
    pub value: String,
    /// The name token claimed from the pending buffer.
    pub name_token: Token,
    /// The value token claimed from the pending buffer. `None` for
    /// valueless attributes.
    pub value_token: Option<Token>,
    /// How the value was quoted.
    pub quote: QuoteKind,
}

/// Comment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum CommentKind {
    /// Starts and ends on the same line.
    Line,
    /// Spans more than one line.
    Block,
}

/// Comment-specific data.
#[derive(Debug, Clone, Serialize)]
pub struct CommentData {
    /// Line or block.
    pub kind: CommentKind,
    /// The comment body, without `<!--` and `-->`.
    pub value: String,
}

/// Arena-based syntax tree with O(1) node access and traversal.
///
/// All nodes live in one vector and refer to each other by [`NodeId`].
/// The root is the first top-level element; it is `None` only while a
/// tree is under construction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct XmlTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl XmlTree {
    /// Create an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// The document root element.
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Designate the document root element.
    pub const fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all node IDs in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, kind: NodeKind, range: Span, loc: SourceLocation) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
            range,
            loc,
        });
        id
    }

    /// Appends `child` as the last child of `parent`, updating parent and
    /// sibling links.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let prev_last_child = self.nodes[parent.0].children.last().copied();

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    /// Attach an attribute node to an element's attribute list and record it
    /// in the element's side-table.
    pub fn attach_attribute(&mut self, element: NodeId, attribute: NodeId) {
        let entry = self.as_attribute(attribute).map(|a| (a.name.clone(), a.value.clone()));
        self.nodes[attribute.0].parent = Some(element);
        if let Some(data) = self.as_element_mut(element) {
            data.attributes.push(attribute);
            if let Some((name, value)) = entry {
                let _ = data.attrs.insert(name, value);
            }
        }
    }

    /// Attach a comment node to an element's comment list.
    pub fn attach_comment(&mut self, element: NodeId, comment: NodeId) {
        self.nodes[comment.0].parent = Some(element);
        if let Some(data) = self.as_element_mut(element) {
            data.comments.push(comment);
        }
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Byte range of a node.
    #[must_use]
    pub fn range(&self, id: NodeId) -> Option<Span> {
        self.get(id).map(|n| n.range)
    }

    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// Depth-first, pre-order walk over `id` and everything below it
    /// through the children lists.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: vec![id],
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get attribute data if this node is an attribute.
    #[must_use]
    pub fn as_attribute(&self, id: NodeId) -> Option<&AttributeData> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Attribute(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Get comment data if this node is a comment.
    #[must_use]
    pub fn as_comment(&self, id: NodeId) -> Option<&CommentData> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Comment(data) => Some(data),
            _ => None,
        })
    }

    /// Look up an attribute value on an element through its side-table.
    #[must_use]
    pub fn attribute_value(&self, element: NodeId, name: &str) -> Option<&str> {
        self.as_element(element).and_then(|e| e.attribute(name))
    }

    /// Element children of `id` with the given tag name.
    #[must_use]
    pub fn child_elements_named(&self, id: NodeId, tag_name: &str) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.as_element(child).is_some_and(|e| e.tag_name == tag_name))
            .collect()
    }

    /// Concatenated text of all text nodes below `id`.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|n| self.as_text(n))
            .collect()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a XmlTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a XmlTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct DescendantIterator<'a> {
    tree: &'a XmlTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
