//! Lexical tokens of the master token list.
//!
//! A token is a physical slice of the document (`<`, a tag name, `=`, a run
//! of indentation). It is not a node: nodes are logical constructs that may
//! span many tokens. Consumers that need non-overlapping pieces of the
//! source (fixers, formatters) work on tokens; consumers that need structure
//! work on the tree.

use serde::{Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::span::{SourceLocation, Span};

/// The lexical kind of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
pub enum TokenKind {
    /// `<` opening a start tag.
    #[strum(serialize = "XmlTagBeginSoft")]
    TagBeginSoft,
    /// `</` opening an end tag.
    #[strum(serialize = "XmlTagBeginHard")]
    TagBeginHard,
    /// The name of a start or end tag.
    #[strum(serialize = "XmlTagName")]
    TagName,
    /// `>` closing a start or end tag.
    #[strum(serialize = "XmlTagEndSoft")]
    TagEndSoft,
    /// `/>` closing a self-closing tag.
    #[strum(serialize = "XmlTagEndHard")]
    TagEndHard,
    /// An attribute name.
    #[strum(serialize = "XmlAttrName")]
    AttrName,
    /// The `=` between an attribute name and its value.
    #[strum(serialize = "XmlAttrOperator")]
    AttrOperator,
    /// A quote character around an attribute value.
    #[strum(serialize = "XmlAttrQuote")]
    AttrQuote,
    /// An attribute value, without quotes.
    #[strum(serialize = "XmlAttrValue")]
    AttrValue,
    /// Character data between markup.
    #[strum(serialize = "XmlText")]
    Text,
    /// A whole comment, `<!--` through `-->`.
    #[strum(serialize = "XmlComment")]
    Comment,
    /// A processing instruction, declaration, or CDATA section.
    #[strum(serialize = "XmlDeclaration")]
    Declaration,
    /// `\n` or `\r\n` inside markup.
    #[strum(serialize = "XmlLineBreak")]
    LineBreak,
    /// One indentation unit inside markup.
    #[strum(serialize = "XmlIndent")]
    Indent,
    /// Any other single whitespace byte inside markup.
    #[strum(serialize = "XmlSpace")]
    Space,
}

impl TokenKind {
    /// Synthetic whitespace kinds inserted to keep the token list gapless.
    #[must_use]
    pub const fn is_gap(self) -> bool {
        matches!(self, Self::LineBreak | Self::Indent | Self::Space)
    }

    /// Kinds that wait in the pending buffer until a tree node claims them.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(self, Self::TagName | Self::AttrName | Self::AttrValue)
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

/// One entry of the master token list. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Lexical kind.
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// The covered source text, verbatim.
    pub value: String,
    /// Byte range.
    pub range: Span,
    /// Line/column range.
    pub loc: SourceLocation,
}

impl Token {
    /// Create a token.
    #[must_use]
    pub const fn new(kind: TokenKind, value: String, range: Span, loc: SourceLocation) -> Self {
        Self {
            kind,
            value,
            range,
            loc,
        }
    }
}

/// How an attribute value was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum QuoteKind {
    /// `name` with no `=` at all.
    NoValue,
    /// `name=value`.
    Unquoted,
    /// `name='value'`.
    Single,
    /// `name="value"`.
    Double,
}

impl QuoteKind {
    /// Bytes taken by one quote character of this kind.
    #[must_use]
    pub const fn quote_len(self) -> usize {
        match self {
            Self::NoValue | Self::Unquoted => 0,
            Self::Single | Self::Double => 1,
        }
    }

    /// True for single and double quotes.
    #[must_use]
    pub const fn is_quoted(self) -> bool {
        self.quote_len() > 0
    }
}
