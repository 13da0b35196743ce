//! Parse failures.
//!
//! Every failure is fatal: the parse stops at the first one and no tree or
//! token list is returned.

use thiserror::Error;
use xmlspan_ast::TokenKind;

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that abort a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A close tag does not match the element on top of the open stack.
    #[error("close tag </{found}> at byte {offset} does not match open element <{expected}>")]
    StructuralMismatch {
        /// Tag name of the open element.
        expected: String,
        /// Tag name of the close tag.
        found: String,
        /// Byte offset of the close tag's name.
        offset: usize,
    },

    /// A close tag arrived while no element was open.
    #[error("close tag </{found}> at byte {offset} has no open element")]
    UnexpectedCloseTag {
        /// Tag name of the close tag.
        found: String,
        /// Byte offset of the close tag's name.
        offset: usize,
    },

    /// The input ended while an element was still open.
    #[error("element <{tag_name}> opened at byte {offset} is never closed")]
    UnclosedElement {
        /// Tag name of the open element.
        tag_name: String,
        /// Byte offset of the element's `<`.
        offset: usize,
    },

    /// A structurally required pending token was not found.
    #[error("no pending {kind} token {value:?} at byte {offset}")]
    UnmatchedPendingToken {
        /// The kind that was looked for.
        kind: TokenKind,
        /// The value that was looked for.
        value: String,
        /// The originating offset that was looked for.
        offset: usize,
    },

    /// Bytes between two tokens were not whitespace.
    #[error("non-whitespace gap {text:?} between bytes {start} and {end}")]
    MalformedGap {
        /// First byte of the gap.
        start: usize,
        /// One past the last byte of the gap.
        end: usize,
        /// The gap's text.
        text: String,
    },

    /// Pending tokens were left unclaimed at the end of the parse.
    #[error("{count} pending token(s) left unclaimed, first {first_kind} {first_value:?} at byte {offset}")]
    ResidualPendingTokens {
        /// How many tokens were left.
        count: usize,
        /// Kind of the oldest leftover.
        first_kind: TokenKind,
        /// Value of the oldest leftover.
        first_value: String,
        /// Byte offset of the oldest leftover.
        offset: usize,
    },

    /// The parser's bookkeeping contradicted itself.
    #[error("internal inconsistency at byte {offset}: {message}")]
    InternalInconsistency {
        /// What went wrong.
        message: String,
        /// Byte offset where it was noticed.
        offset: usize,
    },

    /// The tokenizer rejected the input.
    #[error("syntax error at byte {offset}: {message}")]
    Syntax {
        /// What the tokenizer expected.
        message: String,
        /// Byte offset of the offending character.
        offset: usize,
    },

    /// The input contains no element.
    #[error("document has no root element")]
    MissingRoot,

    /// A second top-level element follows the root.
    #[error("second top-level element <{tag_name}> at byte {offset}")]
    MultipleRoots {
        /// Tag name of the second element.
        tag_name: String,
        /// Byte offset of its `<`.
        offset: usize,
    },
}

impl ParseError {
    /// The primary byte offset of the failure, if it has one.
    #[must_use]
    pub const fn offset(&self) -> Option<usize> {
        match self {
            Self::StructuralMismatch { offset, .. }
            | Self::UnexpectedCloseTag { offset, .. }
            | Self::UnclosedElement { offset, .. }
            | Self::UnmatchedPendingToken { offset, .. }
            | Self::ResidualPendingTokens { offset, .. }
            | Self::InternalInconsistency { offset, .. }
            | Self::Syntax { offset, .. }
            | Self::MultipleRoots { offset, .. } => Some(*offset),
            Self::MalformedGap { start, .. } => Some(*start),
            Self::MissingRoot => None,
        }
    }

    pub(crate) fn internal(message: impl Into<String>, offset: usize) -> Self {
        Self::InternalInconsistency {
            message: message.into(),
            offset,
        }
    }

    pub(crate) fn syntax(message: impl Into<String>, offset: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            offset,
        }
    }
}
