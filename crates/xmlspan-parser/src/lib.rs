//! XML parser producing a gapless token list and a positioned syntax tree.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer**: a byte-level state machine reporting tag, attribute,
//!   text, comment, and declaration boundaries as offsets
//! - **Position index**: byte offset to line/column lookup with a
//!   configurable tab width
//! - **Router**: derives delimiter tokens and whitespace gap tokens so the
//!   token list covers every byte of the input exactly once
//! - **Tree builder**: reconciles the same events into an element tree with
//!   attributes, text, and comments, each carrying its byte range and
//!   line/column location
//!
//! # Not Implemented
//!
//! - DTD or schema validation
//! - Entity decoding (text and attribute values are verbatim)
//! - Namespace resolution
//! - Error recovery: the first problem aborts the parse
//!
//! # Example
//!
//! ```
//! let doc = xmlspan_parser::parse(r#"<a b="1"><c>text</c></a>"#).unwrap();
//! assert_eq!(doc.tree.attribute_value(doc.root, "b"), Some("1"));
//! ```

/// Parse failures.
pub mod error;
/// Parser configuration.
pub mod options;
/// Token/tree reconciliation.
pub mod parser;
/// Byte offset to line/column translation.
pub mod position;
/// XML tokenizer emitting offset events.
pub mod tokenizer;

pub use error::{ParseError, Result};
pub use options::{InvalidTabWidth, ParserOptions, TabWidth};
pub use parser::{ParsedDocument, XmlParser, parse, parse_with_options, render_tree};
pub use position::PositionIndex;
pub use tokenizer::{Callbacks, TokenizerState, XmlTokenizer};
