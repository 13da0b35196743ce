//! Token/tree reconciliation.
//!
//! [`XmlParser`] drives the tokenizer with a [`ParseSession`], which routes
//! each event into the master token list ([`TokenRouter`]), parks
//! structural tokens in the [`PendingTokens`] buffer, and lets the
//! [`TreeBuilder`] claim them as nodes are created.

/// Tree construction from structural events.
pub mod builder;
/// Public entry points and the parse result.
pub mod core;
/// Buffer of tokens waiting for a tree node.
pub mod pending;
/// Lexical event routing into the master token list.
pub mod router;
/// Per-parse state wiring the tokenizer to router and builder.
pub mod session;

pub use builder::{BuiltTree, TreeBuilder};
pub use core::{ParsedDocument, XmlParser, parse, parse_with_options, render_tree};
pub use pending::PendingTokens;
pub use router::TokenRouter;
pub use session::ParseSession;
