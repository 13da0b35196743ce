//! XML tokenizer module.
//!
//! A byte-level state machine that reports primitive, offset-tagged events
//! (tag names, attribute boundaries, text, comments) through the
//! [`Callbacks`] trait. It never builds tokens or nodes itself.

/// The event interface driven by the tokenizer.
pub mod callbacks;
/// Tokenizer state machine implementation.
pub mod core;
/// Helper methods for tokenizer state transitions.
pub mod helpers;

pub use callbacks::Callbacks;
pub use core::{TokenizerState, XmlTokenizer};
