//! Helper functions for the XML tokenizer.
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("switch to", "reconsume in")
//! - Input handling (consume, peek, lookahead)
//! - Searching ahead for the terminator of a markup construct
//! - Byte classification

use memchr::memmem;

use super::core::{TokenizerState, XmlTokenizer};
use crate::error::{ParseError, Result};

// =============================================================================
// State Transition Helpers
// =============================================================================

impl XmlTokenizer<'_> {
    /// Transitions to a new state. The next byte will be consumed on the
    /// next iteration of the main loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// Transitions to a new state without consuming the current byte.
    /// The same byte will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input Helpers
// =============================================================================

impl XmlTokenizer<'_> {
    /// Returns the byte at the current position and advances past it.
    /// Returns `None` at the end of input, leaving the current offset at the
    /// input length.
    pub(super) fn consume(&mut self) -> Option<u8> {
        self.current_offset = self.current_pos;
        let byte = self.bytes.get(self.current_pos).copied();
        if byte.is_some() {
            self.current_pos += 1;
        }
        byte
    }

    /// The byte right after the current one, without consuming anything.
    pub(super) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.current_pos).copied()
    }

    /// True when `byte` is the `/` of a `/>`.
    pub(super) fn at_self_closing_end(&self, byte: u8) -> bool {
        byte == b'/' && self.peek() == Some(b'>')
    }

    /// Check whether the unconsumed input starts with `target`.
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        self.bytes
            .get(self.current_pos..)
            .is_some_and(|rest| rest.starts_with(target.as_bytes()))
    }

    /// Continue consuming at `pos`, back in the data state.
    pub(super) const fn resume_data_at(&mut self, pos: usize) {
        self.current_pos = pos;
        self.state = TokenizerState::Data;
    }

    /// Offset of the first occurrence of `needle` at or after `from`.
    pub(super) fn find_from(&self, from: usize, needle: &str) -> Option<usize> {
        let haystack = self.bytes.get(from..)?;
        memmem::find(haystack, needle.as_bytes()).map(|i| i + from)
    }

    /// Like [`find_from`](Self::find_from), but a missing terminator is a
    /// syntax error for the construct starting at `construct_start`.
    pub(super) fn expect_terminator(
        &self,
        from: usize,
        needle: &str,
        construct_start: usize,
        what: &str,
    ) -> Result<usize> {
        self.find_from(from, needle).ok_or_else(|| {
            ParseError::syntax(format!("unterminated {what}, expected {needle:?}"), construct_start)
        })
    }

    /// A syntax error at the current byte.
    pub(super) fn unexpected(&self, context: &str) -> ParseError {
        let message = match self.current_input_byte {
            Some(byte) if byte.is_ascii_graphic() => {
                format!("unexpected {:?} {context}", char::from(byte))
            }
            Some(byte) => format!("unexpected byte 0x{byte:02x} {context}"),
            None => format!("unexpected end of input {context}"),
        };
        ParseError::syntax(message, self.current_offset)
    }
}

// =============================================================================
// Byte Classification
// =============================================================================

impl XmlTokenizer<'_> {
    /// Space, tab, line feed, form feed, or carriage return.
    pub(super) const fn is_whitespace_byte(byte: u8) -> bool {
        byte.is_ascii_whitespace()
    }

    /// Bytes that may appear in tag and attribute names.
    ///
    /// Anything that is not whitespace and not markup punctuation, so
    /// multi-byte UTF-8 names pass through untouched.
    pub(super) const fn is_name_byte(byte: u8) -> bool {
        !byte.is_ascii_whitespace() && !matches!(byte, b'<' | b'>' | b'/' | b'=' | b'"' | b'\'')
    }
}
