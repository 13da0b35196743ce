use xmlspan_ast::{Token, TokenKind};

use crate::error::{ParseError, Result};

/// Tokens recorded by the router but not yet claimed by a tree node.
///
/// Slots are index-addressed; a taken token leaves a hole instead of
/// shifting the tail, and holes at the end are trimmed so the buffer shrinks
/// back as elements close.
#[derive(Debug, Default)]
pub struct PendingTokens {
    slots: Vec<Option<Token>>,
    live: usize,
}

impl PendingTokens {
    /// Create an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
        }
    }

    /// Record a token.
    pub fn push(&mut self, token: Token) {
        self.slots.push(Some(token));
        self.live += 1;
    }

    /// Remove and return the most recently pushed token matching
    /// `predicate`, scanning backwards.
    pub fn take(&mut self, predicate: impl Fn(&Token) -> bool) -> Option<Token> {
        let index = self
            .slots
            .iter()
            .rposition(|slot| slot.as_ref().is_some_and(&predicate))?;
        let token = self.slots[index].take()?;
        self.live -= 1;
        while matches!(self.slots.last(), Some(None)) {
            let _ = self.slots.pop();
        }
        Some(token)
    }

    /// Take the token of `kind` with exactly `value` that was recorded at
    /// `start`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnmatchedPendingToken`] when no such token is
    /// waiting.
    pub fn take_required(&mut self, kind: TokenKind, value: &str, start: usize) -> Result<Token> {
        self.take(|t| t.kind == kind && t.range.start == start && t.value == value)
            .ok_or_else(|| ParseError::UnmatchedPendingToken {
                kind,
                value: value.to_string(),
                offset: start,
            })
    }

    /// Number of unclaimed tokens.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// True when every recorded token has been claimed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// The oldest unclaimed token.
    #[must_use]
    pub fn first_live(&self) -> Option<&Token> {
        self.slots.iter().find_map(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use xmlspan_ast::{SourceLocation, Span};

    use super::*;

    fn token(kind: TokenKind, value: &str, start: usize) -> Token {
        Token::new(
            kind,
            value.to_string(),
            Span::new(start, start + value.len()),
            SourceLocation::default(),
        )
    }

    #[test]
    fn test_take_scans_from_most_recent() {
        let mut pending = PendingTokens::new();
        pending.push(token(TokenKind::TagName, "a", 1));
        pending.push(token(TokenKind::TagName, "a", 4));

        let taken = pending.take(|t| t.value == "a").unwrap();
        assert_eq!(taken.range.start, 4);
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_take_leaves_hole_and_trims_tail() {
        let mut pending = PendingTokens::new();
        pending.push(token(TokenKind::TagName, "a", 1));
        pending.push(token(TokenKind::AttrName, "b", 3));
        pending.push(token(TokenKind::AttrValue, "1", 6));

        let _ = pending.take_required(TokenKind::AttrName, "b", 3).unwrap();
        assert_eq!(pending.slots.len(), 3);
        let _ = pending.take_required(TokenKind::AttrValue, "1", 6).unwrap();
        // the hole left by "b" is now at the tail and trimmed too
        assert_eq!(pending.slots.len(), 1);
        assert_eq!(pending.first_live().unwrap().value, "a");
    }

    #[test]
    fn test_take_required_matches_offset() {
        let mut pending = PendingTokens::new();
        pending.push(token(TokenKind::AttrValue, "x", 5));
        pending.push(token(TokenKind::AttrValue, "x", 12));

        let first = pending.take_required(TokenKind::AttrValue, "x", 5).unwrap();
        assert_eq!(first.range.start, 5);

        let err = pending.take_required(TokenKind::AttrValue, "x", 5).unwrap_err();
        assert!(matches!(err, ParseError::UnmatchedPendingToken { offset: 5, .. }));
        assert!(!pending.is_empty());
    }

    #[test]
    fn test_empty_after_all_taken() {
        let mut pending = PendingTokens::new();
        pending.push(token(TokenKind::TagName, "root", 1));
        assert!(pending.take(|t| t.kind == TokenKind::AttrName).is_none());
        let _ = pending.take(|t| t.kind == TokenKind::TagName).unwrap();
        assert!(pending.is_empty());
        assert!(pending.first_live().is_none());
    }
}
