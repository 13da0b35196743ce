//! Lexical event routing into the master token list.
//!
//! The tokenizer reports names, values, and text but not the punctuation
//! around them. The router derives `<`, `</`, `=`, quotes, `>` and `/>` from
//! neighbouring offsets, and fills every whitespace gap between two tokens
//! with line break, indent, or space tokens so that the list covers the
//! source without holes.

use tracing::trace;
use xmlspan_ast::{QuoteKind, Span, Token, TokenKind};

use super::pending::PendingTokens;
use crate::error::{ParseError, Result};
use crate::position::PositionIndex;

/// Builder of the gapless master token list.
#[derive(Debug)]
pub struct TokenRouter<'a> {
    source: &'a str,
    index: &'a PositionIndex,
    indent_unit: &'static str,
    tokens: Vec<Token>,
    /// End of the last appended token.
    cursor: usize,
    /// End of the most recent attribute name, where the search for its
    /// `=` starts.
    attribute_name_end: usize,
}

impl<'a> TokenRouter<'a> {
    /// Create a router over `source`. `indent_unit` is the text of one
    /// indentation step for gap classification.
    #[must_use]
    pub const fn new(source: &'a str, index: &'a PositionIndex, indent_unit: &'static str) -> Self {
        Self {
            source,
            index,
            indent_unit,
            tokens: Vec::new(),
            cursor: 0,
            attribute_name_end: 0,
        }
    }

    /// Tokens appended so far.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Hand over the finished token list.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// The most recently appended token of `kind`.
    #[must_use]
    pub fn last_of_kind(&self, kind: TokenKind) -> Option<&Token> {
        self.tokens.iter().rev().find(|t| t.kind == kind)
    }

    /// `<` and the start tag name.
    ///
    /// # Errors
    ///
    /// Fails when the derived `<` or the name cannot be placed after the
    /// previous token.
    pub fn open_tag_name(&mut self, start: usize, end: usize, pending: &mut PendingTokens) -> Result<()> {
        let lt = Self::before(start, 1)?;
        self.append(TokenKind::TagBeginSoft, lt, start, pending)?;
        self.append(TokenKind::TagName, start, end, pending)
    }

    /// An attribute name.
    ///
    /// # Errors
    ///
    /// Fails when the name cannot be placed after the previous token.
    pub fn attribute_name(&mut self, start: usize, end: usize, pending: &mut PendingTokens) -> Result<()> {
        self.attribute_name_end = end;
        self.append(TokenKind::AttrName, start, end, pending)
    }

    /// `=`, the opening quote if any, and the value. An empty value still
    /// yields a zero-width value token.
    ///
    /// # Errors
    ///
    /// Fails when no `=` sits between the attribute name and the value, or
    /// when the derived tokens cannot be placed.
    pub fn attribute_value(
        &mut self,
        start: usize,
        end: usize,
        quote: QuoteKind,
        pending: &mut PendingTokens,
    ) -> Result<()> {
        let value_start = start.saturating_sub(quote.quote_len());
        let operator = self
            .source
            .get(self.attribute_name_end..value_start)
            .and_then(|between| between.find('='))
            .map(|i| self.attribute_name_end + i)
            .ok_or_else(|| ParseError::internal("attribute value without '='", start))?;
        self.append(TokenKind::AttrOperator, operator, operator + 1, pending)?;
        if quote.is_quoted() {
            self.append(TokenKind::AttrQuote, value_start, start, pending)?;
        }
        self.append(TokenKind::AttrValue, start, end, pending)
    }

    /// The closing quote of a quoted value, which sits at `end`.
    ///
    /// # Errors
    ///
    /// Fails when the quote cannot be placed after the value.
    pub fn attribute_end(&mut self, quote: QuoteKind, end: usize, pending: &mut PendingTokens) -> Result<()> {
        if quote.is_quoted() {
            self.append(TokenKind::AttrQuote, end, end + quote.quote_len(), pending)?;
        }
        Ok(())
    }

    /// `>` at `end`.
    ///
    /// # Errors
    ///
    /// Fails when the `>` cannot be placed after the previous token.
    pub fn open_tag_end(&mut self, end: usize, pending: &mut PendingTokens) -> Result<()> {
        self.append(TokenKind::TagEndSoft, end, end + 1, pending)
    }

    /// `/>` whose `>` is at `end`.
    ///
    /// # Errors
    ///
    /// Fails when the `/>` cannot be placed after the previous token.
    pub fn self_closing(&mut self, end: usize, pending: &mut PendingTokens) -> Result<()> {
        let slash = Self::before(end, 1)?;
        self.append(TokenKind::TagEndHard, slash, end + 1, pending)
    }

    /// `</`, the end tag name, and the `>` at `end_index`.
    ///
    /// # Errors
    ///
    /// Fails when any of the three tokens cannot be placed.
    pub fn close_tag(
        &mut self,
        start: usize,
        end: usize,
        end_index: usize,
        pending: &mut PendingTokens,
    ) -> Result<()> {
        let open = Self::before(start, 2)?;
        self.append(TokenKind::TagBeginHard, open, start, pending)?;
        self.append(TokenKind::TagName, start, end, pending)?;
        self.append(TokenKind::TagEndSoft, end_index, end_index + 1, pending)
    }

    /// Character data.
    ///
    /// # Errors
    ///
    /// Fails when the text cannot be placed after the previous token.
    pub fn text(&mut self, start: usize, end: usize, pending: &mut PendingTokens) -> Result<()> {
        self.append(TokenKind::Text, start, end, pending)
    }

    /// A whole comment given its body range and the dash count of its
    /// terminator.
    ///
    /// # Errors
    ///
    /// Fails when the comment cannot be placed after the previous token.
    pub fn comment(
        &mut self,
        start: usize,
        end: usize,
        trailing_dashes: usize,
        pending: &mut PendingTokens,
    ) -> Result<()> {
        let open = Self::before(start, 4)?;
        self.append(TokenKind::Comment, open, end + trailing_dashes + 1, pending)
    }

    /// A processing instruction, declaration, or CDATA section.
    ///
    /// # Errors
    ///
    /// Fails when the declaration cannot be placed after the previous token.
    pub fn declaration(&mut self, start: usize, end: usize, pending: &mut PendingTokens) -> Result<()> {
        self.append(TokenKind::Declaration, start, end, pending)
    }

    /// A CDATA section with body `[start, end)`, recorded as one
    /// declaration token over the whole `<![CDATA[...]]>`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedGap`] when the preceding gap is not
    /// whitespace.
    pub fn cdata(&mut self, start: usize, end: usize, pending: &mut PendingTokens) -> Result<()> {
        self.append(TokenKind::Declaration, start.saturating_sub(9), end + 3, pending)
    }

    /// Cover whatever whitespace follows the last token.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedGap`] when the tail is not whitespace.
    pub fn finish(&mut self) -> Result<()> {
        self.fill_gap(self.source.len())
    }

    fn before(offset: usize, width: usize) -> Result<usize> {
        offset
            .checked_sub(width)
            .ok_or_else(|| ParseError::internal("delimiter would start before the source", offset))
    }

    fn append(
        &mut self,
        kind: TokenKind,
        start: usize,
        end: usize,
        pending: &mut PendingTokens,
    ) -> Result<()> {
        self.fill_gap(start)?;
        let token = self.make_token(kind, start, end)?;
        trace!(%kind, start, end, "token");
        if kind.is_structural() {
            pending.push(token.clone());
        }
        self.tokens.push(token);
        self.cursor = end;
        Ok(())
    }

    fn make_token(&self, kind: TokenKind, start: usize, end: usize) -> Result<Token> {
        let range = Span::new(start, end);
        let value = range.slice(self.source).ok_or_else(|| {
            ParseError::internal(format!("{kind} token [{start}, {end}) is outside the source"), start)
        })?;
        Ok(Token::new(kind, value.to_string(), range, self.index.locate(range)))
    }

    /// Insert gap tokens covering `[cursor, next_start)`.
    fn fill_gap(&mut self, next_start: usize) -> Result<()> {
        if next_start < self.cursor {
            return Err(ParseError::internal(
                format!("token at byte {next_start} overlaps the previous token ending at {}", self.cursor),
                next_start,
            ));
        }
        if next_start == self.cursor {
            return Ok(());
        }

        let gap = self
            .source
            .get(self.cursor..next_start)
            .ok_or_else(|| ParseError::internal("gap is not on a character boundary", self.cursor))?;
        if !gap.bytes().all(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::MalformedGap {
                start: self.cursor,
                end: next_start,
                text: gap.to_string(),
            });
        }

        let mut offset = self.cursor;
        for (kind, len) in classify_gap(gap, self.indent_unit) {
            let token = self.make_token(kind, offset, offset + len)?;
            self.tokens.push(token);
            offset += len;
        }
        self.cursor = next_start;
        Ok(())
    }
}

/// Split an all-whitespace gap into `(kind, byte length)` pieces: `\r\n` or
/// `\n` as line breaks, whole indentation units as indents, and any other
/// byte as a single space.
fn classify_gap(gap: &str, indent_unit: &str) -> Vec<(TokenKind, usize)> {
    let mut pieces = Vec::new();
    let mut rest = gap;
    while !rest.is_empty() {
        let piece = if rest.starts_with("\r\n") {
            (TokenKind::LineBreak, 2)
        } else if rest.starts_with('\n') {
            (TokenKind::LineBreak, 1)
        } else if !indent_unit.is_empty() && rest.starts_with(indent_unit) {
            (TokenKind::Indent, indent_unit.len())
        } else {
            (TokenKind::Space, 1)
        };
        rest = &rest[piece.1..];
        pieces.push(piece);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TabWidth;

    #[test]
    fn test_classify_gap_with_two_space_unit() {
        let pieces = classify_gap("\n     ", "  ");
        assert_eq!(
            pieces,
            vec![
                (TokenKind::LineBreak, 1),
                (TokenKind::Indent, 2),
                (TokenKind::Indent, 2),
                (TokenKind::Space, 1),
            ]
        );
    }

    #[test]
    fn test_classify_gap_crlf_and_tabs() {
        let pieces = classify_gap("\r\n\t\t", "\t");
        assert_eq!(
            pieces,
            vec![
                (TokenKind::LineBreak, 2),
                (TokenKind::Indent, 1),
                (TokenKind::Indent, 1),
            ]
        );
        // a tab is only an indent when the unit is a tab
        assert_eq!(classify_gap("\t", "  "), vec![(TokenKind::Space, 1)]);
    }

    #[test]
    fn test_malformed_gap() {
        let source = "<a x>";
        let index = PositionIndex::build(source, TabWidth::Two);
        let mut router = TokenRouter::new(source, &index, "  ");
        let mut pending = PendingTokens::new();
        router.open_tag_name(1, 2, &mut pending).unwrap();
        // skipping over "x" leaves non-whitespace behind
        let err = router.open_tag_end(4, &mut pending).unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedGap {
                start: 2,
                end: 4,
                text: " x".to_string(),
            }
        );
    }

    #[test]
    fn test_overlap_is_internal_error() {
        let source = "<a>";
        let index = PositionIndex::build(source, TabWidth::Two);
        let mut router = TokenRouter::new(source, &index, "  ");
        let mut pending = PendingTokens::new();
        router.open_tag_name(1, 2, &mut pending).unwrap();
        let err = router.text(1, 2, &mut pending).unwrap_err();
        assert!(matches!(err, ParseError::InternalInconsistency { offset: 1, .. }));
    }

    #[test]
    fn test_structural_tokens_go_to_pending() {
        let source = "<a b=\"1\">";
        let index = PositionIndex::build(source, TabWidth::Two);
        let mut router = TokenRouter::new(source, &index, "  ");
        let mut pending = PendingTokens::new();
        router.open_tag_name(1, 2, &mut pending).unwrap();
        router.attribute_name(3, 4, &mut pending).unwrap();
        router.attribute_value(6, 7, QuoteKind::Double, &mut pending).unwrap();
        router.attribute_end(QuoteKind::Double, 7, &mut pending).unwrap();
        router.open_tag_end(8, &mut pending).unwrap();
        router.finish().unwrap();

        assert_eq!(pending.len(), 3);
        let kinds: Vec<TokenKind> = router.tokens().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::TagBeginSoft,
                TokenKind::TagName,
                TokenKind::Space,
                TokenKind::AttrName,
                TokenKind::AttrOperator,
                TokenKind::AttrQuote,
                TokenKind::AttrValue,
                TokenKind::AttrQuote,
                TokenKind::TagEndSoft,
            ]
        );
    }
}
