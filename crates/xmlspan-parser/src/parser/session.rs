use tracing::trace;
use xmlspan_ast::{QuoteKind, Span, Token, TokenKind};

use super::builder::{BuiltTree, TreeBuilder};
use super::pending::PendingTokens;
use super::router::TokenRouter;
use crate::error::{ParseError, Result};
use crate::options::ParserOptions;
use crate::position::PositionIndex;
use crate::tokenizer::Callbacks;

/// The attribute currently being read.
#[derive(Debug, Clone, Copy)]
struct AttributeDraft {
    name: Span,
    value: Option<Span>,
}

/// State of one parse call.
///
/// Owns the router, the pending buffer, and the tree builder, and wires
/// tokenizer events through them in order: each event first becomes tokens,
/// then tree structure.
#[derive(Debug)]
pub struct ParseSession<'a> {
    source: &'a str,
    options: ParserOptions,
    router: TokenRouter<'a>,
    pending: PendingTokens,
    builder: TreeBuilder<'a>,
    attribute: Option<AttributeDraft>,
}

impl<'a> ParseSession<'a> {
    /// Start a session over `source`.
    #[must_use]
    pub fn new(source: &'a str, index: &'a PositionIndex, options: &ParserOptions) -> Self {
        Self {
            source,
            options: options.clone(),
            router: TokenRouter::new(source, index, options.tab_width.indent_unit()),
            pending: PendingTokens::new(),
            builder: TreeBuilder::new(source, index, options.clone()),
            attribute: None,
        }
    }

    /// Hand over the token list and the tree.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingRoot`] when no element was parsed.
    pub fn into_parts(self) -> Result<(Vec<Token>, BuiltTree)> {
        let built = self.builder.into_tree()?;
        Ok((self.router.into_tokens(), built))
    }

    fn last_range(&self, kind: TokenKind, offset: usize) -> Result<Span> {
        self.router
            .last_of_kind(kind)
            .map(|t| t.range)
            .ok_or_else(|| ParseError::internal(format!("no {kind} token recorded"), offset))
    }
}

impl Callbacks for ParseSession<'_> {
    fn on_open_tag_name(&mut self, start: usize, end: usize) -> Result<()> {
        self.router.open_tag_name(start, end, &mut self.pending)?;
        let _ = self.builder.open_element(start, end, &mut self.pending)?;
        Ok(())
    }

    fn on_attribute_name(&mut self, start: usize, end: usize) -> Result<()> {
        self.router.attribute_name(start, end, &mut self.pending)?;
        self.attribute = Some(AttributeDraft {
            name: Span::new(start, end),
            value: None,
        });
        Ok(())
    }

    fn on_attribute_value(&mut self, start: usize, end: usize, quote: QuoteKind) -> Result<()> {
        self.router.attribute_value(start, end, quote, &mut self.pending)?;
        let draft = self
            .attribute
            .as_mut()
            .ok_or_else(|| ParseError::internal("attribute value without a name", start))?;
        draft.value = Some(Span::new(start, end));
        Ok(())
    }

    fn on_attribute_end(&mut self, quote: QuoteKind, end: usize) -> Result<()> {
        self.router.attribute_end(quote, end, &mut self.pending)?;
        let draft = self
            .attribute
            .take()
            .ok_or_else(|| ParseError::internal("attribute end without a name", end))?;
        let _ = self
            .builder
            .add_attribute(draft.name, draft.value, quote, &mut self.pending)?;
        Ok(())
    }

    fn on_open_tag_end(&mut self, end: usize) -> Result<()> {
        self.router.open_tag_end(end, &mut self.pending)?;
        self.builder.mark_open_tag_end(end);
        Ok(())
    }

    fn on_self_closing_tag(&mut self, end: usize) -> Result<()> {
        self.router.self_closing(end, &mut self.pending)?;
        if self.options.recognize_self_closing {
            let _ = self.builder.self_close(end)?;
        } else {
            // `/>` only ends the start tag; an end tag must follow.
            self.builder.mark_open_tag_end(end);
        }
        Ok(())
    }

    fn on_close_tag(&mut self, start: usize, end: usize, end_index: usize) -> Result<()> {
        self.router.close_tag(start, end, end_index, &mut self.pending)?;
        let _ = self
            .builder
            .close_element(start, end, end_index, &mut self.pending)?;
        Ok(())
    }

    fn on_text(&mut self, start: usize, end: usize) -> Result<()> {
        self.router.text(start, end, &mut self.pending)?;
        let range = self.last_range(TokenKind::Text, start)?;
        let _ = self.builder.add_text(range)?;
        Ok(())
    }

    fn on_comment(&mut self, start: usize, end: usize, trailing_dashes: usize) -> Result<()> {
        self.router
            .comment(start, end, trailing_dashes, &mut self.pending)?;
        let range = self.last_range(TokenKind::Comment, start)?;
        let body = self
            .source
            .get(start..end)
            .ok_or_else(|| ParseError::internal("comment body outside the source", start))?;
        let _ = self.builder.add_comment(range, body);
        Ok(())
    }

    fn on_declaration(&mut self, start: usize, end: usize) -> Result<()> {
        trace!(start, end, depth = self.builder.depth(), "declaration");
        self.router.declaration(start, end, &mut self.pending)
    }

    fn on_cdata(&mut self, start: usize, end: usize) -> Result<()> {
        self.router.cdata(start, end, &mut self.pending)?;
        if start < end {
            let _ = self.builder.add_text(Span::new(start, end))?;
        }
        Ok(())
    }

    fn on_end(&mut self) -> Result<()> {
        self.router.finish()?;
        self.builder.finish(&self.pending)
    }
}
