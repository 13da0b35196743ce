use xmlspan_ast::QuoteKind;

use crate::error::Result;

/// Receiver of primitive tokenizer events.
///
/// Events arrive in strictly increasing offset order. All offsets are byte
/// offsets into the source; ranges are half-open. Returning an error from
/// any method stops the tokenizer immediately and the error is handed back
/// from [`XmlTokenizer::run`](super::XmlTokenizer::run).
pub trait Callbacks {
    /// The name of a start tag occupies `[start, end)`; its `<` is at
    /// `start - 1`.
    ///
    /// # Errors
    ///
    /// Any error aborts tokenization.
    fn on_open_tag_name(&mut self, start: usize, end: usize) -> Result<()>;

    /// An attribute name occupies `[start, end)`.
    ///
    /// # Errors
    ///
    /// Any error aborts tokenization.
    fn on_attribute_name(&mut self, start: usize, end: usize) -> Result<()>;

    /// An attribute value, without quotes, occupies `[start, end)`. Reported
    /// for every attribute that has `=`, even when the value is empty.
    ///
    /// # Errors
    ///
    /// Any error aborts tokenization.
    fn on_attribute_value(&mut self, start: usize, end: usize, quote: QuoteKind) -> Result<()>;

    /// The current attribute is complete. For quoted values `end` is the
    /// offset of the closing quote, for unquoted values the end of the
    /// value, and for valueless attributes the end of the name.
    ///
    /// # Errors
    ///
    /// Any error aborts tokenization.
    fn on_attribute_end(&mut self, quote: QuoteKind, end: usize) -> Result<()>;

    /// A start tag ended with the `>` at `end`.
    ///
    /// # Errors
    ///
    /// Any error aborts tokenization.
    fn on_open_tag_end(&mut self, end: usize) -> Result<()>;

    /// A start tag ended with `/>`; `end` is the offset of the `>`.
    ///
    /// # Errors
    ///
    /// Any error aborts tokenization.
    fn on_self_closing_tag(&mut self, end: usize) -> Result<()>;

    /// An end tag whose name occupies `[start, end)` and whose `>` is at
    /// `end_index`.
    ///
    /// # Errors
    ///
    /// Any error aborts tokenization.
    fn on_close_tag(&mut self, start: usize, end: usize, end_index: usize) -> Result<()>;

    /// Character data `[start, end)`. Never empty.
    ///
    /// # Errors
    ///
    /// Any error aborts tokenization.
    fn on_text(&mut self, start: usize, end: usize) -> Result<()>;

    /// A comment whose body occupies `[start, end)`. `<!--` sits at
    /// `start - 4` and the terminator covers
    /// `[end, end + trailing_dashes + 1)`.
    ///
    /// # Errors
    ///
    /// Any error aborts tokenization.
    fn on_comment(&mut self, start: usize, end: usize, trailing_dashes: usize) -> Result<()>;

    /// A processing instruction or `<!...>` declaration covering
    /// `[start, end)` in full.
    ///
    /// # Errors
    ///
    /// Any error aborts tokenization.
    fn on_declaration(&mut self, start: usize, end: usize) -> Result<()>;

    /// A CDATA section with body `[start, end)`. `<![CDATA[` occupies
    /// `[start - 9, start)` and `]]>` occupies `[end, end + 3)`.
    ///
    /// # Errors
    ///
    /// Any error aborts tokenization.
    fn on_cdata(&mut self, start: usize, end: usize) -> Result<()>;

    /// The input is exhausted.
    ///
    /// # Errors
    ///
    /// Any error is returned from the tokenizer run.
    fn on_end(&mut self) -> Result<()>;
}
