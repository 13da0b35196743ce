use strum_macros::Display;
use tracing::{debug, trace};
use xmlspan_ast::QuoteKind;

use super::callbacks::Callbacks;
use crate::error::Result;

/// The tokenizer state machine. Each state names what the tokenizer is in
/// the middle of reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// Character data between markup.
    Data,
    /// Just read `<`.
    TagOpen,
    /// Inside a start tag name.
    TagName,
    /// Whitespace inside a start tag, before an attribute or the tag end.
    BeforeAttributeName,
    /// Inside an attribute name.
    AttributeName,
    /// Whitespace after an attribute name.
    AfterAttributeName,
    /// After `=`, before the value.
    BeforeAttributeValue,
    /// Inside a `"`-quoted value.
    AttributeValueDoubleQuoted,
    /// Inside a `'`-quoted value.
    AttributeValueSingleQuoted,
    /// Inside an unquoted value.
    AttributeValueUnquoted,
    /// Just read the closing quote of a value.
    AfterAttributeValueQuoted,
    /// Just read `/` inside a start tag.
    SelfClosingStartTag,
    /// Just read `</`.
    EndTagOpen,
    /// Inside an end tag name.
    EndTagName,
    /// Whitespace after an end tag name.
    AfterEndTagName,
}

/// Byte-level XML tokenizer.
///
/// The tokenizer only reports offsets. It keeps just enough marks (where
/// the current name, value, or text run began) to report each event once
/// its end is known.
pub struct XmlTokenizer<'a> {
    pub(super) state: TokenizerState,
    pub(super) bytes: &'a [u8],
    /// Offset of the next byte to consume.
    pub(super) current_pos: usize,
    /// Offset of `current_input_byte`, or the input length at EOF.
    pub(super) current_offset: usize,
    pub(super) current_input_byte: Option<u8>,
    // When true, the next iteration of the main loop will not consume a new byte.
    pub(super) reconsume: bool,
    pub(super) at_eof: bool,

    /// Start of the pending run of character data.
    pub(super) text_start: Option<usize>,
    /// Offset of the `<` of the construct being read.
    pub(super) tag_start: usize,
    /// Start of the tag or attribute name being read.
    pub(super) name_start: usize,
    /// End of the last attribute name, for valueless attributes.
    pub(super) attribute_name_end: usize,
    /// Start of the attribute value being read.
    pub(super) value_start: usize,
    /// End of the end tag name, once whitespace follows it.
    pub(super) close_name_end: usize,
}

impl<'a> XmlTokenizer<'a> {
    /// Create a new tokenizer for the given input. The initial state is the
    /// data state.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        XmlTokenizer {
            state: TokenizerState::Data,
            bytes: input.as_bytes(),
            current_pos: 0,
            current_offset: 0,
            current_input_byte: None,
            reconsume: false,
            at_eof: false,
            text_start: None,
            tag_start: 0,
            name_start: 0,
            attribute_name_end: 0,
            value_start: 0,
            close_name_end: 0,
        }
    }

    /// The state the tokenizer is currently in.
    #[must_use]
    pub const fn state(&self) -> TokenizerState {
        self.state
    }

    fn flush_text<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        match self.text_start.take() {
            Some(start) if start < self.current_offset => callbacks.on_text(start, self.current_offset),
            _ => Ok(()),
        }
    }

    fn handle_data_state<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        match self.current_input_byte {
            Some(b'<') => {
                self.flush_text(callbacks)?;
                self.tag_start = self.current_offset;
                self.switch_to(TokenizerState::TagOpen);
            }
            None => {
                self.flush_text(callbacks)?;
                self.at_eof = true;
            }
            Some(_) => {
                if self.text_start.is_none() {
                    self.text_start = Some(self.current_offset);
                }
            }
        }
        Ok(())
    }

    fn handle_tag_open_state<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        match self.current_input_byte {
            Some(b'/') => self.switch_to(TokenizerState::EndTagOpen),
            Some(b'!') => self.read_markup_declaration(callbacks)?,
            Some(b'?') => {
                let close = self.expect_terminator(
                    self.current_pos,
                    "?>",
                    self.tag_start,
                    "processing instruction",
                )?;
                callbacks.on_declaration(self.tag_start, close + 2)?;
                self.resume_data_at(close + 2);
            }
            Some(byte) if Self::is_name_byte(byte) => {
                self.name_start = self.current_offset;
                self.switch_to(TokenizerState::TagName);
            }
            _ => return Err(self.unexpected("after '<'")),
        }
        Ok(())
    }

    /// `<!` has been read: a comment, a CDATA section, or a declaration
    /// such as `<!DOCTYPE ...>`.
    fn read_markup_declaration<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        if self.next_few_characters_are("--") {
            let body_start = self.current_pos + 2;
            let terminator = self.expect_terminator(body_start, "-->", self.tag_start, "comment")?;
            // Dashes directly before `-->` belong to the terminator.
            let mut body_end = terminator;
            while body_end > body_start && self.bytes[body_end - 1] == b'-' {
                body_end -= 1;
            }
            let trailing_dashes = terminator + 2 - body_end;
            callbacks.on_comment(body_start, body_end, trailing_dashes)?;
            self.resume_data_at(terminator + 3);
        } else if self.next_few_characters_are("[CDATA[") {
            let body_start = self.current_pos + 7;
            let close = self.expect_terminator(body_start, "]]>", self.tag_start, "CDATA section")?;
            callbacks.on_cdata(body_start, close)?;
            self.resume_data_at(close + 3);
        } else {
            let close = self.declaration_end()?;
            callbacks.on_declaration(self.tag_start, close + 1)?;
            self.resume_data_at(close + 1);
        }
        Ok(())
    }

    /// Offset of the `>` ending a `<!...>` declaration, skipping over an
    /// internal subset in brackets.
    ///
    /// The subset ends at its first `]`, quoted or not: a `]` inside an
    /// entity value such as `<!ENTITY x "]">` ends the declaration early.
    fn declaration_end(&self) -> Result<usize> {
        let gt = self.find_from(self.current_pos, ">");
        let bracket = self.find_from(self.current_pos, "[");
        match (gt, bracket) {
            (Some(gt), Some(bracket)) if bracket < gt => {
                let subset_end =
                    self.expect_terminator(bracket, "]", self.tag_start, "declaration subset")?;
                self.expect_terminator(subset_end, ">", self.tag_start, "declaration")
            }
            (Some(gt), _) => Ok(gt),
            (None, _) => self.expect_terminator(self.current_pos, ">", self.tag_start, "declaration"),
        }
    }

    fn handle_tag_name_state<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        match self.current_input_byte {
            Some(byte) if Self::is_whitespace_byte(byte) => {
                callbacks.on_open_tag_name(self.name_start, self.current_offset)?;
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some(b'/') => {
                callbacks.on_open_tag_name(self.name_start, self.current_offset)?;
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some(b'>') => {
                callbacks.on_open_tag_name(self.name_start, self.current_offset)?;
                callbacks.on_open_tag_end(self.current_offset)?;
                self.switch_to(TokenizerState::Data);
            }
            Some(byte) if Self::is_name_byte(byte) => {}
            _ => return Err(self.unexpected("in tag name")),
        }
        Ok(())
    }

    fn handle_before_attribute_name_state<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        match self.current_input_byte {
            Some(byte) if Self::is_whitespace_byte(byte) => {}
            Some(b'/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some(b'>') => {
                callbacks.on_open_tag_end(self.current_offset)?;
                self.switch_to(TokenizerState::Data);
            }
            Some(byte) if Self::is_name_byte(byte) => {
                self.name_start = self.current_offset;
                self.switch_to(TokenizerState::AttributeName);
            }
            _ => return Err(self.unexpected("in start tag")),
        }
        Ok(())
    }

    fn handle_attribute_name_state<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        match self.current_input_byte {
            Some(byte) if Self::is_whitespace_byte(byte) => {
                self.finish_attribute_name(callbacks)?;
                self.switch_to(TokenizerState::AfterAttributeName);
            }
            Some(b'=') => {
                self.finish_attribute_name(callbacks)?;
                self.switch_to(TokenizerState::BeforeAttributeValue);
            }
            Some(b'/' | b'>') => {
                self.finish_attribute_name(callbacks)?;
                callbacks.on_attribute_end(QuoteKind::NoValue, self.attribute_name_end)?;
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
            Some(byte) if Self::is_name_byte(byte) => {}
            _ => return Err(self.unexpected("in attribute name")),
        }
        Ok(())
    }

    fn finish_attribute_name<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        self.attribute_name_end = self.current_offset;
        callbacks.on_attribute_name(self.name_start, self.current_offset)
    }

    fn handle_after_attribute_name_state<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        match self.current_input_byte {
            Some(byte) if Self::is_whitespace_byte(byte) => {}
            Some(b'=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            _ => {
                // Anything else starts the next attribute or ends the tag;
                // the before-attribute-name state sorts out which.
                callbacks.on_attribute_end(QuoteKind::NoValue, self.attribute_name_end)?;
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
        Ok(())
    }

    fn handle_before_attribute_value_state(&mut self) -> Result<()> {
        match self.current_input_byte {
            Some(byte) if Self::is_whitespace_byte(byte) => {}
            Some(b'"') => {
                self.value_start = self.current_pos;
                self.switch_to(TokenizerState::AttributeValueDoubleQuoted);
            }
            Some(b'\'') => {
                self.value_start = self.current_pos;
                self.switch_to(TokenizerState::AttributeValueSingleQuoted);
            }
            Some(byte) if byte != b'>' && byte != b'<' && !self.at_self_closing_end(byte) => {
                self.value_start = self.current_offset;
                self.switch_to(TokenizerState::AttributeValueUnquoted);
            }
            _ => return Err(self.unexpected("where an attribute value was expected")),
        }
        Ok(())
    }

    fn handle_attribute_value_quoted_state<C: Callbacks>(
        &mut self,
        callbacks: &mut C,
        quote_byte: u8,
        quote: QuoteKind,
    ) -> Result<()> {
        match self.current_input_byte {
            Some(byte) if byte == quote_byte => {
                callbacks.on_attribute_value(self.value_start, self.current_offset, quote)?;
                callbacks.on_attribute_end(quote, self.current_offset)?;
                self.switch_to(TokenizerState::AfterAttributeValueQuoted);
            }
            Some(_) => {}
            None => return Err(self.unexpected("in quoted attribute value")),
        }
        Ok(())
    }

    fn handle_attribute_value_unquoted_state<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        match self.current_input_byte {
            Some(byte) if Self::is_whitespace_byte(byte) => {
                self.finish_unquoted_value(callbacks)?;
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some(byte) if byte == b'>' || self.at_self_closing_end(byte) => {
                self.finish_unquoted_value(callbacks)?;
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
            Some(b'"' | b'\'' | b'<') | None => {
                return Err(self.unexpected("in unquoted attribute value"));
            }
            Some(_) => {}
        }
        Ok(())
    }

    fn finish_unquoted_value<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        callbacks.on_attribute_value(self.value_start, self.current_offset, QuoteKind::Unquoted)?;
        callbacks.on_attribute_end(QuoteKind::Unquoted, self.current_offset)
    }

    fn handle_after_attribute_value_quoted_state<C: Callbacks>(
        &mut self,
        callbacks: &mut C,
    ) -> Result<()> {
        match self.current_input_byte {
            Some(byte) if Self::is_whitespace_byte(byte) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some(b'/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some(b'>') => {
                callbacks.on_open_tag_end(self.current_offset)?;
                self.switch_to(TokenizerState::Data);
            }
            _ => return Err(self.unexpected("after attribute value")),
        }
        Ok(())
    }

    fn handle_self_closing_start_tag_state<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        match self.current_input_byte {
            Some(b'>') => {
                callbacks.on_self_closing_tag(self.current_offset)?;
                self.switch_to(TokenizerState::Data);
            }
            _ => return Err(self.unexpected("after '/' in start tag")),
        }
        Ok(())
    }

    fn handle_end_tag_open_state(&mut self) -> Result<()> {
        match self.current_input_byte {
            Some(byte) if Self::is_name_byte(byte) => {
                self.name_start = self.current_offset;
                self.switch_to(TokenizerState::EndTagName);
            }
            _ => return Err(self.unexpected("after '</'")),
        }
        Ok(())
    }

    fn handle_end_tag_name_state<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        match self.current_input_byte {
            Some(byte) if Self::is_whitespace_byte(byte) => {
                self.close_name_end = self.current_offset;
                self.switch_to(TokenizerState::AfterEndTagName);
            }
            Some(b'>') => {
                callbacks.on_close_tag(self.name_start, self.current_offset, self.current_offset)?;
                self.switch_to(TokenizerState::Data);
            }
            Some(byte) if Self::is_name_byte(byte) => {}
            _ => return Err(self.unexpected("in end tag name")),
        }
        Ok(())
    }

    fn handle_after_end_tag_name_state<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        match self.current_input_byte {
            Some(byte) if Self::is_whitespace_byte(byte) => {}
            Some(b'>') => {
                callbacks.on_close_tag(self.name_start, self.close_name_end, self.current_offset)?;
                self.switch_to(TokenizerState::Data);
            }
            _ => return Err(self.unexpected("in end tag")),
        }
        Ok(())
    }

    /// Run the tokenizer to completion, reporting every event to
    /// `callbacks` and finally calling [`Callbacks::on_end`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Syntax`](crate::ParseError::Syntax) for input
    /// the tokenizer cannot read, or the first error any callback returns.
    pub fn run<C: Callbacks>(&mut self, callbacks: &mut C) -> Result<()> {
        debug!(len = self.bytes.len(), "tokenizer started");
        loop {
            // Each state begins by consuming the next input byte, unless
            // we're reconsuming from a previous state transition.
            if self.reconsume {
                self.reconsume = false;
            } else {
                self.current_input_byte = self.consume();
            }

            trace!(state = %self.state, offset = self.current_offset, "tokenizer step");
            match self.state {
                TokenizerState::Data => self.handle_data_state(callbacks)?,
                TokenizerState::TagOpen => self.handle_tag_open_state(callbacks)?,
                TokenizerState::TagName => self.handle_tag_name_state(callbacks)?,
                TokenizerState::BeforeAttributeName => {
                    self.handle_before_attribute_name_state(callbacks)?;
                }
                TokenizerState::AttributeName => self.handle_attribute_name_state(callbacks)?,
                TokenizerState::AfterAttributeName => {
                    self.handle_after_attribute_name_state(callbacks)?;
                }
                TokenizerState::BeforeAttributeValue => self.handle_before_attribute_value_state()?,
                TokenizerState::AttributeValueDoubleQuoted => {
                    self.handle_attribute_value_quoted_state(callbacks, b'"', QuoteKind::Double)?;
                }
                TokenizerState::AttributeValueSingleQuoted => {
                    self.handle_attribute_value_quoted_state(callbacks, b'\'', QuoteKind::Single)?;
                }
                TokenizerState::AttributeValueUnquoted => {
                    self.handle_attribute_value_unquoted_state(callbacks)?;
                }
                TokenizerState::AfterAttributeValueQuoted => {
                    self.handle_after_attribute_value_quoted_state(callbacks)?;
                }
                TokenizerState::SelfClosingStartTag => {
                    self.handle_self_closing_start_tag_state(callbacks)?;
                }
                TokenizerState::EndTagOpen => self.handle_end_tag_open_state()?,
                TokenizerState::EndTagName => self.handle_end_tag_name_state(callbacks)?,
                TokenizerState::AfterEndTagName => self.handle_after_end_tag_name_state(callbacks)?,
            }

            if self.at_eof {
                break;
            }
        }
        debug!("tokenizer finished");
        callbacks.on_end()
    }
}
