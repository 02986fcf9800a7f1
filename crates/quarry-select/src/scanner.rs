//! A cursor over selector text that every grammar in the crate builds on.
//!
//! `expect_*` operations advance past what they recognise or fail with
//! [`Error::UnexpectedToken`]; `try_get_*` operations never fail and leave
//! the position untouched when nothing matches. When whitespace skipping
//! is enabled, it happens before every token test.
//!
//! A single level of [`Scanner::undo`] is kept: it rewinds to where the
//! most recent successful operation started, nothing further.

use crate::chars::{self, CharClass};
use crate::error::{Error, Result};
use crate::patterns::{
    Bounded, CssIdentifier, HtmlAttributeName, HtmlTagSelectorName, Number, OptionallyQuoted,
    Pattern, PatternMatch, Quoted,
};

/// Scanner over an immutable character buffer. One instance serves one
/// pass over one string.
#[derive(Debug, Clone)]
pub struct Scanner {
    buffer: Vec<char>,
    position: usize,
    last_position: usize,
    current_match: String,
    last_match: String,
    ignore_whitespace: bool,
}

impl Scanner {
    /// Create a scanner positioned at the start of `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            buffer: text.chars().collect(),
            position: 0,
            last_position: 0,
            current_match: String::new(),
            last_match: String::new(),
            ignore_whitespace: false,
        }
    }

    /// Builder form of [`Scanner::set_ignore_whitespace`].
    #[must_use]
    pub const fn ignoring_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }

    /// Whether leading whitespace is skipped before each token test.
    pub const fn set_ignore_whitespace(&mut self, ignore: bool) {
        self.ignore_whitespace = ignore;
    }

    /// Whether leading whitespace is skipped before each token test.
    #[must_use]
    pub const fn ignores_whitespace(&self) -> bool {
        self.ignore_whitespace
    }

    /// Current character offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Number of characters in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Whether the position is at the end of the buffer.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.position >= self.buffer.len()
    }

    /// The character at the position.
    #[must_use]
    pub fn current(&self) -> Option<char> {
        self.buffer.get(self.position).copied()
    }

    /// The character after the one at the position.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.buffer.get(self.position + 1).copied()
    }

    /// The text consumed by the most recent successful operation.
    #[must_use]
    pub fn matched(&self) -> &str {
        &self.current_match
    }

    /// The text consumed by the operation before that.
    #[must_use]
    pub fn last_match(&self) -> &str {
        &self.last_match
    }

    /// Everything from the position to the end.
    #[must_use]
    pub fn remainder(&self) -> String {
        self.buffer[self.position.min(self.buffer.len())..]
            .iter()
            .collect()
    }

    /// Where the next token would start once whitespace skipping applies.
    fn token_start(&self) -> usize {
        let mut index = self.position;
        if self.ignore_whitespace {
            while self
                .buffer
                .get(index)
                .is_some_and(|&c| chars::is_whitespace(c))
            {
                index += 1;
            }
        }
        index
    }

    /// Record a successful operation that moved from the position to `end`.
    fn commit(&mut self, end: usize, matched: String) {
        self.last_position = self.position;
        self.position = end;
        self.last_match = std::mem::replace(&mut self.current_match, matched);
    }

    fn unexpected(&self, at: usize, expected: impl Into<String>) -> Error {
        Error::UnexpectedToken {
            position: at,
            expected: Some(expected.into()),
            found: self.buffer.get(at).copied(),
        }
    }

    /// An [`Error::UnexpectedToken`] for the next token position.
    pub(crate) fn unexpected_here(&self, expected: impl Into<String>) -> Error {
        self.unexpected(self.token_start(), expected)
    }

    /// Whether only skippable input remains.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.token_start() >= self.buffer.len()
    }

    /// Skip whitespace at the position regardless of the skipping mode.
    /// Returns whether anything was skipped.
    pub fn skip_whitespace(&mut self) -> bool {
        let start = self.position;
        while self.current().is_some_and(chars::is_whitespace) {
            self.position += 1;
        }
        self.position > start
    }

    /// Consume one character.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] at end of input.
    pub fn next_char(&mut self) -> Result<char> {
        let at = self.token_start();
        let c = self
            .buffer
            .get(at)
            .copied()
            .ok_or_else(|| self.unexpected(at, "any character"))?;
        self.commit(at + 1, c.to_string());
        Ok(c)
    }

    /// Step back over the previous character. Does nothing at the start.
    pub const fn previous(&mut self) {
        if self.position > 0 {
            self.last_position = self.position;
            self.position -= 1;
        }
    }

    /// Rewind to where the most recent successful operation began.
    pub const fn undo(&mut self) {
        self.position = self.last_position;
    }

    fn literal_at(&self, at: usize, literal: &str) -> Option<usize> {
        let mut index = at;
        for expected in literal.chars() {
            if self.buffer.get(index) != Some(&expected) {
                return None;
            }
            index += 1;
        }
        Some(index)
    }

    /// Consume `literal`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] if the input does not continue
    /// with `literal`.
    pub fn expect(&mut self, literal: &str) -> Result<()> {
        let at = self.token_start();
        let end = self
            .literal_at(at, literal)
            .ok_or_else(|| self.unexpected(at, format!("\"{literal}\"")))?;
        self.commit(end, literal.to_string());
        Ok(())
    }

    /// Consume `literal` if it is next. Returns whether it was.
    pub fn try_get(&mut self, literal: &str) -> bool {
        let at = self.token_start();
        match self.literal_at(at, literal) {
            Some(end) => {
                self.commit(end, literal.to_string());
                true
            }
            None => false,
        }
    }

    /// Consume `c`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] if the next character is not `c`.
    pub fn expect_char(&mut self, c: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.expect(c.encode_utf8(&mut buf))
    }

    /// Consume `c` if it is next. Returns whether it was.
    pub fn try_get_char(&mut self, c: char) -> bool {
        let mut buf = [0u8; 4];
        self.try_get(c.encode_utf8(&mut buf))
    }

    fn run_at(&self, at: usize, predicate: &impl Fn(char) -> bool) -> usize {
        let mut end = at;
        while self.buffer.get(end).is_some_and(|&c| predicate(c)) {
            end += 1;
        }
        end
    }

    /// Consume the longest non-empty run of characters satisfying
    /// `predicate`, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] naming `description` if the next
    /// character does not satisfy `predicate`.
    pub fn expect_while(
        &mut self,
        description: &str,
        predicate: impl Fn(char) -> bool,
    ) -> Result<&str> {
        let at = self.token_start();
        let end = self.run_at(at, &predicate);
        if end == at {
            return Err(self.unexpected(at, description));
        }
        self.commit(end, self.buffer[at..end].iter().collect());
        Ok(&self.current_match)
    }

    /// Consume the longest non-empty run satisfying `predicate`, if any.
    pub fn try_get_while(&mut self, predicate: impl Fn(char) -> bool) -> Option<String> {
        let at = self.token_start();
        let end = self.run_at(at, &predicate);
        (end > at).then(|| {
            self.commit(end, self.buffer[at..end].iter().collect());
            self.current_match.clone()
        })
    }

    /// Consume a non-empty run of characters in any of `classes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] if the next character is in none
    /// of them.
    pub fn expect_class(&mut self, classes: CharClass) -> Result<&str> {
        self.expect_while("a character of the required class", |c| {
            chars::is(c, classes)
        })
    }

    /// Consume a run of ASCII letters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] if the next character is not a
    /// letter.
    pub fn expect_alpha(&mut self) -> Result<&str> {
        self.expect_while("a letter", |c| chars::is(c, CharClass::ALPHA))
    }

    fn pattern_at(&self, pattern: &impl Pattern) -> (usize, Option<PatternMatch>) {
        let at = self.token_start();
        (at, pattern.scan(&self.buffer, at))
    }

    /// Consume whatever `pattern` recognises, returning its result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] if the pattern does not match.
    pub fn expect_pattern(&mut self, pattern: &impl Pattern) -> Result<String> {
        match self.pattern_at(pattern) {
            (_, Some(m)) => {
                self.commit(m.end, m.result.clone());
                Ok(m.result)
            }
            (at, None) => Err(self.unexpected(at, pattern.description())),
        }
    }

    /// Consume whatever `pattern` recognises, if it matches.
    pub fn try_get_pattern(&mut self, pattern: &impl Pattern) -> Option<String> {
        let (_, found) = self.pattern_at(pattern);
        found.map(|m| {
            self.commit(m.end, m.result.clone());
            m.result
        })
    }

    /// Consume a number. See [`Number`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] if no number is next.
    pub fn expect_number(&mut self, require_whitespace_terminator: bool) -> Result<String> {
        self.expect_pattern(
            &Number::new().require_whitespace_terminator(require_whitespace_terminator),
        )
    }

    /// Consume a number if one is next. See [`Number`].
    pub fn try_get_number(&mut self, require_whitespace_terminator: bool) -> Option<String> {
        self.try_get_pattern(
            &Number::new().require_whitespace_terminator(require_whitespace_terminator),
        )
    }

    /// Consume a `"` or `'` quoted string, returning its contents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] if no terminated quoted string is
    /// next.
    pub fn expect_quoted(&mut self) -> Result<String> {
        self.expect_pattern(&Quoted)
    }

    /// Consume a quoted value, or an unquoted one ending at whitespace or
    /// any of `terminators`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] if neither form is next.
    pub fn expect_optionally_quoted(&mut self, terminators: &[char]) -> Result<String> {
        self.expect_pattern(&OptionallyQuoted::new(terminators.iter().copied()))
    }

    /// Consume a span bounded by the bracket or quote under the position
    /// and its counterpart, returning the content between them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] if no bracket or quote is next or
    /// the span is not terminated.
    pub fn expect_bounded(&mut self, allow_quoting: bool) -> Result<String> {
        self.expect_pattern(&Bounded::new().honor_inner_quotes(allow_quoting))
    }

    /// Consume a span from `start` to the matching `end`, returning the
    /// content between them. With `allow_quoting`, quoted text inside the
    /// span may contain `end`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] if `start` is not next or the span
    /// is not terminated.
    pub fn expect_bounded_by(
        &mut self,
        start: char,
        end: char,
        allow_quoting: bool,
    ) -> Result<String> {
        self.expect_pattern(&Bounded::with_bounds(start, end).honor_inner_quotes(allow_quoting))
    }

    /// Like [`Scanner::expect_bounded_by`], without failing.
    pub fn try_get_bounded_by(
        &mut self,
        start: char,
        end: char,
        allow_quoting: bool,
    ) -> Option<String> {
        self.try_get_pattern(&Bounded::with_bounds(start, end).honor_inner_quotes(allow_quoting))
    }

    /// Consume a CSS identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] if no identifier is next.
    pub fn expect_css_identifier(&mut self) -> Result<String> {
        self.expect_pattern(&CssIdentifier)
    }

    /// Consume a CSS identifier if one is next.
    pub fn try_get_css_identifier(&mut self) -> Option<String> {
        self.try_get_pattern(&CssIdentifier)
    }

    /// Consume an HTML attribute name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] if no attribute name is next.
    pub fn expect_attribute_name(&mut self) -> Result<String> {
        self.expect_pattern(&HtmlAttributeName)
    }

    /// Consume an HTML tag name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] if no tag name is next.
    pub fn expect_tag_name(&mut self) -> Result<String> {
        self.expect_pattern(&HtmlTagSelectorName)
    }

    /// Advance to, not past, the next `c`. The skipped text becomes the
    /// match. With `or_end`, a missing `c` advances to the end instead of
    /// failing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScanState`] if `c` does not occur and `or_end` is
    /// false.
    pub fn seek(&mut self, c: char, or_end: bool) -> Result<()> {
        let from = self.position.min(self.buffer.len());
        let end = match self.buffer[from..].iter().position(|&x| x == c) {
            Some(offset) => from + offset,
            None if or_end => self.buffer.len(),
            None => {
                return Err(Error::ScanState {
                    position: self.position,
                    message: format!("'{c}' not found"),
                });
            }
        };
        self.commit(end, self.buffer[from..end].iter().collect());
        Ok(())
    }

    /// Fail unless the whole input has been consumed. Trailing whitespace
    /// counts as consumed when whitespace is being skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScanState`] with `message`, or a default one.
    pub fn assert_finished(&self, message: Option<&str>) -> Result<()> {
        if self.at_end() {
            return Ok(());
        }
        let at = self.token_start();
        Err(Error::ScanState {
            position: at,
            message: message.map_or_else(
                || format!("unexpected trailing input \"{}\"", self.remainder().trim()),
                str::to_string,
            ),
        })
    }

    /// Fail if the whole input has been consumed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScanState`] with `message`, or a default one.
    pub fn assert_not_finished(&self, message: Option<&str>) -> Result<()> {
        let at = self.token_start();
        if at < self.buffer.len() {
            return Ok(());
        }
        Err(Error::ScanState {
            position: at,
            message: message.unwrap_or("unexpected end of input").to_string(),
        })
    }
}
