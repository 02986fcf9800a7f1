//! Single-purpose grammars the [`Scanner`](crate::scanner::Scanner) can
//! expect at its current position.
//!
//! Each attempt runs a fresh [`Cursor`] over the source from one start
//! index; a pattern value itself only holds configuration and can be
//! reused for any number of attempts. An attempt either produces a
//! [`PatternMatch`] that consumed at least one character or nothing.

mod bounded;
mod names;
mod number;
mod quoted;

pub use bounded::Bounded;
pub use names::{CssIdentifier, HtmlAttributeName, HtmlTagSelectorName};
pub use number::Number;
pub use quoted::{OptionallyQuoted, Quoted};

/// The outcome of a successful pattern attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Index of the first consumed character.
    pub start: usize,
    /// Index one past the last consumed character. Always greater than
    /// `start`.
    pub end: usize,
    /// The value the pattern extracted. Delimiters such as quotes or
    /// brackets are not part of it.
    pub result: String,
}

/// A grammar recognised at a fixed start position.
pub trait Pattern {
    /// Human readable name used in "expected ..." diagnostics.
    fn description(&self) -> String;

    /// Try to match at `start`. Returns `None` when nothing matches; a
    /// match never consumes zero characters.
    fn scan(&self, source: &[char], start: usize) -> Option<PatternMatch>;
}

/// Per-attempt state: the source, where the attempt began and how far it
/// has read.
#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    source: &'a [char],
    start: usize,
    index: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) const fn new(source: &'a [char], start: usize) -> Self {
        Self {
            source,
            start,
            index: start,
        }
    }

    /// The character under the cursor.
    pub(crate) fn current(&self) -> Option<char> {
        self.source.get(self.index).copied()
    }

    pub(crate) const fn advance(&mut self) {
        self.index += 1;
    }

    /// Advance while `predicate` holds, returning how many characters were
    /// consumed.
    pub(crate) fn advance_while(&mut self, predicate: impl Fn(char) -> bool) -> usize {
        let from = self.index;
        while self.current().is_some_and(&predicate) {
            self.advance();
        }
        self.index - from
    }

    pub(crate) const fn index(&self) -> usize {
        self.index
    }

    /// Finish the attempt with the span `[start, index)` as the result.
    pub(crate) fn finish(self) -> Option<PatternMatch> {
        let result = self.source[self.start..self.index].iter().collect();
        self.finish_with(result)
    }

    /// Finish the attempt with an explicit result.
    pub(crate) fn finish_with(self, result: String) -> Option<PatternMatch> {
        (self.index > self.start).then_some(PatternMatch {
            start: self.start,
            end: self.index,
            result,
        })
    }

    /// Characters in `[from, to)` as a string.
    pub(crate) fn slice(&self, from: usize, to: usize) -> String {
        self.source[from..to].iter().collect()
    }
}

/// Run `pattern` over `text` from its first character. Convenience for
/// callers that hold a string rather than a scanner.
#[must_use]
pub fn match_str(pattern: &impl Pattern, text: &str) -> Option<PatternMatch> {
    let source: Vec<char> = text.chars().collect();
    pattern.scan(&source, 0)
}
