use super::{Cursor, Pattern, PatternMatch};
use crate::chars;

/// A string between two identical ASCII quotes, `"..."` or `'...'`.
///
/// There is no escape syntax: the string ends at the first repeat of the
/// opening quote. The result excludes the quotes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quoted;

impl Pattern for Quoted {
    fn description(&self) -> String {
        "a quoted string".to_string()
    }

    fn scan(&self, source: &[char], start: usize) -> Option<PatternMatch> {
        let mut cursor = Cursor::new(source, start);
        let quote = cursor.current().filter(|&c| chars::is_quote(c))?;
        cursor.advance();

        let content_start = cursor.index();
        let _ = cursor.advance_while(|c| c != quote);
        if cursor.current().is_none() {
            return None;
        }

        let result = cursor.slice(content_start, cursor.index());
        cursor.advance();
        cursor.finish_with(result)
    }
}

/// A value that is either quoted, or runs up to whitespace or one of the
/// terminator characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionallyQuoted {
    terminators: Vec<char>,
}

impl OptionallyQuoted {
    /// An unquoted value ends at whitespace or any of `terminators`.
    #[must_use]
    pub fn new(terminators: impl IntoIterator<Item = char>) -> Self {
        Self {
            terminators: terminators.into_iter().collect(),
        }
    }
}

impl Pattern for OptionallyQuoted {
    fn description(&self) -> String {
        "a quoted or unquoted value".to_string()
    }

    fn scan(&self, source: &[char], start: usize) -> Option<PatternMatch> {
        if source.get(start).is_some_and(|&c| chars::is_quote(c)) {
            return Quoted.scan(source, start);
        }

        let mut cursor = Cursor::new(source, start);
        let _ = cursor
            .advance_while(|c| !chars::is_whitespace(c) && !self.terminators.contains(&c));
        cursor.finish()
    }
}
