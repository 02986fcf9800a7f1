use super::{Cursor, Pattern, PatternMatch};
use crate::chars::{self, CharClass};

/// A span enclosed by a bracket or quote pair, e.g. `(a(b)c)` or `[x="]"]`.
///
/// Without explicit bounds, the first character must be an opening bracket
/// or quote and the span ends at its counterpart. Nested pairs of the same
/// bracket are balanced. With inner quotes honored, a quote inside the
/// span hides the closing bound until the same quote character appears
/// again. The result excludes the outer bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounded {
    bounds: Option<(char, char)>,
    honor_inner_quotes: bool,
}

impl Bounded {
    /// Bounds taken from the first character of the input.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bounds: None,
            honor_inner_quotes: false,
        }
    }

    /// Fixed `open` and `close` bounds.
    #[must_use]
    pub const fn with_bounds(open: char, close: char) -> Self {
        Self {
            bounds: Some((open, close)),
            honor_inner_quotes: false,
        }
    }

    /// Whether quotes inside the span suppress the closing bound.
    #[must_use]
    pub const fn honor_inner_quotes(mut self, honor: bool) -> Self {
        self.honor_inner_quotes = honor;
        self
    }

    fn bounds_for(&self, first: char) -> Option<(char, char)> {
        match self.bounds {
            Some((open, close)) => (first == open).then_some((open, close)),
            None if chars::is(first, CharClass::ENCLOSING_OPEN) => {
                chars::closer(first).ok().map(|close| (first, close))
            }
            None => None,
        }
    }
}

impl Pattern for Bounded {
    fn description(&self) -> String {
        match self.bounds {
            Some((open, close)) => format!("a span bounded by '{open}' and '{close}'"),
            None => "a bracketed or quoted span".to_string(),
        }
    }

    fn scan(&self, source: &[char], start: usize) -> Option<PatternMatch> {
        let mut cursor = Cursor::new(source, start);
        let (open, close) = self.bounds_for(cursor.current()?)?;
        cursor.advance();

        let content_start = cursor.index();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        while let Some(c) = cursor.current() {
            if let Some(q) = quote {
                if c == q {
                    quote = None;
                }
            } else if c == close {
                if depth == 0 {
                    let result = cursor.slice(content_start, cursor.index());
                    cursor.advance();
                    return cursor.finish_with(result);
                }
                depth -= 1;
            } else if c == open {
                depth += 1;
            } else if self.honor_inner_quotes && chars::is_quote(c) {
                quote = Some(c);
            }
            cursor.advance();
        }

        // Unterminated.
        None
    }
}
