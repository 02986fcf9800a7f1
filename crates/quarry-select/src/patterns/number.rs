use super::{Cursor, Pattern, PatternMatch};
use crate::chars::{self, CharClass};

/// A decimal number: optional sign, digits, at most one decimal point and
/// optional trailing digits. At least one digit is required.
///
/// When a whitespace terminator is required, a number directly followed by
/// anything other than whitespace or the end of input does not match at
/// all: `12.5px` is rejected rather than read as `12.5`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Number {
    require_whitespace_terminator: bool,
}

impl Number {
    /// A number that may be followed by anything.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            require_whitespace_terminator: false,
        }
    }

    /// Whether the number must be followed by whitespace or end of input.
    #[must_use]
    pub const fn require_whitespace_terminator(mut self, require: bool) -> Self {
        self.require_whitespace_terminator = require;
        self
    }
}

fn is_digit(c: char) -> bool {
    chars::is(c, CharClass::NUMBER)
}

impl Pattern for Number {
    fn description(&self) -> String {
        "a number".to_string()
    }

    fn scan(&self, source: &[char], start: usize) -> Option<PatternMatch> {
        let mut cursor = Cursor::new(source, start);

        if matches!(cursor.current(), Some('+' | '-')) {
            cursor.advance();
        }
        let mut digits = cursor.advance_while(is_digit);
        if cursor.current() == Some('.') {
            cursor.advance();
            digits += cursor.advance_while(is_digit);
        }
        if digits == 0 {
            return None;
        }

        if self.require_whitespace_terminator
            && cursor.current().is_some_and(|c| !chars::is_whitespace(c))
        {
            return None;
        }
        cursor.finish()
    }
}
