//! Character classification for the selector grammars.
//!
//! Every 16-bit code point maps to a [`CharClass`] bitset computed once, on
//! first use, and never modified afterwards. Classification is a single
//! table lookup. Code points above U+FFFF are treated as identifier
//! characters, matching how they behave in CSS names.
//!
//! The classes follow the grammars built on top of them:
//! - [CSS identifiers](https://www.w3.org/TR/CSS21/syndata.html#characters):
//!   `nmstart` / `nmchar`, with the ISO-10646 non-ASCII ranges (surrogates
//!   excluded)
//! - HTML tag and attribute names as they appear inside selectors: the
//!   first character may not be `.` or `:`, later characters may
//! - the selector terminator set: whitespace plus `,:[>~+.#`

use std::ops::{BitOr, BitOrAssign};
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// A set of character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CharClass(u32);

impl CharClass {
    /// No class.
    pub const NONE: Self = Self(0);
    /// Space, tab, line feed, form feed, carriage return.
    pub const WHITESPACE: Self = Self(1);
    /// ASCII letters.
    pub const ALPHA: Self = Self(1 << 1);
    /// ASCII digits.
    pub const NUMBER: Self = Self(1 << 2);
    /// Characters that may appear in a decimal number: digits, `.`, `+`, `-`.
    pub const NUMBER_PART: Self = Self(1 << 3);
    /// Arithmetic and comparison operators.
    pub const OPERATOR: Self = Self(1 << 4);
    /// Characters that open a bounded span: brackets and quotes.
    pub const ENCLOSING_OPEN: Self = Self(1 << 5);
    /// Characters that close a bounded span: brackets and quotes.
    pub const ENCLOSING_CLOSE: Self = Self(1 << 6);
    /// ASCII quotes usable for quoted strings: `"` and `'`.
    pub const QUOTE: Self = Self(1 << 7);
    /// The backslash.
    pub const ESCAPE: Self = Self(1 << 8);
    /// Non-ASCII ISO-10646 characters permitted in CSS names.
    pub const ALPHA_ISO10646: Self = Self(1 << 9);
    /// First character of a CSS identifier (after an optional `-`).
    pub const CSS_IDENT_START: Self = Self(1 << 10);
    /// Any later character of a CSS identifier.
    pub const CSS_IDENT_PART: Self = Self(1 << 11);
    /// First character of an HTML tag name.
    pub const HTML_TAG_NAME_START: Self = Self(1 << 12);
    /// Any later character of an HTML tag name.
    pub const HTML_TAG_NAME_PART: Self = Self(1 << 13);
    /// First character of an HTML attribute name.
    pub const HTML_ATTRIBUTE_NAME_START: Self = Self(1 << 14);
    /// Any later character of an HTML attribute name.
    pub const HTML_ATTRIBUTE_NAME_PART: Self = Self(1 << 15);
    /// Characters that end a simple selector token.
    pub const SELECTOR_TERMINATOR: Self = Self(1 << 16);

    /// Raw bits of the set.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every class in `other` is in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether `self` and `other` share at least one class.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for CharClass {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CharClass {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Open/close pairs recognised as bounds. Quotes close themselves.
const BOUND_PAIRS: [(char, char); 10] = [
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('<', '>'),
    ('"', '"'),
    ('\'', '\''),
    ('\u{201C}', '\u{201D}'), // “ ”
    ('\u{2018}', '\u{2019}'), // ‘ ’
    ('\u{00AB}', '\u{00BB}'), // « »
    ('\u{2039}', '\u{203A}'), // ‹ ›
];

/// Classes given to every code point above U+FFFF.
const ASTRAL: CharClass = CharClass(
    CharClass::ALPHA_ISO10646.0
        | CharClass::CSS_IDENT_START.0
        | CharClass::CSS_IDENT_PART.0
        | CharClass::HTML_TAG_NAME_START.0
        | CharClass::HTML_TAG_NAME_PART.0
        | CharClass::HTML_ATTRIBUTE_NAME_START.0
        | CharClass::HTML_ATTRIBUTE_NAME_PART.0,
);

static TABLE: LazyLock<Box<[CharClass]>> = LazyLock::new(build_table);

fn build_table() -> Box<[CharClass]> {
    let mut table = vec![CharClass::NONE; 0x1_0000].into_boxed_slice();

    let mut set = |chars: &str, class: CharClass| {
        for c in chars.chars() {
            table[c as usize] |= class;
        }
    };
    set(" \t\n\r\u{000C}", CharClass::WHITESPACE);
    set("0123456789", CharClass::NUMBER | CharClass::NUMBER_PART);
    set(".+-", CharClass::NUMBER_PART);
    set("!+-*/%<>=&^|~", CharClass::OPERATOR);
    set("\"'", CharClass::QUOTE);
    set("\\", CharClass::ESCAPE);
    set(" \t\n\r\u{000C},:[>~+.#", CharClass::SELECTOR_TERMINATOR);
    set("_", CharClass::CSS_IDENT_START | CharClass::CSS_IDENT_PART);
    set("-", CharClass::CSS_IDENT_PART);
    set("0123456789", CharClass::CSS_IDENT_PART);
    set(
        "_",
        CharClass::HTML_TAG_NAME_START
            | CharClass::HTML_TAG_NAME_PART
            | CharClass::HTML_ATTRIBUTE_NAME_START
            | CharClass::HTML_ATTRIBUTE_NAME_PART,
    );
    set(
        "0123456789-.:",
        CharClass::HTML_TAG_NAME_PART | CharClass::HTML_ATTRIBUTE_NAME_PART,
    );

    let letter = CharClass::ALPHA
        | CharClass::CSS_IDENT_START
        | CharClass::CSS_IDENT_PART
        | CharClass::HTML_TAG_NAME_START
        | CharClass::HTML_TAG_NAME_PART
        | CharClass::HTML_ATTRIBUTE_NAME_START
        | CharClass::HTML_ATTRIBUTE_NAME_PART;
    for c in ('a'..='z').chain('A'..='Z') {
        table[c as usize] |= letter;
    }

    // ISO-10646 above Latin-1 controls; the surrogate block and the two
    // noncharacters at the top of the plane are left out.
    for code in (0x00A1..0xD800).chain(0xE000..0xFFFE) {
        table[code] |= ASTRAL;
    }

    for (open, close) in BOUND_PAIRS {
        table[open as usize] |= CharClass::ENCLOSING_OPEN;
        table[close as usize] |= CharClass::ENCLOSING_CLOSE;
    }

    table
}

/// The classes of `c`.
#[must_use]
pub fn class_of(c: char) -> CharClass {
    TABLE.get(c as usize).copied().unwrap_or(ASTRAL)
}

/// Whether `c` belongs to any of the classes in `classes`.
#[must_use]
pub fn is(c: char, classes: CharClass) -> bool {
    class_of(c).intersects(classes)
}

/// Whether `c` is selector whitespace.
#[must_use]
pub fn is_whitespace(c: char) -> bool {
    is(c, CharClass::WHITESPACE)
}

/// Whether `c` is an ASCII quote (`"` or `'`).
#[must_use]
pub fn is_quote(c: char) -> bool {
    is(c, CharClass::QUOTE)
}

/// The character that closes a span opened by `open`.
///
/// # Errors
///
/// Returns [`Error::NotABracket`] if `open` is not an opening bracket or
/// quote.
pub fn closer(open: char) -> Result<char> {
    BOUND_PAIRS
        .iter()
        .find(|(o, _)| *o == open)
        .map(|&(_, close)| close)
        .ok_or(Error::NotABracket(open))
}

/// The counterpart of a bracket or quote, in either direction:
/// `(` gives `)` and `)` gives `(`. Symmetric quotes give themselves.
///
/// # Errors
///
/// Returns [`Error::NotABracket`] if `c` is neither an opening nor a
/// closing bound.
pub fn matching_bound(c: char) -> Result<char> {
    BOUND_PAIRS
        .iter()
        .find_map(|&(open, close)| {
            if open == c {
                Some(close)
            } else if close == c {
                Some(open)
            } else {
                None
            }
        })
        .ok_or(Error::NotABracket(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminators_include_whitespace_and_selector_punctuation() {
        for c in " \t\n,:[>~+.#".chars() {
            assert!(is(c, CharClass::SELECTOR_TERMINATOR), "{c:?}");
        }
        for c in "a0-_]()".chars() {
            assert!(!is(c, CharClass::SELECTOR_TERMINATOR), "{c:?}");
        }
    }

    #[test]
    fn test_surrogate_gap_is_unclassified() {
        assert!(class_of('\u{D7FF}').contains(CharClass::ALPHA_ISO10646));
        assert!(class_of('\u{E000}').contains(CharClass::ALPHA_ISO10646));
        assert!(TABLE[0xD800].is_empty());
        assert!(TABLE[0xDFFF].is_empty());
    }

    #[test]
    fn test_astral_characters_are_identifier_characters() {
        assert!(is('\u{1F600}', CharClass::CSS_IDENT_START));
        assert!(!is('\u{1F600}', CharClass::WHITESPACE));
    }
}
