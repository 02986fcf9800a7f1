use super::{Cursor, Pattern, PatternMatch};
use crate::chars::{self, CharClass};

/// A name made of one start character followed by any number of part
/// characters.
fn scan_name(
    source: &[char],
    start: usize,
    first: CharClass,
    rest: CharClass,
) -> Option<PatternMatch> {
    let mut cursor = Cursor::new(source, start);
    if !cursor.current().is_some_and(|c| chars::is(c, first)) {
        return None;
    }
    cursor.advance();
    let _ = cursor.advance_while(|c| chars::is(c, rest));
    cursor.finish()
}

/// A CSS identifier as used for class names and type selectors:
/// an optional `-`, a letter, `_` or non-ASCII character, then letters,
/// digits, `-`, `_` or non-ASCII characters. Escapes are not supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CssIdentifier;

impl Pattern for CssIdentifier {
    fn description(&self) -> String {
        "a CSS identifier".to_string()
    }

    fn scan(&self, source: &[char], start: usize) -> Option<PatternMatch> {
        let mut cursor = Cursor::new(source, start);
        if cursor.current() == Some('-') {
            cursor.advance();
        }
        if !cursor
            .current()
            .is_some_and(|c| chars::is(c, CharClass::CSS_IDENT_START))
        {
            return None;
        }
        let _ = cursor.advance_while(|c| chars::is(c, CharClass::CSS_IDENT_PART));
        cursor.finish()
    }
}

/// An HTML attribute name inside a selector. It may not start with `:` or
/// `.`, but may contain them (`xml:lang`, `data-v.x`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlAttributeName;

impl Pattern for HtmlAttributeName {
    fn description(&self) -> String {
        "an attribute name".to_string()
    }

    fn scan(&self, source: &[char], start: usize) -> Option<PatternMatch> {
        scan_name(
            source,
            start,
            CharClass::HTML_ATTRIBUTE_NAME_START,
            CharClass::HTML_ATTRIBUTE_NAME_PART,
        )
    }
}

/// An HTML tag name. It may not start with `:` or `.`, but may contain
/// them (`svg:rect`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlTagSelectorName;

impl Pattern for HtmlTagSelectorName {
    fn description(&self) -> String {
        "a tag name".to_string()
    }

    fn scan(&self, source: &[char], start: usize) -> Option<PatternMatch> {
        scan_name(
            source,
            start,
            CharClass::HTML_TAG_NAME_START,
            CharClass::HTML_TAG_NAME_PART,
        )
    }
}
