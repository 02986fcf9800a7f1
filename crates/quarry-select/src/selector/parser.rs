//! Selector grammar on top of the [`Scanner`].
//!
//! [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
//!
//! ```text
//! list     := complex ( ',' complex )*
//! complex  := compound ( combinator compound )*
//! compound := ( type | '*' )? ( '#' ident | '.' ident | '[' attr ']' | ':' pseudo )*
//! ```
//!
//! Attribute and pseudo-class arguments are cut out with bounded-by
//! scanning, with quoting honoured, so `[data-x="a]b"]` and
//! `:contains("a)b")` keep their inner delimiters.

use super::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, ParsedSelector, SelectorList,
    SimpleSelector,
};
use crate::engine::SelectorEngine;
use crate::error::{Error, Result};
use crate::scanner::Scanner;

/// Parse a selector group, building pseudo-classes through `engine`.
pub(crate) fn parse_selector_list(engine: &SelectorEngine, text: &str) -> Result<SelectorList> {
    let mut scanner = Scanner::new(text);
    let _ = scanner.skip_whitespace();
    scanner.assert_not_finished(Some("empty selector"))?;

    let mut selectors = Vec::new();
    loop {
        let _ = scanner.skip_whitespace();
        selectors.push(ParsedSelector::new(parse_complex(engine, &mut scanner)?));
        let _ = scanner.skip_whitespace();
        if scanner.finished() {
            break;
        }
        scanner.expect_char(',')?;
    }
    Ok(SelectorList::new(selectors))
}

fn parse_complex(engine: &SelectorEngine, scanner: &mut Scanner) -> Result<ComplexSelector> {
    // Left to right; reversed at the end so the subject comes first.
    let mut compounds = vec![parse_compound(engine, scanner)?];
    let mut combinators = Vec::new();

    loop {
        let spaced = scanner.skip_whitespace();
        let combinator = if scanner.try_get_char('>') {
            Combinator::Child
        } else if scanner.try_get_char('+') {
            Combinator::NextSibling
        } else if scanner.try_get_char('~') {
            Combinator::SubsequentSibling
        } else if spaced && scanner.current().is_some_and(|c| c != ',') {
            Combinator::Descendant
        } else {
            break;
        };
        let _ = scanner.skip_whitespace();
        combinators.push(combinator);
        compounds.push(parse_compound(engine, scanner)?);
    }

    let Some(subject) = compounds.pop() else {
        return Err(scanner.unexpected_here("a selector"));
    };
    Ok(ComplexSelector {
        subject,
        combinators: combinators.into_iter().zip(compounds).rev().collect(),
    })
}

fn parse_compound(engine: &SelectorEngine, scanner: &mut Scanner) -> Result<CompoundSelector> {
    let mut simple_selectors = Vec::new();

    if scanner.try_get_char('*') {
        simple_selectors.push(SimpleSelector::Universal);
    } else if let Some(name) = scanner.try_get_css_identifier() {
        simple_selectors.push(SimpleSelector::Type(name.to_ascii_lowercase()));
    }

    loop {
        let simple = match scanner.current() {
            Some('#') => {
                let _ = scanner.next_char()?;
                SimpleSelector::Id(scanner.expect_css_identifier()?)
            }
            Some('.') => {
                let _ = scanner.next_char()?;
                SimpleSelector::Class(scanner.expect_css_identifier()?)
            }
            Some('[') => {
                let body = scanner.expect_bounded_by('[', ']', true)?;
                SimpleSelector::Attribute(parse_attribute(&body)?)
            }
            Some(':') => {
                let _ = scanner.next_char()?;
                let name = scanner.expect_css_identifier()?;
                let argument = if scanner.current() == Some('(') {
                    Some(scanner.expect_bounded_by('(', ')', true)?)
                } else {
                    None
                };
                SimpleSelector::Pseudo(engine.pseudo(&name, argument.as_deref())?)
            }
            _ => break,
        };
        simple_selectors.push(simple);
    }

    if simple_selectors.is_empty() {
        return Err(scanner.unexpected_here("a selector"));
    }
    Ok(CompoundSelector { simple_selectors })
}

/// Parse the inside of `[...]`: a name, optionally followed by an operator
/// and an optionally quoted value.
///
/// # Errors
///
/// Returns a scanner error for a missing name, an unknown operator, a
/// missing value or trailing input.
pub fn parse_attribute(body: &str) -> Result<AttributeSelector> {
    let mut scanner = Scanner::new(body).ignoring_whitespace(true);
    let name = scanner.expect_attribute_name()?;
    if scanner.at_end() {
        return Ok(AttributeSelector::Exists(name));
    }

    let operators: [(&str, fn(String, String) -> AttributeSelector); 6] = [
        ("~=", AttributeSelector::Includes),
        ("|=", AttributeSelector::DashMatch),
        ("^=", AttributeSelector::PrefixMatch),
        ("$=", AttributeSelector::SuffixMatch),
        ("*=", AttributeSelector::SubstringMatch),
        ("=", AttributeSelector::Equals),
    ];
    let Some(&(_, build)) = operators.iter().find(|(op, _)| scanner.try_get(op)) else {
        return Err(scanner.unexpected_here("an attribute operator"));
    };

    let value = scanner.expect_optionally_quoted(&[])?;
    scanner.assert_finished(None)?;
    Ok(build(name, value))
}

/// The text of a `:contains()` argument: quoted, or the trimmed argument
/// as written.
pub(crate) fn parse_text_argument(argument: &str) -> Result<String> {
    if argument.trim_start().starts_with(['"', '\'']) {
        let mut scanner = Scanner::new(argument).ignoring_whitespace(true);
        let text = scanner.expect_quoted()?;
        scanner.assert_finished(None)?;
        return Ok(text);
    }
    let text = argument.trim();
    if text.is_empty() {
        return Err(Error::invalid(":contains() needs text to search for"));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_operators() {
        assert_eq!(
            parse_attribute("href").unwrap(),
            AttributeSelector::Exists("href".into())
        );
        assert_eq!(
            parse_attribute("lang |= en").unwrap(),
            AttributeSelector::DashMatch("lang".into(), "en".into())
        );
        assert_eq!(
            parse_attribute("a=\"b]c\"").unwrap(),
            AttributeSelector::Equals("a".into(), "b]c".into())
        );
        assert_eq!(
            parse_attribute("data-x*='dark mode'").unwrap(),
            AttributeSelector::SubstringMatch("data-x".into(), "dark mode".into())
        );
    }

    #[test]
    fn test_attribute_errors() {
        assert!(parse_attribute("").is_err());
        assert!(parse_attribute("a !").is_err());
        assert!(parse_attribute("a=").is_err());
        assert!(parse_attribute("a=b c").is_err());
    }

    #[test]
    fn test_text_argument_forms() {
        assert_eq!(parse_text_argument(" foo bar ").unwrap(), "foo bar");
        assert_eq!(parse_text_argument("\"a)b\"").unwrap(), "a)b");
        assert_eq!(parse_text_argument("'x'").unwrap(), "x");
        assert!(parse_text_argument("  ").is_err());
        assert!(parse_text_argument("\"a\" b").is_err());
    }
}
