//! Errors raised while scanning selector text and compiling selectors.
//!
//! Nothing in this crate recovers from these locally: they propagate to
//! whoever compiles the selector, which reports it as an invalid selector.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the scanner, the pattern grammars and the matchers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An `expect_*` scanner operation found something other than what it
    /// was asked for.
    #[error(
        "unexpected {} at position {position}{}",
        describe_found(.found),
        describe_expected(.expected.as_deref())
    )]
    UnexpectedToken {
        /// Character offset where scanning failed.
        position: usize,
        /// Description of the literal or pattern that was expected.
        expected: Option<String>,
        /// The character found there, `None` at end of input.
        found: Option<char>,
    },

    /// A scanner guard (`assert_finished`, `assert_not_finished`, `seek`)
    /// did not hold.
    #[error("scanner state error at position {position}: {message}")]
    ScanState {
        /// Character offset of the scanner when the guard failed.
        position: usize,
        /// What was wrong.
        message: String,
    },

    /// The selector or nth formula is not acceptable.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// A character that is not a known bracket or quote was asked for its
    /// counterpart. Always a programming error, never user input.
    #[error("'{0}' is not a bracket or quote character")]
    NotABracket(char),
}

fn describe_found(found: &Option<char>) -> String {
    found.map_or_else(|| "end of input".to_string(), |c| format!("character '{c}'"))
}

fn describe_expected(expected: Option<&str>) -> String {
    expected.map_or_else(String::new, |e| format!(", expected {e}"))
}

impl Error {
    /// Shorthand for [`Error::InvalidSelector`].
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidSelector(message.into())
    }
}
