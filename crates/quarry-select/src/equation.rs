//! Arithmetic formulas evaluated by the nth-child matcher.
//!
//! The matcher only needs two things from a formula: which variables it
//! names and its integer value for a given `n`. [`EquationParser`] is the
//! seam where a richer expression engine can be plugged in;
//! [`LinearEquationParser`] covers the `an+b` forms selectors use.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::scanner::Scanner;

/// A parsed formula.
pub trait Equation: fmt::Debug + Send + Sync {
    /// Names of the variables the formula refers to, sorted.
    fn variables(&self) -> Vec<&str>;

    /// Value of the formula with every variable bound to `n`.
    fn evaluate(&self, n: i64) -> i64;
}

/// Turns formula text into an [`Equation`].
pub trait EquationParser: Send + Sync {
    /// Parse `text`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelector`] when `text` is not a well-formed
    /// formula.
    fn parse(&self, text: &str) -> Result<Box<dyn Equation>>;
}

/// A sum of `coefficient * variable` terms plus a constant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearEquation {
    coefficients: BTreeMap<String, i64>,
    constant: i64,
}

impl LinearEquation {
    /// Coefficient of `variable`, zero if absent.
    #[must_use]
    pub fn coefficient(&self, variable: &str) -> i64 {
        self.coefficients.get(variable).copied().unwrap_or(0)
    }

    /// The constant term.
    #[must_use]
    pub const fn constant(&self) -> i64 {
        self.constant
    }
}

impl Equation for LinearEquation {
    fn variables(&self) -> Vec<&str> {
        self.coefficients.keys().map(String::as_str).collect()
    }

    fn evaluate(&self, n: i64) -> i64 {
        self.coefficients
            .values()
            .fold(self.constant, |acc, a| acc.saturating_add(a.saturating_mul(n)))
    }
}

/// Parser for linear formulas: `2n+1`, `-n + 3`, `3*n-2`, `n`, `+5`.
///
/// Coefficients and constants are integers. Any run of letters is a
/// variable name; repeated variables are summed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearEquationParser;

impl LinearEquationParser {
    /// Parse `text` into its concrete [`LinearEquation`].
    ///
    /// # Errors
    ///
    /// Returns an error when `text` is empty, has a dangling operator, a
    /// non-integer number or an integer too large for `i64`.
    pub fn parse_linear(text: &str) -> Result<LinearEquation> {
        let mut scanner = Scanner::new(text).ignoring_whitespace(true);
        scanner.assert_not_finished(Some("empty formula"))?;

        let mut equation = LinearEquation::default();
        let mut first = true;
        while !scanner.at_end() {
            let sign: i64 = if scanner.try_get_char('+') {
                1
            } else if scanner.try_get_char('-') {
                -1
            } else if first {
                1
            } else {
                return Err(scanner.unexpected_here("'+' or '-'"));
            };
            first = false;

            let coefficient = scanner
                .try_get_while(|c| c.is_ascii_digit())
                .map(|digits| {
                    digits.parse::<i64>().map_err(|_| {
                        Error::invalid(format!(
                            "number {digits} in formula \"{text}\" is too large"
                        ))
                    })
                })
                .transpose()?;
            let starred = coefficient.is_some() && scanner.try_get_char('*');
            let variable = scanner.try_get_while(|c| c.is_ascii_alphabetic());

            match (coefficient, variable) {
                (_, Some(name)) => {
                    let term = sign * coefficient.unwrap_or(1);
                    let entry = equation.coefficients.entry(name).or_insert(0);
                    *entry = entry.saturating_add(term);
                }
                (Some(value), None) if !starred => {
                    equation.constant = equation.constant.saturating_add(sign * value);
                }
                _ => return Err(scanner.unexpected_here("a number or variable")),
            }
        }
        Ok(equation)
    }
}

impl EquationParser for LinearEquationParser {
    fn parse(&self, text: &str) -> Result<Box<dyn Equation>> {
        match Self::parse_linear(text) {
            Ok(equation) => Ok(Box::new(equation)),
            Err(error @ Error::InvalidSelector(_)) => Err(error),
            // Scanner errors already carry the position in their message.
            Err(error) => Err(Error::invalid(format!(
                "malformed formula \"{text}\": {error}"
            ))),
        }
    }
}
