//! Error types for formula parsing and evaluation.
//!
//! Every failure path in the crate produces an [`ErrorKind`] instead of
//! panicking or raising an exception. The kinds are intentionally coarse:
//! they classify what went wrong so a host application can render a
//! localized message, but they carry no display text of their own beyond a
//! diagnostic `Display` impl.

#[cfg(not(test))]
use core::fmt;
#[cfg(test)]
use std::fmt;

#[cfg(not(test))]
use core::result;
#[cfg(test)]
use std::result;

use serde::{Deserialize, Serialize};

/// Result type used throughout the crate.
///
/// This is a convenience type alias that uses the `ErrorKind` type for the
/// error variant. `Ok` carries a numeric result; note that the IEEE sentinel
/// values `INF`, `-INF`, and `NaN` are valid `Ok` results, not errors.
pub type Result<T> = result::Result<T, ErrorKind>;

/// Classification of an evaluation failure.
///
/// Checks run in a fixed priority order (empty input, then variable
/// configuration, then parenthesis balance, then structure, then
/// arithmetic), and the first failing check decides the kind. The kinds are
/// threaded through every stage as the error variant of [`Result`], so a
/// failure short-circuits the remaining stages and can never be overwritten
/// by a later check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The input contains a symbol outside the recognized vocabulary.
    ///
    /// The vocabulary is digits, the operators `+ - * / ^`, parentheses,
    /// the decimal point, whitespace, the letters of the recognized
    /// constants and functions, and the configured variable names.
    InvalidCharacter,

    /// The formula is blank after trimming whitespace.
    EmptyInput,

    /// The number of opening and closing parentheses differs.
    MismatchedParentheses,

    /// A referenced variable has no binding, or the valid-variable
    /// configuration itself is malformed (a name that is not a single
    /// lowercase letter, or the reserved letter `e`).
    VariableError,

    /// Any other structural problem: misplaced operators, malformed
    /// numbers, empty parenthesis groups, unmatched function arguments,
    /// three or more chained unary minus signs, and so on.
    SyntaxError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidCharacter => write!(
                f,
                "invalid character: only numbers, operators +-*/^, parentheses, \
                 recognized constants, functions and variables are allowed"
            ),
            ErrorKind::EmptyInput => write!(f, "empty formula"),
            ErrorKind::MismatchedParentheses => {
                write!(f, "number of opening and closing parentheses must be equal")
            }
            ErrorKind::VariableError => write!(f, "variable error"),
            ErrorKind::SyntaxError => write!(f, "syntax error"),
        }
    }
}
