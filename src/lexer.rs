//! Scanner for parenthesis-free subexpressions.
//!
//! By the time text reaches this module the parenthesis driver has stripped
//! every group, so the scanner only ever sees a flat fragment. It walks the
//! fragment with an explicit set of recognition rules, tried in a fixed
//! priority order: number literal (including scientific notation), the
//! `INF`/`NaN` sentinels, the constant `pi`, a function application (whose
//! numeric argument is consumed and evaluated in place), the constant `e`,
//! a configured variable, and finally the five operator characters.
//!
//! Anything that matches no rule classifies the failure: if the fragment
//! contains a character outside the recognized vocabulary the error is
//! `InvalidCharacter`, otherwise `SyntaxError`.

extern crate alloc;

use alloc::collections::BTreeSet;

#[cfg(not(test))]
use crate::{String, Vec};
#[cfg(test)]
use std::string::String;
#[cfg(test)]
use std::vec::Vec;

use crate::Real;
use crate::constants;
use crate::error::{ErrorKind, Result};
use crate::functions::MathFunction;
use crate::types::{BinaryOp, Token, VariableMap};

/// Words recognized case-insensitively as IEEE sentinels.
const WORD_SENTINELS: [&str; 2] = ["inf", "nan"];

/// The scanner struct, which produces typed tokens from a flat fragment.
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    variables: &'a VariableMap,
    valid_names: &'a BTreeSet<char>,
}

/// Scans a parenthesis-free subexpression into a token sequence.
///
/// Variables are resolved against `variables` (a name without a binding is
/// a `VariableError`); constants, sentinels, and function results are
/// resolved to numbers, so the output holds only numbers and operators.
pub fn scan(
    expr: &str,
    variables: &VariableMap,
    valid_names: &BTreeSet<char>,
) -> Result<Vec<Token>> {
    let mut scanner = Scanner {
        input: expr,
        pos: 0,
        variables,
        valid_names,
    };
    let mut tokens = Vec::new();
    while let Some(token) = scanner.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

impl<'a> Scanner<'a> {
    /// Peek at the current character.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Peek `n` characters past the current position.
    fn peek_at(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    /// Advance the position by one character.
    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// The character immediately before the cursor is not part of an
    /// identifier, so a word rule may start here. `5pi` fails this; the
    /// adjacency is reported by sign folding instead.
    fn at_word_boundary(&self) -> bool {
        self.input[..self.pos]
            .chars()
            .next_back()
            .is_none_or(|p| !p.is_ascii_alphanumeric())
    }

    fn next_is_ident(&self, offset: usize) -> bool {
        self.peek_at(offset)
            .is_some_and(|c| c.is_ascii_alphanumeric())
    }

    /// Case-sensitive word match with a trailing word boundary.
    fn matches_word(&self, word: &str) -> bool {
        self.input[self.pos..].starts_with(word)
            && !self.next_is_ident(word.len())
    }

    /// Case-insensitive word match with a trailing word boundary.
    fn matches_word_ci(&self, word: &str) -> bool {
        let mut it = self.input[self.pos..].chars();
        for wc in word.chars() {
            match it.next() {
                Some(c) if c.to_ascii_lowercase() == wc => {}
                _ => return false,
            }
        }
        !matches!(it.next(), Some(n) if n.is_ascii_alphanumeric())
    }

    fn match_function(&self) -> Option<MathFunction> {
        MathFunction::ALL.into_iter().find(|func| {
            let name = func.name();
            // Digits may follow directly (they begin the argument), letters
            // may not.
            self.input[self.pos..].starts_with(name)
                && !self
                    .peek_at(name.len())
                    .is_some_and(|n| n.is_ascii_alphabetic())
        })
    }

    /// Get the next token from the input.
    fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        // Number literal, possibly with a leading dot or an exponent part.
        if c.is_ascii_digit()
            || (c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()))
        {
            return self.number().map(Some);
        }

        let boundary = self.at_word_boundary();

        if boundary {
            if self.matches_word_ci("inf") {
                self.advance_by(3);
                return Ok(Some(Token::Number(Real::INFINITY)));
            }
            if self.matches_word_ci("nan") {
                self.advance_by(3);
                return Ok(Some(Token::Number(Real::NAN)));
            }
            if self.matches_word("pi") {
                self.advance_by(2);
                return Ok(Some(Token::Number(constants::PI)));
            }
            if c.is_ascii_lowercase() {
                if let Some(func) = self.match_function() {
                    self.advance_by(func.name().len());
                    return self.function_argument(func).map(Some);
                }
            }
            // Euler's number: a bare lowercase `e` that is not glued to an
            // identifier. An `e` directly after a digit is a failed
            // exponent marker, not the constant.
            if c == 'e' && !self.next_is_ident(1) {
                self.advance();
                return Ok(Some(Token::Number(constants::E)));
            }
            // Variable references are live only once bindings exist.
            if !self.variables.is_empty()
                && self.valid_names.contains(&c)
                && !self.next_is_ident(1)
            {
                self.advance();
                return match self.variables.get(&c) {
                    Some(&value) => Ok(Some(Token::Number(value))),
                    None => Err(ErrorKind::VariableError),
                };
            }
        }

        if let Some(op) = BinaryOp::from_char(c) {
            self.advance();
            return Ok(Some(Token::Operator(op)));
        }

        Err(self.classify_residual())
    }

    /// Number literal: digits with at most one dot, then an optional
    /// `e|E [+|-] digits` exponent. The exponent is folded into the literal
    /// only when its digits are actually present; otherwise the literal
    /// ends before the marker and the marker is left for the word rules.
    fn number(&mut self) -> Result<Token> {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if self.peek().is_some_and(|m| m == 'e' || m == 'E') {
            let mut offset = 1;
            if self.peek_at(offset).is_some_and(|s| s == '+' || s == '-') {
                offset += 1;
            }
            if self.peek_at(offset).is_some_and(|d| d.is_ascii_digit()) {
                self.advance_by(offset + 1);
                while self.peek().is_some_and(|d| d.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        self.input[start..self.pos]
            .parse::<Real>()
            .map(Token::Number)
            .map_err(|_| ErrorKind::SyntaxError)
    }

    /// Consumes and evaluates a function argument in place.
    ///
    /// The argument is one optional sign followed by a digit/dot run (one
    /// dot at most) or an `inf`/`nan` sentinel; whitespace is allowed only
    /// before the digits. Anything else ends the argument, and an empty
    /// argument is a syntax error.
    fn function_argument(&mut self, func: MathFunction) -> Result<Token> {
        let mut negative = false;
        let mut seen_sign = false;
        let mut seen_dot = false;
        let mut digits = String::new();

        while let Some(c) = self.peek() {
            if (c == '+' || c == '-') && !seen_sign && digits.is_empty() && !seen_dot {
                seen_sign = true;
                negative = c == '-';
                self.advance();
            } else if c.is_ascii_digit() {
                digits.push(c);
                self.advance();
            } else if c == '.' && !seen_dot {
                digits.push('.');
                seen_dot = true;
                self.advance();
            } else if c.is_whitespace() && digits.is_empty() && !seen_dot {
                self.advance();
            } else {
                break;
            }
        }

        let magnitude = if digits.is_empty() && !seen_dot {
            if self.matches_word_ci("inf") {
                self.advance_by(3);
                Real::INFINITY
            } else if self.matches_word_ci("nan") {
                self.advance_by(3);
                Real::NAN
            } else {
                return Err(ErrorKind::SyntaxError);
            }
        } else {
            digits.parse::<Real>().map_err(|_| ErrorKind::SyntaxError)?
        };

        let arg = if negative { -magnitude } else { magnitude };
        Ok(Token::Number(func.apply(arg)))
    }

    /// Decides the error kind for an unclassifiable fragment: a character
    /// outside the recognized vocabulary makes it `InvalidCharacter`,
    /// anything else is a plain `SyntaxError`.
    fn classify_residual(&self) -> ErrorKind {
        for c in self.input.chars() {
            if !self.is_recognized_char(c) {
                return ErrorKind::InvalidCharacter;
            }
        }
        ErrorKind::SyntaxError
    }

    fn is_recognized_char(&self, c: char) -> bool {
        c.is_ascii_digit()
            || matches!(c, '.' | '+' | '-' | '*' | '/' | '^' | '(' | ')')
            || c.is_whitespace()
            || (c.is_ascii_lowercase() && is_vocabulary_letter(c))
            || (c.is_ascii_uppercase()
                && (c == 'E' || is_sentinel_letter(c.to_ascii_lowercase())))
            || self.valid_names.contains(&c)
    }
}

fn is_vocabulary_letter(c: char) -> bool {
    MathFunction::ALL.iter().any(|f| f.name().contains(c))
        || "pi".contains(c)
        || c == 'e'
        || is_sentinel_letter(c)
}

fn is_sentinel_letter(c: char) -> bool {
    WORD_SENTINELS.iter().any(|w| w.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet as StdBTreeSet;

    fn names() -> StdBTreeSet<char> {
        ['x', 'y', 'z', 'a', 'b'].into_iter().collect()
    }

    fn scan_flat(expr: &str) -> Result<Vec<Token>> {
        scan(expr, &VariableMap::new(), &names())
    }

    #[test]
    fn scans_numbers_and_operators() {
        let tokens = scan_flat("1 + 2.5 * 10 ^ 2 / 4 - .5").unwrap();
        assert_eq!(tokens.len(), 11);
        assert_eq!(tokens[0], Token::Number(1.0));
        assert_eq!(tokens[1], Token::Operator(BinaryOp::Add));
        assert_eq!(tokens[2], Token::Number(2.5));
        assert_eq!(tokens[10], Token::Number(0.5));
    }

    #[test]
    fn scans_scientific_notation() {
        assert_eq!(scan_flat("5E+1").unwrap(), [Token::Number(50.0)]);
        assert_eq!(scan_flat(".5e+5").unwrap(), [Token::Number(50000.0)]);
        // Trailing dot literals parse too.
        assert_eq!(scan_flat("5.").unwrap(), [Token::Number(5.0)]);
    }

    #[test]
    fn exponent_marker_needs_digits() {
        // `2e` is a failed exponent, not the number 2 and the constant e.
        assert_eq!(scan_flat("2e"), Err(ErrorKind::SyntaxError));
        // A capital E never stands alone.
        assert_eq!(scan_flat("1 * E1"), Err(ErrorKind::SyntaxError));
    }

    #[test]
    fn constants_need_word_boundaries() {
        let tokens = scan_flat("pi * e").unwrap();
        assert_eq!(tokens[0], Token::Number(crate::constants::PI));
        assert_eq!(tokens[2], Token::Number(crate::constants::E));
        // `5E+1+e`: the literal folds its exponent, the bare e is Euler's.
        let tokens = scan_flat("5E+1 + e").unwrap();
        assert_eq!(tokens[0], Token::Number(50.0));
        assert_eq!(tokens[2], Token::Number(crate::constants::E));
    }

    #[test]
    fn sentinels_are_case_insensitive() {
        let tokens = scan_flat("INF / -Inf").unwrap();
        assert_eq!(tokens[0], Token::Number(f64::INFINITY));
        assert_eq!(tokens[2], Token::Operator(BinaryOp::Sub));
        assert_eq!(tokens[3], Token::Number(f64::INFINITY));
        let tokens = scan_flat("NaN").unwrap();
        assert!(matches!(tokens[0], Token::Number(v) if v.is_nan()));
    }

    #[test]
    fn functions_consume_their_argument() {
        assert_eq!(scan_flat("sqrt 9").unwrap(), [Token::Number(3.0)]);
        assert_eq!(scan_flat("abs -5").unwrap(), [Token::Number(5.0)]);
        assert_eq!(
            scan_flat("log 0").unwrap(),
            [Token::Number(f64::NEG_INFINITY)]
        );
        let tokens = scan_flat("sqrt -INF").unwrap();
        assert!(matches!(tokens[0], Token::Number(v) if v.is_nan()));
        // Missing argument.
        assert_eq!(scan_flat("sin *"), Err(ErrorKind::SyntaxError));
        assert_eq!(scan_flat("sin"), Err(ErrorKind::SyntaxError));
    }

    #[test]
    fn variables_resolve_only_with_bindings() {
        let mut vars = VariableMap::new();
        vars.insert('x', -4.0).unwrap();
        let tokens = scan("x", &vars, &names()).unwrap();
        assert_eq!(tokens, [Token::Number(-4.0)]);
        // Bound map, unbound name.
        assert_eq!(scan("y", &vars, &names()), Err(ErrorKind::VariableError));
        // No bindings at all: the variable rule is inactive.
        assert_eq!(scan_flat("y"), Err(ErrorKind::SyntaxError));
    }

    #[test]
    fn residual_classification() {
        assert_eq!(scan_flat("_"), Err(ErrorKind::InvalidCharacter));
        assert_eq!(scan_flat("1 $ 2"), Err(ErrorKind::InvalidCharacter));
        // Uppercase X is outside the vocabulary even when x is a variable.
        let mut vars = VariableMap::new();
        vars.insert('x', 4.0).unwrap();
        assert_eq!(scan("X", &vars, &names()), Err(ErrorKind::InvalidCharacter));
        // A lone dot is in the vocabulary but matches no rule.
        assert_eq!(scan_flat("."), Err(ErrorKind::SyntaxError));
    }
}
