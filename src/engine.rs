//! The evaluation session and the parenthesis-resolution driver.
//!
//! A [`FormulaParser`] holds the original text and the session
//! configuration (precision, variable bindings, variable alphabet);
//! [`FormulaParser::evaluate`] owns all mutable working state locally, so a
//! session can be evaluated repeatedly — or shared between threads — and
//! always produces the same result for the same configuration.
//!
//! Evaluation runs the precondition checks in their fixed priority order,
//! normalizes the text, then repeatedly locates the leftmost innermost
//! parenthesis pair, reduces its interior to a number, and substitutes the
//! rendered value back into the working text. A negative group value
//! directly followed by `^` takes the exponent-correction path, so
//! `(-2)^4` is `16` rather than the `-16` a naive substitution would
//! produce.

extern crate alloc;

use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};

#[cfg(not(test))]
use crate::Vec;
#[cfg(test)]
use std::vec::Vec;

use crate::Real;
use crate::error::{ErrorKind, Result};
use crate::eval::eval_subexpression;
use crate::functions::{self, MathFunction};
use crate::normalizer::normalize;
use crate::types::VariableMap;

/// Decimal places used by [`interp`] when no precision is given.
pub const DEFAULT_PRECISION: u32 = 4;

/// One evaluation session: a formula, a rounding precision, and the
/// variable configuration.
///
/// ```
/// use formula_rs::FormulaParser;
///
/// let mut parser = FormulaParser::new("x^2 + 1", 4);
/// parser.set_variables(&[('x', 3.0)]);
/// assert_eq!(parser.evaluate(), Ok(10.0));
/// ```
#[derive(Debug, Clone)]
pub struct FormulaParser {
    formula: String,
    precision: u32,
    variables: VariableMap,
    valid_names: BTreeSet<char>,
}

/// Evaluates a formula in one shot at [`DEFAULT_PRECISION`].
pub fn interp(formula: &str) -> Result<Real> {
    FormulaParser::new(formula, DEFAULT_PRECISION).evaluate()
}

impl FormulaParser {
    /// Creates a session for `formula`, rounding results to `precision`
    /// decimal places. The variable alphabet starts as `{x, y, z, a, b}`
    /// with no bindings.
    pub fn new(formula: &str, precision: u32) -> Self {
        FormulaParser {
            formula: String::from(formula),
            precision,
            variables: VariableMap::new(),
            valid_names: ['x', 'y', 'z', 'a', 'b'].into_iter().collect(),
        }
    }

    /// Replaces the variable bindings.
    pub fn set_variables(&mut self, bindings: &[(char, Real)]) {
        self.variables = VariableMap::new();
        for &(name, value) in bindings {
            let _ = self.variables.insert(name, value);
        }
    }

    /// Replaces the variable alphabet. Each name must be a single
    /// lowercase letter other than `e`; the configuration is validated
    /// when [`evaluate`](Self::evaluate) runs.
    pub fn set_valid_variable_names(&mut self, names: &[char]) {
        self.valid_names = names.iter().copied().collect();
    }

    /// The original formula text, verbatim.
    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// Parses and evaluates the formula.
    ///
    /// `Ok` carries the rounded result; the IEEE sentinels `INF`, `-INF`,
    /// and `NaN` are valid results and are returned unrounded. Calling
    /// this again on an unchanged session returns the same value.
    pub fn evaluate(&self) -> Result<Real> {
        let trimmed = self.formula.trim();
        if trimmed.is_empty() {
            return Err(ErrorKind::EmptyInput);
        }
        self.check_variable_config()?;
        check_parenthesis_balance(trimmed)?;
        check_structure(trimmed)?;

        let mut working = normalize(trimmed, &self.valid_names);
        let mut search_from = 0;

        while let Some((open, close)) = find_innermost(&working, search_from) {
            let value = {
                let interior = &working[open + 1..close];
                if interior.trim().is_empty() {
                    return Err(ErrorKind::SyntaxError);
                }
                eval_subexpression(interior, &self.variables, &self.valid_names)?
            };

            let caret = match next_nonspace(&working, close + 1) {
                Some((at, '^')) if value < 0.0 => Some(at),
                _ => None,
            };

            if let Some(caret) = caret {
                match exponent_literal(&working, caret)? {
                    Some(exp) => {
                        let factor: Real = if exp.odd { -1.0 } else { 1.0 };
                        let corrected =
                            factor * functions::pow(functions::fabs(value), exp.value);
                        working.replace_range(open..exp.end, &render_number(corrected));
                        search_from = 0;
                    }
                    None if working[close..].contains('(') => {
                        // The exponent is itself a group (or contains one).
                        // Reduce the next group to the right first; the
                        // exponent becomes a literal after finitely many
                        // substitutions.
                        search_from = close + 1;
                    }
                    None => {
                        working.replace_range(open..=close, &render_number(value));
                        search_from = 0;
                    }
                }
            } else {
                working.replace_range(open..=close, &render_number(value));
                search_from = 0;
            }
        }

        let value = eval_subexpression(&working, &self.variables, &self.valid_names)?;
        Ok(round_result(value, self.precision))
    }

    fn check_variable_config(&self) -> Result<()> {
        for &name in &self.valid_names {
            // `e` is reserved for Euler's number.
            if !name.is_ascii_lowercase() || name == 'e' {
                return Err(ErrorKind::VariableError);
            }
        }
        Ok(())
    }
}

fn check_parenthesis_balance(text: &str) -> Result<()> {
    let opens = text.chars().filter(|&c| c == '(').count();
    let closes = text.chars().filter(|&c| c == ')').count();
    if opens == closes {
        Ok(())
    } else {
        Err(ErrorKind::MismatchedParentheses)
    }
}

/// Structural scan of the raw text: a close parenthesis may only be
/// followed by another close or an operator, `()` groups must not be
/// empty, and an open parenthesis may only follow an operator, another
/// open, or the final letter of a recognized function name.
fn check_structure(text: &str) -> Result<()> {
    let chars: Vec<char> = text.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        match c {
            ')' => {
                if let Some(&next) = chars[i + 1..].iter().find(|n| !n.is_whitespace()) {
                    if !matches!(next, ')' | '+' | '-' | '*' | '/' | '^') {
                        return Err(ErrorKind::SyntaxError);
                    }
                }
            }
            '(' => {
                if let Some(&next) = chars[i + 1..].iter().find(|n| !n.is_whitespace()) {
                    if next == ')' {
                        return Err(ErrorKind::SyntaxError);
                    }
                }
                if let Some(&prev) = chars[..i].iter().rev().find(|p| !p.is_whitespace()) {
                    let allowed = matches!(prev, '(' | '+' | '-' | '*' | '/' | '^')
                        || is_function_terminal(prev);
                    if !allowed {
                        return Err(ErrorKind::SyntaxError);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn is_function_terminal(c: char) -> bool {
    MathFunction::ALL.iter().any(|f| f.name().ends_with(c))
}

/// Locates the leftmost innermost parenthesis pair at or after `from`:
/// the last `(` seen before the first `)` that closes anything.
fn find_innermost(text: &str, from: usize) -> Option<(usize, usize)> {
    let mut last_open = None;
    for (offset, c) in text[from..].char_indices() {
        match c {
            '(' => last_open = Some(from + offset),
            ')' => {
                if let Some(open) = last_open {
                    return Some((open, from + offset));
                }
            }
            _ => {}
        }
    }
    None
}

fn next_nonspace(text: &str, from: usize) -> Option<(usize, char)> {
    text[from..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(offset, c)| (from + offset, c))
}

struct ExponentLiteral {
    value: Real,
    odd: bool,
    /// Byte index one past the last exponent digit.
    end: usize,
}

/// Reads the literal exponent following the `^` at `caret`: one optional
/// sign, then digits. A decimal point makes the exponent fractional, which
/// the correction rejects. Returns `None` when no literal digits are there
/// yet (the exponent is still a group to be reduced).
fn exponent_literal(text: &str, caret: usize) -> Result<Option<ExponentLiteral>> {
    let mut negative = false;
    let mut seen_sign = false;
    let mut digits = String::new();
    let mut last_digit = '0';
    let mut end = caret + 1;

    for (offset, c) in text[caret + 1..].char_indices() {
        if c.is_whitespace() {
            if digits.is_empty() {
                continue;
            }
            break;
        }
        if (c == '+' || c == '-') && !seen_sign && digits.is_empty() {
            seen_sign = true;
            negative = c == '-';
            continue;
        }
        if c.is_ascii_digit() {
            digits.push(c);
            last_digit = c;
            end = caret + 1 + offset + 1;
            continue;
        }
        if c == '.' {
            return Err(ErrorKind::SyntaxError);
        }
        break;
    }

    if digits.is_empty() {
        return Ok(None);
    }
    let magnitude: Real = digits.parse().map_err(|_| ErrorKind::SyntaxError)?;
    Ok(Some(ExponentLiteral {
        value: if negative { -magnitude } else { magnitude },
        odd: last_digit.to_digit(10).unwrap_or(0) % 2 == 1,
        end,
    }))
}

fn render_number(value: Real) -> String {
    if value.is_nan() {
        String::from("NaN")
    } else if value == Real::INFINITY {
        String::from("INF")
    } else if value == Real::NEG_INFINITY {
        String::from("-INF")
    } else {
        value.to_string()
    }
}

/// Rounds a finite result to `precision` decimal places, half away from
/// zero. Values that render in exponential notation (decimal exponent of
/// 15 and above, or -5 and below) round the mantissa only, since rounding
/// decimals of the full value would be meaningless there. Sentinels pass
/// through untouched.
fn round_result(value: Real, precision: u32) -> Real {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    let magnitude = functions::floor(functions::log10(functions::fabs(value)));
    if magnitude >= 15.0 || magnitude <= -5.0 {
        let scale = functions::pow(10.0, magnitude);
        round_decimals(value / scale, precision) * scale
    } else {
        round_decimals(value, precision)
    }
}

fn round_decimals(value: Real, precision: u32) -> Real {
    let factor = functions::pow(10.0, precision as Real);
    functions::round(value * factor) / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_innermost_prefers_leftmost_deepest() {
        assert_eq!(find_innermost("( 1 + ( 2 ) + ( 3 ) )", 0), Some((6, 10)));
        assert_eq!(find_innermost("( 1 )", 0), Some((0, 4)));
        assert_eq!(find_innermost("1 + 2", 0), None);
        // A stray close before any open in the window is skipped.
        assert_eq!(find_innermost(") ^ ( 2 )", 0), Some((4, 8)));
    }

    #[test]
    fn structure_check_rejects_malformed_parenthesis_contexts() {
        assert!(check_structure("()").is_err());
        assert!(check_structure(") (").is_err());
        assert!(check_structure("(1+1)5").is_err());
        assert!(check_structure("1.(23)").is_err());
        assert!(check_structure("x(3)").is_err());
        assert!(check_structure("sqrt(9)").is_ok());
        assert!(check_structure("exp((-3)^2)").is_ok());
        assert!(check_structure("10*(3-5)^4/2").is_ok());
    }

    #[test]
    fn exponent_literal_forms() {
        let exp = exponent_literal("^ 4", 0).unwrap().unwrap();
        assert_eq!(exp.value, 4.0);
        assert!(!exp.odd);
        let exp = exponent_literal("^ -3 + 1", 0).unwrap().unwrap();
        assert_eq!(exp.value, -3.0);
        assert!(exp.odd);
        assert_eq!(exp.end, 4);
        // Not yet literal: a group follows.
        assert!(exponent_literal("^ ( 2 )", 0).unwrap().is_none());
        // Fractional exponents are rejected outright.
        assert!(exponent_literal("^ 4.5", 0).is_err());
    }

    #[test]
    fn rounding_plain_and_mantissa() {
        assert_eq!(round_result(7.999999999999999, 4), 8.0);
        assert_eq!(round_result(52.71828182845905, 4), 52.7183);
        assert_eq!(round_result(16.375, 2), 16.38);
        // Mantissa-only rounding for exponential magnitudes.
        let rounded = round_result(9.313225746154785e20, 5);
        assert!((rounded - 9.31323e20).abs() < 1e9);
        let rounded = round_result(3.814697265625e-6, 8);
        assert!((rounded - 3.81469727e-6).abs() < 1e-15);
        // Sentinels pass through.
        assert!(round_result(Real::NAN, 4).is_nan());
        assert_eq!(round_result(Real::INFINITY, 4), Real::INFINITY);
    }

    #[test]
    fn render_number_sentinels() {
        assert_eq!(render_number(Real::INFINITY), "INF");
        assert_eq!(render_number(Real::NEG_INFINITY), "-INF");
        assert_eq!(render_number(Real::NAN), "NaN");
        assert_eq!(render_number(-0.0625), "-0.0625");
    }

    #[test]
    fn variable_config_is_validated_lazily() {
        let mut parser = FormulaParser::new("1+1", 4);
        parser.set_valid_variable_names(&['e']);
        assert_eq!(parser.evaluate(), Err(ErrorKind::VariableError));
        let mut parser = FormulaParser::new("1+1", 4);
        parser.set_valid_variable_names(&['A']);
        assert_eq!(parser.evaluate(), Err(ErrorKind::VariableError));
        let mut parser = FormulaParser::new("q*2", 4);
        parser.set_valid_variable_names(&['q']);
        parser.set_variables(&[('q', 21.0)]);
        assert_eq!(parser.evaluate(), Ok(42.0));
    }
}
