//! Evaluation of a flat token sequence: unary sign folding followed by
//! staged precedence reduction.
//!
//! Folding collapses runs of unary `+`/`-` into the sign of the following
//! number, leaving a sequence that strictly alternates operand / operator.
//! Reduction then runs one linear left-to-right pass per precedence tier
//! (`^`, then `*` `/`, then `+` `-`); because the alternation is an
//! invariant, each pass is a single sweep with no re-scanning.

extern crate alloc;

use alloc::collections::BTreeSet;

#[cfg(not(test))]
use crate::Vec;
#[cfg(test)]
use std::vec::Vec;

use crate::Real;
use crate::error::{ErrorKind, Result};
use crate::functions;
use crate::lexer;
use crate::types::{BinaryOp, Operand, Token, VariableMap};

/// Scans, folds, and reduces one parenthesis-free subexpression down to a
/// single numeric value.
pub fn eval_subexpression(
    expr: &str,
    variables: &VariableMap,
    valid_names: &BTreeSet<char>,
) -> Result<Real> {
    let tokens = lexer::scan(expr, variables, valid_names)?;
    let (operands, operators) = fold_signs(&tokens)?;
    reduce(operands, operators)
}

/// Collapses unary sign runs.
///
/// Wherever an operand is expected (at the start, or after a binary
/// operator) a run of `+`/`-` folds into a single sign on the following
/// number: two minuses cancel, a lone leading `+` is dropped. A streak of
/// three consecutive minus signs with no number between them is a syntax
/// error, as are adjacent numbers and a run that ends without a number.
pub fn fold_signs(tokens: &[Token]) -> Result<(Vec<Operand>, Vec<BinaryOp>)> {
    let mut operands = Vec::new();
    let mut operators = Vec::new();
    let mut i = 0;
    // A binary minus seeds the streak so `5---2` counts three in a row.
    let mut minus_streak = 0u32;

    loop {
        let mut negative = false;
        while let Some(Token::Operator(op)) = tokens.get(i) {
            match op {
                BinaryOp::Add => minus_streak = 0,
                BinaryOp::Sub => {
                    minus_streak += 1;
                    if minus_streak >= 3 {
                        return Err(ErrorKind::SyntaxError);
                    }
                    negative = !negative;
                }
                _ => return Err(ErrorKind::SyntaxError),
            }
            i += 1;
        }

        let Some(&Token::Number(value)) = tokens.get(i) else {
            // Run without a number: trailing operator or empty input.
            return Err(ErrorKind::SyntaxError);
        };
        let value = if negative { -value } else { value };
        operands.push(Operand::new(value, negative));
        i += 1;

        match tokens.get(i) {
            None => break,
            Some(&Token::Operator(op)) => {
                operators.push(op);
                minus_streak = u32::from(op == BinaryOp::Sub);
                i += 1;
            }
            Some(Token::Number(_)) => return Err(ErrorKind::SyntaxError),
        }
    }

    Ok((operands, operators))
}

/// Applies one binary operator.
///
/// The power arm honors the folded sign: unary minus binds looser than
/// `^`, so a sign-folded base computes `-(|base|^exp)`. Division goes
/// through the explicit zero-divisor branch in [`functions::div`].
fn apply_operator(op: BinaryOp, lhs: Operand, rhs: Real) -> Real {
    match op {
        BinaryOp::Pow => {
            if lhs.sign_folded {
                -functions::pow(functions::fabs(lhs.value), rhs)
            } else {
                functions::pow(lhs.value, rhs)
            }
        }
        BinaryOp::Mul => lhs.value * rhs,
        BinaryOp::Div => functions::div(lhs.value, rhs),
        BinaryOp::Add => lhs.value + rhs,
        BinaryOp::Sub => lhs.value - rhs,
    }
}

/// Reduces an alternating operand/operator sequence to one value, one
/// precedence tier at a time, each tier in a single left-to-right pass.
pub fn reduce(mut operands: Vec<Operand>, mut operators: Vec<BinaryOp>) -> Result<Real> {
    debug_assert_eq!(operands.len(), operators.len() + 1);

    for tier in 0..=2 {
        if operators.is_empty() {
            break;
        }
        let mut kept_operands = Vec::with_capacity(operands.len());
        let mut kept_operators = Vec::with_capacity(operators.len());
        let mut iter = operands.into_iter();
        kept_operands.push(iter.next().ok_or(ErrorKind::SyntaxError)?);

        for (op, rhs) in operators.iter().zip(iter) {
            if op.tier() == tier {
                let lhs = kept_operands.pop().ok_or(ErrorKind::SyntaxError)?;
                let value = apply_operator(*op, lhs, rhs.value);
                kept_operands.push(Operand::new(value, false));
            } else {
                kept_operators.push(*op);
                kept_operands.push(rhs);
            }
        }

        operands = kept_operands;
        operators = kept_operators;
    }

    debug_assert!(operators.is_empty());
    match (operands.len(), operands.first()) {
        (1, Some(operand)) => Ok(operand.value),
        _ => Err(ErrorKind::SyntaxError),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet as StdBTreeSet;

    fn eval(expr: &str) -> Result<Real> {
        let names: StdBTreeSet<char> = ['x', 'y', 'z', 'a', 'b'].into_iter().collect();
        eval_subexpression(expr, &VariableMap::new(), &names)
    }

    #[test]
    fn folds_unary_sign_runs() {
        assert_eq!(eval("- + 8"), Ok(-8.0));
        assert_eq!(eval("- - 4 * - + - 8"), Ok(32.0));
        assert_eq!(eval("10 / + + - - 2"), Ok(5.0));
        assert_eq!(eval("5. - + + - .5"), Ok(5.5));
    }

    #[test]
    fn three_minuses_in_a_row_fail() {
        assert_eq!(eval("- - - 4"), Err(ErrorKind::SyntaxError));
        assert_eq!(eval("5 - - - 2"), Err(ErrorKind::SyntaxError));
        // A plus in between resets the streak.
        assert_eq!(eval("5 - + - 2"), Ok(7.0));
    }

    #[test]
    fn adjacent_numbers_fail() {
        assert_eq!(eval("pi e"), Err(ErrorKind::SyntaxError));
        assert_eq!(eval("1.2 .3"), Err(ErrorKind::SyntaxError));
    }

    #[test]
    fn misplaced_operators_fail() {
        assert_eq!(eval("5 * / 7"), Err(ErrorKind::SyntaxError));
        assert_eq!(eval("^"), Err(ErrorKind::SyntaxError));
        assert_eq!(eval("5 *"), Err(ErrorKind::SyntaxError));
    }

    #[test]
    fn precedence_tiers() {
        assert_eq!(eval("2 + 3 * 4"), Ok(14.0));
        assert_eq!(eval("10 * 2 ^ 3"), Ok(80.0));
        assert_eq!(eval("4.4 / 4 / - 0.4"), Ok(-2.75));
        assert_eq!(eval("8 + 10 * 8 / 2"), Ok(48.0));
    }

    #[test]
    fn folded_sign_binds_looser_than_power() {
        assert_eq!(eval("- 2 ^ 4"), Ok(-16.0));
        assert_eq!(eval("- 2 ^ - 4"), Ok(-0.0625));
        assert_eq!(eval("5 ^ - - 2"), Ok(25.0));
        assert_eq!(eval("5 ^ - + 2"), Ok(0.04));
        assert_eq!(eval("2 ^ - + - 5"), Ok(32.0));
    }

    #[test]
    fn power_chains_reduce_left_to_right() {
        assert_eq!(eval("2 ^ 3 ^ 2"), Ok(64.0));
        assert_eq!(eval("- 2 ^ 3 ^ 4"), Ok(4096.0));
    }

    #[test]
    fn division_by_zero_is_ieee() {
        assert!(eval("0 / 0").unwrap().is_nan());
        assert_eq!(eval("1 / 0"), Ok(Real::INFINITY));
        assert_eq!(eval("- 1 / 0"), Ok(Real::NEG_INFINITY));
    }

    #[test]
    fn infinities_propagate() {
        assert!(eval("INF - INF").unwrap().is_nan());
        assert!(eval("0 * INF").unwrap().is_nan());
        assert_eq!(eval("INF * - INF"), Ok(Real::NEG_INFINITY));
        assert_eq!(eval("5 ^ 500 / 2"), Ok(Real::INFINITY));
    }
}
