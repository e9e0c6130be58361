//! Canonical rewriting of raw formula text.
//!
//! The normalizer turns the raw input into a whitespace-delimited form the
//! rest of the pipeline can process without lookahead across compound
//! literals:
//!
//! 1. whitespace is collapsed,
//! 2. scientific-notation literals are wrapped in synthetic parentheses so
//!    no later pass can split them at their embedded sign,
//! 3. every recognized function application (name through matching close
//!    parenthesis) is wrapped in one synthetic pair, which routes negative
//!    function results through the driver's negative-base correction,
//! 4. every bare occurrence of a configured variable name is wrapped, so
//!    negative bindings take the same path,
//! 5. operators and parentheses are spaced (except the exponent sign inside
//!    scientific notation), and
//! 6. the whole formula is wrapped in one outer pair, so the parenthesis
//!    driver always has at least one group to process.

extern crate alloc;

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;

use crate::functions::MathFunction;

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Rewrites `formula` into the canonical spaced form described above.
pub fn normalize(formula: &str, valid_names: &BTreeSet<char>) -> String {
    let text = collapse_whitespace(formula);
    let text = wrap_scientific(&text);
    let text = wrap_function_calls(&text);
    let text = wrap_variables(&text, valid_names);
    let text = collapse_whitespace(&space_symbols(&text));

    let mut out = String::with_capacity(text.len() + 4);
    out.push_str("( ");
    out.push_str(&text);
    out.push_str(" )");
    out
}

/// Tabs become spaces, runs collapse to one space, ends are trimmed.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}

/// Wraps `digits[.digits]` / `.digits` followed by `e|E [+|-] digits` in a
/// synthetic parenthesis pair. `5E+1+e` becomes `(5E+1)+e`: the literal can
/// no longer be split at its sign, and the trailing `e` stays free to be
/// the constant.
fn wrap_scientific(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let at_boundary = i == 0 || (!is_ident(chars[i - 1]) && chars[i - 1] != '.');
        let starts_number = c.is_ascii_digit()
            || (c == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit());
        if !(at_boundary && starts_number) {
            out.push(c);
            i += 1;
            continue;
        }

        // Mantissa: digits with at most one dot.
        let start = i;
        let mut j = i;
        let mut seen_dot = false;
        while j < chars.len() {
            if chars[j].is_ascii_digit() {
                j += 1;
            } else if chars[j] == '.' && !seen_dot {
                seen_dot = true;
                j += 1;
            } else {
                break;
            }
        }

        // Exponent marker with mandatory digits makes it scientific.
        if j < chars.len() && (chars[j] == 'e' || chars[j] == 'E') {
            let mut k = j + 1;
            if k < chars.len() && (chars[k] == '+' || chars[k] == '-') {
                k += 1;
            }
            if k < chars.len() && chars[k].is_ascii_digit() {
                while k < chars.len() && chars[k].is_ascii_digit() {
                    k += 1;
                }
                out.push('(');
                out.extend(&chars[start..k]);
                out.push(')');
                i = k;
                continue;
            }
        }

        out.extend(&chars[start..j]);
        i = j;
    }
    out
}

/// Wraps every `name ( ... )` application of a recognized function, from
/// the name through its matching close parenthesis, in one synthetic pair.
fn wrap_function_calls(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut open_before = alloc::vec![0u32; chars.len()];
    let mut close_after = alloc::vec![0u32; chars.len()];

    let mut i = 0;
    while i < chars.len() {
        let at_boundary = i == 0 || !is_ident(chars[i - 1]);
        if at_boundary && chars[i].is_ascii_lowercase() {
            if let Some(func) = match_function(&chars, i) {
                let name_end = i + func.name().len();
                let mut j = name_end;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                if j < chars.len() && chars[j] == '(' {
                    if let Some(close) = matching_close(&chars, j) {
                        open_before[i] += 1;
                        close_after[close] += 1;
                    }
                }
                // Continue inside the name so nested calls are found too.
                i = name_end;
                continue;
            }
        }
        i += 1;
    }

    let mut out = String::with_capacity(text.len() + 8);
    for (idx, &c) in chars.iter().enumerate() {
        for _ in 0..open_before[idx] {
            out.push('(');
        }
        out.push(c);
        for _ in 0..close_after[idx] {
            out.push(')');
        }
    }
    out
}

fn match_function(chars: &[char], at: usize) -> Option<MathFunction> {
    MathFunction::ALL.into_iter().find(|func| {
        let name = func.name();
        chars[at..].len() >= name.len()
            && chars[at..at + name.len()].iter().copied().eq(name.chars())
    })
}

fn matching_close(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &c) in chars[open..].iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Wraps bare occurrences of configured variable names. Occurrences glued
/// to identifier characters (the `x` in `exp`) are left alone.
fn wrap_variables(text: &str, valid_names: &BTreeSet<char>) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        let prev_free = i == 0 || !is_ident(chars[i - 1]);
        let next_free = i + 1 >= chars.len() || !is_ident(chars[i + 1]);
        if valid_names.contains(&c) && prev_free && next_free {
            out.push('(');
            out.push(c);
            out.push(')');
        } else {
            out.push(c);
        }
    }
    out
}

/// Surrounds every operator and parenthesis with spaces. The sign inside a
/// scientific-notation exponent (`5E+1`) stays attached to its literal.
fn space_symbols(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() * 2);
    for (i, &c) in chars.iter().enumerate() {
        let symbol = matches!(c, '(' | ')' | '+' | '-' | '*' | '/' | '^');
        if symbol && !is_exponent_sign(&chars, i) {
            out.push(' ');
            out.push(c);
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

fn is_exponent_sign(chars: &[char], i: usize) -> bool {
    if chars[i] != '+' && chars[i] != '-' {
        return false;
    }
    i >= 2
        && (chars[i - 1] == 'e' || chars[i - 1] == 'E')
        && (chars[i - 2].is_ascii_digit() || chars[i - 2] == '.')
        && i + 1 < chars.len()
        && chars[i + 1].is_ascii_digit()
}
