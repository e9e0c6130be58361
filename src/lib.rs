#![cfg_attr(all(not(test), target_arch = "arm"), no_std)]
#![doc = r#"
# formula-rs

A minimal, no_std-friendly parser and evaluator for plain-text math formulas.

## Overview

formula-rs evaluates a formula supplied as a string — numbers, the operators
`+ - * / ^`, parentheses, the constants `pi`, `e`, and `INF`/`-INF`, the
single-argument functions `abs sin cos tan log exp sqrt`, and optional named
variables bound to numeric values — and produces either a rounded numeric
result or a classified error. It is meant to be embedded by host applications
that accept formulas as user input (forms, configuration fields, spreadsheet
cells) without exposing a general scripting language.

Key features:
- Configurable floating-point precision (f32/f64)
- Single-letter variables with per-session bindings and a configurable
  variable alphabet
- IEEE special-value propagation: `INF`, `-INF`, and `NaN` are valid results,
  not errors (`1/0`, `0/0`, `sqrt(-1)`, `Inf - Inf`, ...)
- Classified errors instead of exceptions or panics on malformed input
- Decimal rounding of results, with mantissa-only rounding for values that
  render in exponential notation
- No_std compatibility for embedded systems

## Quick Start

```rust
use formula_rs::interp;

// One-shot evaluation at the default precision (4 decimal places)
let result = interp("10*(3-5)^4/2").unwrap();
assert_eq!(result, 80.0);

// Parenthesized negative bases and unary sign chains are resolved
assert_eq!(interp("(-2)^4").unwrap(), 16.0);
assert_eq!(interp("10/++--2").unwrap(), 5.0);
```

## Variables

```rust
use formula_rs::FormulaParser;

let mut parser = FormulaParser::new("3*x^2 - 4*y + 3/y", 2);
parser.set_variables(&[('x', -4.0), ('y', 8.0)]);
assert_eq!(parser.evaluate(), Ok(16.38));

// The original text is kept verbatim
assert_eq!(parser.formula(), "3*x^2 - 4*y + 3/y");
```

The default variable alphabet is `{x, y, z, a, b}`. It can be replaced with
any set of single lowercase letters other than `e` (which is reserved for
Euler's number); the configuration is validated when `evaluate` runs.

## Special values

Division by zero and arithmetic on infinities follow IEEE 754 semantics and
produce sentinel values rather than errors:

```rust
use formula_rs::interp;

assert!(interp("sqrt(-1.0)").unwrap().is_nan());
assert!(interp("0/0 + 1").unwrap().is_nan());
assert_eq!(interp("5^500 + 1").unwrap(), f64::INFINITY);
assert_eq!(interp("Inf * -Inf").unwrap(), f64::NEG_INFINITY);
```

## Error Handling

Malformed input never panics; every failure is classified:

```rust
use formula_rs::{interp, ErrorKind};

assert_eq!(interp("2 +* 3"), Err(ErrorKind::SyntaxError));
assert_eq!(interp("(x))"), Err(ErrorKind::MismatchedParentheses));
assert_eq!(interp("  "), Err(ErrorKind::EmptyInput));
assert_eq!(interp("_"), Err(ErrorKind::InvalidCharacter));
```

Rendering error kinds as localized display strings is the host's concern;
the crate only ever produces the kind.

## Supported grammar

| Element    | Forms                                                        |
|------------|--------------------------------------------------------------|
| Numbers    | `5`, `4.4`, `.5`, `5.`, `5E+1`, `0.8e+1`                     |
| Operators  | `^` then `*` `/` then `+` `-`, left to right within a tier   |
| Constants  | `pi`, `e`, `INF`/`-INF` (case-insensitive), `NaN`            |
| Functions  | `abs`, `sin`, `cos`, `tan`, `log` (natural), `exp`, `sqrt`   |
| Variables  | single lowercase letters, configurable, default `{x,y,z,a,b}`|

Unary `+`/`-` chains fold into a single sign (`--4` is `4`, `-+8` is `-8`);
three consecutive minus signs are a syntax error. Unary minus binds looser
than `^`, so `-2^4` is `-16` while `(-2)^4` is `16`.

## Feature Flags

- `f32`: use 32-bit floating point instead of the default 64-bit
- `libm` (default): route math through the `libm` crate for no_std targets
"#]

// Re-export alloc types so modules can use them in no_std builds
#[cfg(not(test))]
extern crate alloc;
#[cfg(not(test))]
pub use alloc::boxed::Box;
#[cfg(not(test))]
pub use alloc::string::{String, ToString};
#[cfg(not(test))]
pub use alloc::vec::Vec;

pub mod engine;
pub mod error;
pub mod eval;
pub mod functions;
pub mod lexer;
pub mod normalizer;
pub mod types;

pub use engine::{DEFAULT_PRECISION, FormulaParser, interp};
pub use error::{ErrorKind, Result};
pub use functions::MathFunction;
pub use types::{BinaryOp, MAX_VARIABLES, Token, VariableMap};

/// Define the floating-point type based on feature flags
#[cfg(feature = "f32")]
pub type Real = f32;

#[cfg(not(feature = "f32"))]
pub type Real = f64;

pub mod constants {
    use super::Real;

    #[cfg(feature = "f32")]
    pub const PI: Real = core::f32::consts::PI;
    #[cfg(feature = "f32")]
    pub const E: Real = core::f32::consts::E;
    #[cfg(feature = "f32")]
    pub const TEST_PRECISION: Real = 1e-5;

    #[cfg(not(feature = "f32"))]
    pub const PI: Real = core::f64::consts::PI;
    #[cfg(not(feature = "f32"))]
    pub const E: Real = core::f64::consts::E;
    #[cfg(not(feature = "f32"))]
    pub const TEST_PRECISION: Real = 1e-10;
}

/// Utility macro to check if two floating point values are approximately equal
/// within a specified epsilon. NaN equals NaN and same-signed infinities are
/// equal for the purposes of this macro.
#[macro_export]
macro_rules! assert_approx_eq {
    // Case 1: assert_approx_eq!(left, right) -> use default epsilon
    ($left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($left, $right, $crate::constants::TEST_PRECISION)
    };
    // Case 2: assert_approx_eq!(left, right, epsilon) -> use specified epsilon
    ($left:expr, $right:expr, $epsilon:expr $(,)?) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps: $crate::Real = $epsilon;

        if left_val.is_nan() && right_val.is_nan() {
            // NaN == NaN for our purposes
        } else if left_val.is_infinite()
            && right_val.is_infinite()
            && left_val.signum() == right_val.signum()
        {
            // Same-signed infinities are equal
        } else {
            assert!(
                (left_val - right_val).abs() < eps,
                "assertion failed: `(left ≈ right)` (left: `{}`, right: `{}`, epsilon: `{}`)",
                left_val,
                right_val,
                eps
            );
        }
    }};
    // Case 3: assert_approx_eq!(left, right, epsilon, "format message with args", args...)
    ($left:expr, $right:expr, $epsilon:expr, $fmt:expr, $($arg:tt)+) => {{
        let left_val = $left;
        let right_val = $right;
        let eps = $epsilon;

        if left_val.is_nan() && right_val.is_nan() {
            // NaN == NaN for our purposes
        } else if left_val.is_infinite()
            && right_val.is_infinite()
            && left_val.signum() == right_val.signum()
        {
            // Same-signed infinities are equal
        } else {
            assert!((left_val - right_val).abs() < eps, $fmt, $($arg)+);
        }
    }};
}
