//! Built-in mathematical functions and arithmetic primitives.
//!
//! All math routes through the `libm` crate when the on-by-default `libm`
//! feature is enabled, which keeps the crate usable in no_std environments.
//! Depending on the selected floating-point precision (f32 or f64,
//! controlled by the "f32" feature), different versions of the math
//! functions are used. On hosted targets the feature can be disabled and
//! the std float methods are used instead.
//!
//! Division by zero and other IEEE edge cases are handled by explicit,
//! documented branches rather than left to chance: `0/0` is NaN and a
//! nonzero value divided by zero is a signed infinity.

use crate::Real;
use crate::constants;

#[cfg(all(feature = "libm", feature = "f32"))]
use libm::{
    cosf as libm_cos, fabsf as libm_fabs, floorf as libm_floor, log10f as libm_log10,
    logf as libm_ln, powf as libm_pow, roundf as libm_round, sinf as libm_sin,
    sqrtf as libm_sqrt, tanf as libm_tan,
};

#[cfg(all(feature = "libm", not(feature = "f32")))]
use libm::{
    cos as libm_cos, fabs as libm_fabs, floor as libm_floor, log as libm_ln,
    log10 as libm_log10, pow as libm_pow, round as libm_round, sin as libm_sin,
    sqrt as libm_sqrt, tan as libm_tan,
};

#[cfg(all(not(feature = "libm"), not(test), target_arch = "arm"))]
compile_error!("no_std builds require the `libm` feature for math support");

// Hosted fallback with the same names as the libm aliases.
#[cfg(not(feature = "libm"))]
mod hosted {
    use crate::Real;

    pub fn libm_sin(x: Real) -> Real {
        x.sin()
    }
    pub fn libm_cos(x: Real) -> Real {
        x.cos()
    }
    pub fn libm_tan(x: Real) -> Real {
        x.tan()
    }
    pub fn libm_ln(x: Real) -> Real {
        x.ln()
    }
    pub fn libm_log10(x: Real) -> Real {
        x.log10()
    }
    pub fn libm_sqrt(x: Real) -> Real {
        x.sqrt()
    }
    pub fn libm_fabs(x: Real) -> Real {
        x.abs()
    }
    pub fn libm_floor(x: Real) -> Real {
        x.floor()
    }
    pub fn libm_round(x: Real) -> Real {
        x.round()
    }
    pub fn libm_pow(x: Real, y: Real) -> Real {
        x.powf(y)
    }
}

#[cfg(not(feature = "libm"))]
use hosted::{
    libm_cos, libm_fabs, libm_floor, libm_ln, libm_log10, libm_pow, libm_round, libm_sin,
    libm_sqrt, libm_tan,
};

/// Sine, argument in radians.
pub fn sin(x: Real) -> Real {
    libm_sin(x)
}

/// Cosine, argument in radians.
pub fn cos(x: Real) -> Real {
    libm_cos(x)
}

/// Tangent, argument in radians.
pub fn tan(x: Real) -> Real {
    libm_tan(x)
}

/// Natural logarithm. `ln(0)` is negative infinity and `ln` of a negative
/// value is NaN, per IEEE semantics.
pub fn ln(x: Real) -> Real {
    libm_ln(x)
}

/// Base-10 logarithm.
pub fn log10(x: Real) -> Real {
    libm_log10(x)
}

/// Square root. `sqrt` of a negative finite value is NaN.
pub fn sqrt(x: Real) -> Real {
    libm_sqrt(x)
}

/// Absolute value.
pub fn fabs(x: Real) -> Real {
    libm_fabs(x)
}

/// Largest integer value not greater than `x`.
pub fn floor(x: Real) -> Real {
    libm_floor(x)
}

/// Round half away from zero.
pub fn round(x: Real) -> Real {
    libm_round(x)
}

/// `x` raised to the power `y`, with IEEE semantics for negative bases,
/// infinities, and NaN (`pow(-2, 3)` is `-8`, `pow(-2, 0.5)` is NaN,
/// `pow(-INF, 3)` is `-INF`).
pub fn pow(x: Real, y: Real) -> Real {
    libm_pow(x, y)
}

/// Divides the first value by the second.
///
/// Division by zero is not an error:
/// - `0 / 0` is NaN
/// - a positive value divided by zero is positive infinity
/// - a negative value divided by zero is negative infinity
pub fn div(a: Real, b: Real) -> Real {
    if b == 0.0 {
        if a == 0.0 {
            Real::NAN
        } else if a > 0.0 {
            Real::INFINITY
        } else {
            Real::NEG_INFINITY
        }
    } else {
        a / b
    }
}

/// The closed set of functions a formula may call.
///
/// Membership is a compile-time property: adding or removing a function
/// means touching this enum, and the exhaustive `apply` match keeps the
/// dispatch table in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFunction {
    Abs,
    Sin,
    Cos,
    Tan,
    Log,
    Exp,
    Sqrt,
}

impl MathFunction {
    /// All recognized functions, longest name first so scanners can match
    /// greedily without `sqrt` being shadowed by a three-letter prefix.
    pub const ALL: [MathFunction; 7] = [
        MathFunction::Sqrt,
        MathFunction::Abs,
        MathFunction::Sin,
        MathFunction::Cos,
        MathFunction::Tan,
        MathFunction::Log,
        MathFunction::Exp,
    ];

    /// Looks up a function by its source-text name.
    pub fn from_name(name: &str) -> Option<MathFunction> {
        match name {
            "abs" => Some(MathFunction::Abs),
            "sin" => Some(MathFunction::Sin),
            "cos" => Some(MathFunction::Cos),
            "tan" => Some(MathFunction::Tan),
            "log" => Some(MathFunction::Log),
            "exp" => Some(MathFunction::Exp),
            "sqrt" => Some(MathFunction::Sqrt),
            _ => None,
        }
    }

    /// The function's source-text name.
    pub fn name(self) -> &'static str {
        match self {
            MathFunction::Abs => "abs",
            MathFunction::Sin => "sin",
            MathFunction::Cos => "cos",
            MathFunction::Tan => "tan",
            MathFunction::Log => "log",
            MathFunction::Exp => "exp",
            MathFunction::Sqrt => "sqrt",
        }
    }

    /// Applies the function to its single argument.
    ///
    /// `log` is the natural logarithm and `exp` is computed as `e^arg`.
    /// NaN and infinities propagate per IEEE semantics.
    pub fn apply(self, arg: Real) -> Real {
        match self {
            MathFunction::Abs => fabs(arg),
            MathFunction::Sin => sin(arg),
            MathFunction::Cos => cos(arg),
            MathFunction::Tan => tan(arg),
            MathFunction::Log => ln(arg),
            MathFunction::Exp => pow(constants::E, arg),
            MathFunction::Sqrt => sqrt(arg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn div_by_zero_produces_sentinels() {
        assert!(div(0.0, 0.0).is_nan());
        assert_eq!(div(5.0, 0.0), Real::INFINITY);
        assert_eq!(div(-5.0, 0.0), Real::NEG_INFINITY);
        assert_eq!(div(5.0, 2.0), 2.5);
    }

    #[test]
    fn pow_ieee_edges() {
        assert_eq!(pow(-2.0, 3.0), -8.0);
        assert_eq!(pow(-2.0, 4.0), 16.0);
        assert!(pow(-2.0, 0.5).is_nan());
        assert_eq!(pow(Real::NEG_INFINITY, 3.0), Real::NEG_INFINITY);
        assert_eq!(pow(1.0, Real::NEG_INFINITY), 1.0);
    }

    #[test]
    fn function_lookup_and_names() {
        for f in MathFunction::ALL {
            assert_eq!(MathFunction::from_name(f.name()), Some(f));
        }
        assert_eq!(MathFunction::from_name("sinh"), None);
        assert_eq!(MathFunction::from_name("SIN"), None);
    }

    #[test]
    fn apply_matches_definitions() {
        assert_eq!(MathFunction::Abs.apply(-5.0), 5.0);
        assert_approx_eq!(MathFunction::Exp.apply(1.0), crate::constants::E);
        assert_eq!(MathFunction::Log.apply(0.0), Real::NEG_INFINITY);
        assert!(MathFunction::Sqrt.apply(-1.0).is_nan());
        assert!(MathFunction::Sin.apply(Real::INFINITY).is_nan());
    }
}
