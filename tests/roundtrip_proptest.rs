use formula_rs::{FormulaParser, interp};
use proptest::prelude::*;

proptest! {
    // For a fixed formula, bindings, and precision the result never
    // changes.
    #[test]
    fn evaluation_is_deterministic(value in -1.0e6f64..1.0e6f64) {
        let formula = format!("{} * 2 + 1", value);
        let first = interp(&formula);
        let second = interp(&formula);
        prop_assert_eq!(first, second);
    }

    // Feeding a finite result back in as a literal reproduces it: the
    // rounding applied on the way out is idempotent.
    #[test]
    fn literal_results_round_trip(value in -1.0e6f64..1.0e6f64) {
        let first = interp(&format!("{}", value)).unwrap();
        let again = interp(&format!("{}", first)).unwrap();
        let tolerance = first.abs() * 1e-9 + 1e-9;
        prop_assert!(
            (first - again).abs() <= tolerance,
            "{} re-evaluated to {}",
            first,
            again
        );
    }

    // Addition of two parenthesized literals matches f64 addition to
    // within the rounding precision.
    #[test]
    fn addition_matches_ieee(a in -1000.0f64..1000.0, b in -1000.0f64..1000.0) {
        let result = interp(&format!("({}) + ({})", a, b)).unwrap();
        prop_assert!(
            (result - (a + b)).abs() <= 1.0e-4,
            "({}) + ({}) evaluated to {}",
            a,
            b,
            result
        );
    }

    // The getter never reflects evaluation state.
    #[test]
    fn formula_text_survives_evaluation(value in -1.0e3f64..1.0e3) {
        let text = format!("{} + x", value);
        let mut parser = FormulaParser::new(&text, 4);
        parser.set_variables(&[('x', 1.0)]);
        let _ = parser.evaluate();
        prop_assert_eq!(parser.formula(), text.as_str());
    }
}
