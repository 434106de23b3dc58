//! Property-based tests for the scenario driver.
//!
//! 1. `fact n` ends in `n!` and opens exactly `n + 1` call frames
//! 2. `square_of_pred x` ends in `(x - 1)^2`
//! 3. negative factorial arguments never produce steps
//! 4. every step's residual is consistent with the environment it carries

use evaltrace_eval::{trace_factorial, trace_square_of_pred, TraceError};
use evaltrace_types::StepKind;
use proptest::prelude::*;

fn factorial(n: i64) -> i64 {
    (1..=n).product()
}

proptest! {
    #[test]
    fn fact_result_matches_closed_form(n in 0i64..=20) {
        let t = trace_factorial(n).unwrap();
        prop_assert_eq!(t.result, factorial(n));
        let last = t.steps.last().unwrap();
        prop_assert_eq!(last.kind, StepKind::Return);
        prop_assert_eq!(last.value, Some(factorial(n)));
    }

    #[test]
    fn fact_opens_one_frame_per_call(n in 0i64..=20) {
        let t = trace_factorial(n).unwrap();
        let binds = t.call_binds().count();
        let returns = t.of_kind(StepKind::Return).count();
        prop_assert_eq!(binds as i64, n + 1);
        prop_assert_eq!(returns as i64, n + 1);
        prop_assert_eq!(t.max_depth() as i64, n);
    }

    #[test]
    fn square_of_pred_matches_closed_form(x in -3_000_000_000i64..3_000_000_000i64) {
        let t = trace_square_of_pred(x).unwrap();
        prop_assert_eq!(t.result, (x - 1) * (x - 1));
        prop_assert_eq!(t.len(), 8);
    }

    #[test]
    fn negative_factorial_rejected(n in i64::MIN..0) {
        prop_assert!(matches!(trace_factorial(n), Err(TraceError::InvalidArgument(_))));
    }

    #[test]
    fn substitutions_agree_with_environment(n in 0i64..=8) {
        let t = trace_factorial(n).unwrap();
        for step in t.of_kind(StepKind::Substitute) {
            prop_assert_eq!(step.env.get(&step.before), step.value);
        }
    }

    #[test]
    fn traces_are_deterministic(n in 0i64..=12) {
        let a = trace_factorial(n).unwrap();
        let b = trace_factorial(n).unwrap();
        prop_assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        prop_assert_eq!(a, b);
    }
}
