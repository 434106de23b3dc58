//! Scenario driver: the two canned programs and their entry points.

use crate::env::Environment;
use crate::error::{TraceError, TraceResult};
use crate::registry::{Registry, FACT, SQUARE_OF_PRED};
use crate::stepper::{Stepper, StepperConfig};
use crate::trace::Trace;
use evaltrace_types::{Expr, FunctionDef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Which program to trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// `fact n`, recursive.
    Factorial,
    /// `square_of_pred x`, one `let` and no recursion.
    SquareOfPred,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::Factorial, Scenario::SquareOfPred];

    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Factorial => "factorial",
            Scenario::SquareOfPred => "square_of_pred",
        }
    }

    /// Name of the function the scenario calls.
    pub fn function_name(self) -> &'static str {
        match self {
            Scenario::Factorial => FACT,
            Scenario::SquareOfPred => SQUARE_OF_PRED,
        }
    }

    /// The function definition the scenario calls.
    pub fn function(self) -> TraceResult<&'static FunctionDef> {
        Registry::standard().get(self.function_name())
    }

    /// Reject arguments for which the program would not terminate.
    pub fn check_argument(self, argument: i64) -> TraceResult<()> {
        match self {
            Scenario::Factorial if argument < 0 => Err(TraceError::InvalidArgument(format!(
                "factorial is undefined for negative n ({argument})"
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "factorial" | "fact" => Ok(Scenario::Factorial),
            "square_of_pred" | "squareOfPred" | "square-of-pred" => Ok(Scenario::SquareOfPred),
            other => Err(TraceError::UnknownScenario(other.to_string())),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Tracer
// ══════════════════════════════════════════════════════════════════════════════

/// Configuration for a [`Tracer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TracerConfig {
    pub stepper: StepperConfig,
}

impl TracerConfig {
    pub fn with_gas_limit(gas_limit: u64) -> Self {
        Self {
            stepper: StepperConfig { gas_limit },
        }
    }
}

/// Runs scenarios against the standard registry.
#[derive(Debug, Clone, Default)]
pub struct Tracer {
    config: TracerConfig,
}

impl Tracer {
    pub fn new(config: TracerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Trace `scenario` applied to `argument`.
    ///
    /// Argument errors are reported before any evaluation happens.
    #[tracing::instrument(skip(self))]
    pub fn trace(&self, scenario: Scenario, argument: i64) -> TraceResult<Trace> {
        scenario.check_argument(argument)?;

        let program = Expr::call(scenario.function_name(), Expr::lit(argument));
        let initial_env = Environment::empty();
        let stepper = Stepper::new(Registry::standard(), self.config.stepper);
        let (steps, result) = stepper.run(&program, initial_env.clone())?;
        debug!(steps = steps.len(), result, "trace complete");

        Ok(Trace {
            scenario,
            argument,
            initial_env: initial_env.snapshot(),
            steps,
            result,
        })
    }
}

/// Trace `scenario` with the default configuration.
pub fn trace(scenario: Scenario, argument: i64) -> TraceResult<Trace> {
    Tracer::default().trace(scenario, argument)
}

/// Trace `fact n`. Fails with `InvalidArgument` for negative `n`.
pub fn trace_factorial(n: i64) -> TraceResult<Trace> {
    trace(Scenario::Factorial, n)
}

/// Trace `square_of_pred x`.
pub fn trace_square_of_pred(x: i64) -> TraceResult<Trace> {
    trace(Scenario::SquareOfPred, x)
}

// ══════════════════════════════════════════════════════════════════════════════
// Serializable outcome
// ══════════════════════════════════════════════════════════════════════════════

/// A trace or the reason there is none, in a shape suitable for JSON hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceOutcome {
    pub success: bool,
    pub trace: Option<Trace>,
    pub error: Option<String>,
}

impl From<TraceResult<Trace>> for TraceOutcome {
    fn from(result: TraceResult<Trace>) -> Self {
        match result {
            Ok(trace) => Self {
                success: true,
                trace: Some(trace),
                error: None,
            },
            Err(e) => Self {
                success: false,
                trace: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Parse a scenario tag and trace it, never failing.
pub fn trace_to_outcome(scenario: &str, argument: i64) -> TraceOutcome {
    scenario
        .parse::<Scenario>()
        .and_then(|s| trace(s, argument))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_parse_aliases() {
        assert_eq!("fact".parse::<Scenario>(), Ok(Scenario::Factorial));
        assert_eq!("factorial".parse::<Scenario>(), Ok(Scenario::Factorial));
        assert_eq!("squareOfPred".parse::<Scenario>(), Ok(Scenario::SquareOfPred));
        assert_eq!("square-of-pred".parse::<Scenario>(), Ok(Scenario::SquareOfPred));
        assert_eq!(
            "fib".parse::<Scenario>(),
            Err(TraceError::UnknownScenario("fib".to_string()))
        );
    }

    #[test]
    fn test_scenario_display_roundtrips() {
        for s in Scenario::ALL {
            assert_eq!(s.to_string().parse::<Scenario>(), Ok(s));
        }
    }

    #[test]
    fn test_scenario_function() {
        assert_eq!(Scenario::Factorial.function().unwrap().param, "n");
        assert_eq!(Scenario::SquareOfPred.function().unwrap().param, "x");
        for s in Scenario::ALL {
            assert_eq!(s.function().map(|f| f.name.as_str()), Ok(s.function_name()));
        }
    }

    #[test]
    fn test_negative_square_of_pred_is_fine() {
        assert_eq!(Scenario::SquareOfPred.check_argument(-4), Ok(()));
        assert!(Scenario::Factorial.check_argument(-4).is_err());
        assert_eq!(Scenario::Factorial.check_argument(0), Ok(()));
    }

    #[test]
    fn test_outcome_success() {
        let outcome = trace_to_outcome("fact", 3);
        assert!(outcome.success);
        assert_eq!(outcome.trace.map(|t| t.result), Some(6));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_outcome_failure() {
        let outcome = trace_to_outcome("fact", -1);
        assert!(!outcome.success);
        assert!(outcome.trace.is_none());
        assert_eq!(
            outcome.error.as_deref(),
            Some("invalid argument: factorial is undefined for negative n (-1)")
        );
        let outcome = trace_to_outcome("nope", 1);
        assert_eq!(outcome.error.as_deref(), Some("unknown scenario: nope"));
    }

    #[test]
    fn test_custom_gas_limit() {
        let tracer = Tracer::new(TracerConfig::with_gas_limit(5));
        assert_eq!(
            tracer.trace(Scenario::Factorial, 3).unwrap_err(),
            TraceError::GasExhausted(5)
        );
        assert_eq!(tracer.config().stepper.gas_limit, 5);
    }
}
