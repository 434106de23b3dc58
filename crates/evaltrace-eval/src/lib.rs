//! evaltrace stepper.
//!
//! Produces substitution-evaluation traces of two small OCaml programs,
//! `fact` and `square_of_pred`, for an external renderer to animate.

pub mod context;
pub mod env;
pub mod error;
pub mod registry;
pub mod scenario;
mod stack;
pub mod stepper;
pub mod trace;

pub use context::CallContext;
pub use env::Environment;
pub use error::{TraceError, TraceResult};
pub use registry::Registry;
pub use scenario::{
    trace, trace_factorial, trace_square_of_pred, trace_to_outcome, Scenario, TraceOutcome,
    Tracer, TracerConfig,
};
pub use stepper::{Stepper, StepperConfig, DEFAULT_GAS_LIMIT};
pub use trace::Trace;
