//! Error types for tracing evaluations.

use thiserror::Error;

/// Why a trace could not be produced. No partial trace accompanies an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// A variable is not bound in the current frame.
    #[error("unbound name: {0}")]
    UnboundName(String),
    /// A name was bound twice in the same frame.
    #[error("duplicate binding: {0}")]
    DuplicateBinding(String),
    /// The scenario argument is outside its domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A call names a function that is not in the registry.
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    /// A scenario tag that matches neither program.
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
    /// `*` or `-` left the `i64` range.
    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(String),
    /// The evaluation budget ran out.
    #[error("gas exhausted after {0} nodes")]
    GasExhausted(u64),
}

/// Result alias for tracing operations.
pub type TraceResult<T> = Result<T, TraceError>;
