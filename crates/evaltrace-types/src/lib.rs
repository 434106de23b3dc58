//! Shared types for evaltrace.
//!
//! This crate defines the expression AST, sub-expression paths, the
//! OCaml-style source printer, and the step records produced by the
//! stepper in `evaltrace-eval`.

pub mod ast;
mod path;
pub mod pretty;
mod step;

pub use ast::{BinOp, Expr, FunctionDef};
pub use path::{ExprPath, PathSegment, MAIN_ROOT};
pub use step::{Binding, EnvSnapshot, Step, StepKind};
