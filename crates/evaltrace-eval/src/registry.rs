//! The fixed set of traceable functions.
//!
//! ```ocaml
//! let rec fact n =
//!   if n = 0 then
//!     1
//!   else
//!     n * fact (n - 1)
//!
//! let square_of_pred x =
//!   let pred_x = x - 1 in
//!   pred_x * pred_x
//! ```

use crate::error::{TraceError, TraceResult};
use evaltrace_types::{Expr, FunctionDef};
use std::sync::OnceLock;

pub const FACT: &str = "fact";
pub const SQUARE_OF_PRED: &str = "square_of_pred";

/// Function definitions resolvable by name. Calls are resolved statically
/// against this table; there are no first-class functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    functions: Vec<FunctionDef>,
}

impl Registry {
    pub fn new(functions: Vec<FunctionDef>) -> Self {
        Self { functions }
    }

    /// The two built-in programs, built once per process.
    pub fn standard() -> &'static Registry {
        static STANDARD: OnceLock<Registry> = OnceLock::new();
        STANDARD.get_or_init(|| Registry::new(vec![fact(), square_of_pred()]))
    }

    pub fn get(&self, name: &str) -> TraceResult<&FunctionDef> {
        self.functions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| TraceError::UnknownFunction(name.to_string()))
    }

    pub fn functions(&self) -> &[FunctionDef] {
        &self.functions
    }
}

fn fact() -> FunctionDef {
    FunctionDef::new(
        FACT,
        "n",
        Expr::cond(
            Expr::equals(Expr::var("n"), Expr::lit(0)),
            Expr::lit(1),
            Expr::mul(
                Expr::var("n"),
                Expr::call(FACT, Expr::sub(Expr::var("n"), Expr::lit(1))),
            ),
        ),
    )
}

fn square_of_pred() -> FunctionDef {
    FunctionDef::new(
        SQUARE_OF_PRED,
        "x",
        Expr::let_in(
            "pred_x",
            Expr::sub(Expr::var("x"), Expr::lit(1)),
            Expr::mul(Expr::var("pred_x"), Expr::var("pred_x")),
        ),
    )
}
