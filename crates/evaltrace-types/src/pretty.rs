//! OCaml-style source printer.
//!
//! Every `before`/`after` text in a step comes from here. Output is a single
//! line; line breaking and indentation belong to whoever renders it.

use crate::ast::{Expr, FunctionDef};
use std::fmt;

/// `if` and `let` extend as far right as possible.
const PREC_OPEN: u8 = 0;
const PREC_APP: u8 = 4;
const PREC_ATOM: u8 = 5;

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Literal { value } if *value < 0 => PREC_OPEN,
        Expr::Literal { .. } | Expr::Variable { .. } => PREC_ATOM,
        Expr::BinaryOp { op, .. } => op.precedence(),
        Expr::Call { .. } => PREC_APP,
        Expr::Conditional { .. } | Expr::Let { .. } => PREC_OPEN,
    }
}

fn write_expr(out: &mut impl fmt::Write, expr: &Expr, min_prec: u8) -> fmt::Result {
    let parens = precedence(expr) < min_prec;
    if parens {
        out.write_char('(')?;
    }
    match expr {
        Expr::Literal { value } => write!(out, "{value}")?,
        Expr::Variable { name } => out.write_str(name)?,
        Expr::BinaryOp { op, left, right } => {
            let p = op.precedence();
            write_expr(out, left, p)?;
            write!(out, " {} ", op.symbol())?;
            write_expr(out, right, p + 1)?;
        }
        Expr::Conditional {
            cond,
            then_branch,
            else_branch,
        } => {
            out.write_str("if ")?;
            match cond.as_ref() {
                // An evaluated condition reads as a boolean.
                Expr::Literal { value } => out.write_str(&value_text(*value, true))?,
                other => write_expr(out, other, PREC_OPEN)?,
            }
            out.write_str(" then ")?;
            write_expr(out, then_branch, PREC_OPEN)?;
            out.write_str(" else ")?;
            write_expr(out, else_branch, PREC_OPEN)?;
        }
        Expr::Call { callee, argument } => {
            write!(out, "{callee} ")?;
            write_expr(out, argument, PREC_ATOM)?;
        }
        Expr::Let { name, value, body } => {
            write!(out, "let {name} = ")?;
            write_expr(out, value, PREC_OPEN)?;
            out.write_str(" in ")?;
            write_expr(out, body, PREC_OPEN)?;
        }
    }
    if parens {
        out.write_char(')')?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self, PREC_OPEN)
    }
}

impl fmt::Display for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("let ")?;
        if self.is_recursive() {
            f.write_str("rec ")?;
        }
        write!(f, "{} {} = {}", self.name, self.param, self.body)
    }
}

/// Text for a computed value. Comparison results show as `true`/`false`.
pub fn value_text(value: i64, is_truth: bool) -> String {
    match (is_truth, value) {
        (true, 0) => "false".to_string(),
        (true, _) => "true".to_string(),
        (false, v) => v.to_string(),
    }
}

/// `callee argument` with the argument already evaluated.
pub fn call_text(callee: &str, argument: i64) -> String {
    Expr::call(callee, Expr::lit(argument)).to_string()
}
