//! Expression AST for the traced programs.
//!
//! The grammar is deliberately tiny: just enough to express
//! `fact` and `square_of_pred`. Nodes are immutable once built;
//! rewriting a node (see [`Expr::replaced`]) produces a new tree.

use crate::path::PathSegment;
use serde::{Deserialize, Serialize};

// ══════════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════════

/// Binary operators. Booleans are represented as the integers 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinOp {
    Mul,
    Sub,
    Eq,
}

impl BinOp {
    /// Source symbol for this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Mul => "*",
            BinOp::Sub => "-",
            BinOp::Eq => "=",
        }
    }

    /// Binding strength used by the printer. Higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Eq => 1,
            BinOp::Sub => 2,
            BinOp::Mul => 3,
        }
    }

    /// Apply the operator, returning `None` on overflow.
    pub fn apply(self, left: i64, right: i64) -> Option<i64> {
        match self {
            BinOp::Mul => left.checked_mul(right),
            BinOp::Sub => left.checked_sub(right),
            BinOp::Eq => Some(i64::from(left == right)),
        }
    }

    /// True for operators whose result is a 0/1 truth value.
    pub fn is_comparison(self) -> bool {
        matches!(self, BinOp::Eq)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Expr {
    /// `42`
    Literal { value: i64 },
    /// `n`
    Variable { name: String },
    /// `left op right`
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `if cond then then_branch else else_branch`
    Conditional {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// `callee argument`
    Call { callee: String, argument: Box<Expr> },
    /// `let name = value in body`
    Let {
        name: String,
        value: Box<Expr>,
        body: Box<Expr>,
    },
}

// ── Constructors ─────────────────────────────────────────────────────────────

impl Expr {
    pub fn lit(value: i64) -> Self {
        Expr::Literal { value }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable { name: name.into() }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn mul(left: Expr, right: Expr) -> Self {
        Self::binary(BinOp::Mul, left, right)
    }

    pub fn sub(left: Expr, right: Expr) -> Self {
        Self::binary(BinOp::Sub, left, right)
    }

    pub fn equals(left: Expr, right: Expr) -> Self {
        Self::binary(BinOp::Eq, left, right)
    }

    pub fn cond(cond: Expr, then_branch: Expr, else_branch: Expr) -> Self {
        Expr::Conditional {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    pub fn call(callee: impl Into<String>, argument: Expr) -> Self {
        Expr::Call {
            callee: callee.into(),
            argument: Box::new(argument),
        }
    }

    pub fn let_in(name: impl Into<String>, value: Expr, body: Expr) -> Self {
        Expr::Let {
            name: name.into(),
            value: Box::new(value),
            body: Box::new(body),
        }
    }
}

// ── Queries & rewriting ──────────────────────────────────────────────────────

impl Expr {
    /// The child reached by following one path segment, if any.
    pub fn child(&self, segment: PathSegment) -> Option<&Expr> {
        match (self, segment) {
            (Expr::BinaryOp { left, .. }, PathSegment::Left) => Some(left),
            (Expr::BinaryOp { right, .. }, PathSegment::Right) => Some(right),
            (Expr::Conditional { cond, .. }, PathSegment::Cond) => Some(cond),
            (Expr::Conditional { then_branch, .. }, PathSegment::Then) => Some(then_branch),
            (Expr::Conditional { else_branch, .. }, PathSegment::Else) => Some(else_branch),
            (Expr::Call { argument, .. }, PathSegment::Arg) => Some(argument),
            (Expr::Let { value, .. }, PathSegment::Value) => Some(value),
            (Expr::Let { body, .. }, PathSegment::Body) => Some(body),
            _ => None,
        }
    }

    /// The sub-expression at `segments`, if the path is valid for this tree.
    pub fn at(&self, segments: &[PathSegment]) -> Option<&Expr> {
        segments
            .iter()
            .try_fold(self, |node, segment| node.child(*segment))
    }

    /// A copy of this tree with the node at `segments` replaced by `with`.
    ///
    /// Returns `None` if the path does not exist in this tree.
    pub fn replaced(&self, segments: &[PathSegment], with: Expr) -> Option<Expr> {
        let Some((first, rest)) = segments.split_first() else {
            return Some(with);
        };
        let replace_in = |child: &Expr| child.replaced(rest, with.clone()).map(Box::new);
        let node = match (self, *first) {
            (Expr::BinaryOp { op, left, right }, PathSegment::Left) => Expr::BinaryOp {
                op: *op,
                left: replace_in(left)?,
                right: right.clone(),
            },
            (Expr::BinaryOp { op, left, right }, PathSegment::Right) => Expr::BinaryOp {
                op: *op,
                left: left.clone(),
                right: replace_in(right)?,
            },
            (
                Expr::Conditional {
                    cond,
                    then_branch,
                    else_branch,
                },
                seg @ (PathSegment::Cond | PathSegment::Then | PathSegment::Else),
            ) => {
                let pick = |s: PathSegment, e: &Expr| {
                    if s == seg {
                        replace_in(e)
                    } else {
                        Some(Box::new(e.clone()))
                    }
                };
                Expr::Conditional {
                    cond: pick(PathSegment::Cond, cond)?,
                    then_branch: pick(PathSegment::Then, then_branch)?,
                    else_branch: pick(PathSegment::Else, else_branch)?,
                }
            }
            (Expr::Call { callee, argument }, PathSegment::Arg) => Expr::Call {
                callee: callee.clone(),
                argument: replace_in(argument)?,
            },
            (Expr::Let { name, value, body }, PathSegment::Value) => Expr::Let {
                name: name.clone(),
                value: replace_in(value)?,
                body: body.clone(),
            },
            (Expr::Let { name, value, body }, PathSegment::Body) => Expr::Let {
                name: name.clone(),
                value: value.clone(),
                body: replace_in(body)?,
            },
            _ => return None,
        };
        Some(node)
    }

    /// True if this expression calls `name` anywhere.
    pub fn calls(&self, name: &str) -> bool {
        match self {
            Expr::Literal { .. } | Expr::Variable { .. } => false,
            Expr::BinaryOp { left, right, .. } => left.calls(name) || right.calls(name),
            Expr::Conditional {
                cond,
                then_branch,
                else_branch,
            } => cond.calls(name) || then_branch.calls(name) || else_branch.calls(name),
            Expr::Call { callee, argument } => callee == name || argument.calls(name),
            Expr::Let { value, body, .. } => value.calls(name) || body.calls(name),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Function definitions
// ══════════════════════════════════════════════════════════════════════════════

/// `let [rec] name param = body`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub param: String,
    pub body: Expr,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>, param: impl Into<String>, body: Expr) -> Self {
        Self {
            name: name.into(),
            param: param.into(),
            body,
        }
    }

    /// True if the body refers to the function itself.
    pub fn is_recursive(&self) -> bool {
        self.body.calls(&self.name)
    }
}
