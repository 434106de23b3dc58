//! Evaluation steps handed to renderers.

use crate::path::ExprPath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of progress a step records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// A name was bound to a value (call parameter or `let`).
    Bind,
    /// A variable occurrence was replaced by its bound value.
    Substitute,
    /// An operator application collapsed to its value.
    Reduce,
    /// A conditional chose one of its arms.
    Branch,
    /// A call finished and handed its value back to the caller.
    Return,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Bind => "bind",
            StepKind::Substitute => "substitute",
            StepKind::Reduce => "reduce",
            StepKind::Branch => "branch",
            StepKind::Return => "return",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single `name = value` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub value: i64,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

/// Ordered copy of an environment at one point of a trace, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvSnapshot {
    pub bindings: Vec<Binding>,
}

impl EnvSnapshot {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Value of the newest binding of `name`.
    pub fn get(&self, name: &str) -> Option<i64> {
        self.position(name).map(|i| self.bindings[i].value)
    }

    /// Index of the newest binding of `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.bindings.iter().rposition(|b| b.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.bindings.iter()
    }
}

impl fmt::Display for EnvSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, b) in self.bindings.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", b.name, b.value)?;
        }
        f.write_str("}")
    }
}

/// One observable unit of evaluation progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    /// Which sub-expression changed.
    pub path: ExprPath,
    /// Call depth of the frame this step belongs to; the first call is 0.
    pub depth: u32,
    /// Text of the target before the step.
    pub before: String,
    /// Text of the target after the step.
    pub after: String,
    /// Environment in effect once the step has happened.
    pub env: EnvSnapshot,
    /// Whole text of the frame's expression once the step has happened.
    pub residual: String,
    /// Integer carried by the step (bound, substituted, reduced, tested or returned).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<i64>,
    /// Function entered (`Bind`) or left (`Return`); `None` for `let` bindings.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub callee: Option<String>,
}

impl Step {
    /// True for the `Bind` that opens a call frame.
    pub fn is_call_bind(&self) -> bool {
        self.kind == StepKind::Bind && self.callee.is_some()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:indent$}{:<10} {:<28} {} ~> {}",
            "",
            self.kind,
            self.path.to_string(),
            self.before,
            self.after,
            indent = self.depth as usize * 2
        )
    }
}
