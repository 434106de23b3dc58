//! Call-context panel derived from a step.
//!
//! The panel lists the bindings of the frame a step belongs to. A
//! `Substitute` step links the occurrence it replaced to the entry its
//! value came from; a `Bind` step marks the entry it added.

use evaltrace_types::{Binding, Step, StepKind};
use serde::Serialize;
use std::fmt;

pub const CONTEXT_TITLE: &str = "Context:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallContext {
    pub depth: u32,
    pub entries: Vec<Binding>,
    /// Entry whose value replaced the step's target.
    pub link: Option<usize>,
    /// Entry the step just added.
    pub added: Option<usize>,
}

impl CallContext {
    pub fn at(step: &Step) -> Self {
        let entries = step.env.bindings.clone();
        let link = match step.kind {
            // For substitutions `before` is exactly the variable name.
            StepKind::Substitute => step.env.position(&step.before),
            _ => None,
        };
        let added = match step.kind {
            StepKind::Bind => entries.len().checked_sub(1),
            _ => None,
        };
        Self {
            depth: step.depth,
            entries,
            link,
            added,
        }
    }

    pub fn linked_entry(&self) -> Option<&Binding> {
        self.link.and_then(|i| self.entries.get(i))
    }
}

impl fmt::Display for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CONTEXT_TITLE}")?;
        for (i, entry) in self.entries.iter().enumerate() {
            write!(f, "\n  {entry}")?;
            if self.link == Some(i) {
                f.write_str("  <- used")?;
            } else if self.added == Some(i) {
                f.write_str("  <- new")?;
            }
        }
        Ok(())
    }
}
