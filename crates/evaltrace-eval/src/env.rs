//! Immutable binding environment for the stepper.

use crate::error::{TraceError, TraceResult};
use evaltrace_types::{Binding, EnvSnapshot};
use std::rc::Rc;

/// One link of the binding chain, newest first.
#[derive(Debug)]
struct Node {
    name: String,
    value: i64,
    parent: Option<Rc<Node>>,
}

/// Ordered, immutable set of name/value bindings for one call frame.
///
/// `bind` never touches the receiver: it returns a new frame that shares
/// the receiver's bindings. Earlier frames stay valid after deeper
/// evaluation has moved on, so a step can always be rendered against the
/// frame it was taken from. Cloning is O(1).
#[derive(Debug, Clone, Default)]
pub struct Environment {
    head: Option<Rc<Node>>,
    len: usize,
}

impl Environment {
    /// A frame with no bindings.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A new frame equal to this one plus `name = value`.
    ///
    /// Fails with `DuplicateBinding` if `name` is already bound here.
    pub fn bind(&self, name: &str, value: i64) -> TraceResult<Self> {
        if self.contains(name) {
            return Err(TraceError::DuplicateBinding(name.to_string()));
        }
        Ok(Self {
            head: Some(Rc::new(Node {
                name: name.to_string(),
                value,
                parent: self.head.clone(),
            })),
            len: self.len + 1,
        })
    }

    /// The value bound to `name`, or `UnboundName`.
    pub fn lookup(&self, name: &str) -> TraceResult<i64> {
        self.nodes()
            .find(|n| n.name == name)
            .map(|n| n.value)
            .ok_or_else(|| TraceError::UnboundName(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes().any(|n| n.name == name)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        let mut newest_first: Vec<&Node> = self.nodes().collect();
        newest_first.reverse();
        newest_first.into_iter().map(|n| (n.name.as_str(), n.value))
    }

    /// A plain copy of the bindings, oldest first.
    pub fn snapshot(&self) -> EnvSnapshot {
        EnvSnapshot::new(
            self.iter()
                .map(|(name, value)| Binding {
                    name: name.to_string(),
                    value,
                })
                .collect(),
        )
    }

    fn nodes(&self) -> impl Iterator<Item = &Node> {
        std::iter::successors(self.head.as_deref(), |n| n.parent.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let env = Environment::empty();
        assert!(env.is_empty());
        assert_eq!(env.len(), 0);
        assert!(env.snapshot().is_empty());
    }

    #[test]
    fn test_bind_and_lookup() {
        let env = Environment::empty().bind("x", 5).unwrap();
        assert_eq!(env.lookup("x"), Ok(5));
        assert_eq!(
            env.lookup("y"),
            Err(TraceError::UnboundName("y".to_string()))
        );
    }

    #[test]
    fn test_bind_leaves_original_unchanged() {
        let base = Environment::empty().bind("x", 5).unwrap();
        let extended = base.bind("pred_x", 4).unwrap();
        assert_eq!(base.len(), 1);
        assert!(!base.contains("pred_x"));
        assert_eq!(extended.len(), 2);
        assert_eq!(extended.lookup("x"), Ok(5));
        assert_eq!(extended.lookup("pred_x"), Ok(4));
    }

    #[test]
    fn test_sibling_frames_are_independent() {
        let base = Environment::empty().bind("a", 1).unwrap();
        let left = base.bind("b", 2).unwrap();
        let right = base.bind("c", 3).unwrap();
        assert!(left.contains("b") && !left.contains("c"));
        assert!(right.contains("c") && !right.contains("b"));
        drop(base);
        assert_eq!(left.lookup("a"), Ok(1));
        assert_eq!(right.lookup("a"), Ok(1));
    }

    #[test]
    fn test_duplicate_binding_rejected() {
        let env = Environment::empty().bind("n", 3).unwrap();
        assert_eq!(
            env.bind("n", 2).unwrap_err(),
            TraceError::DuplicateBinding("n".to_string())
        );
        assert_eq!(env.lookup("n"), Ok(3));
    }

    #[test]
    fn test_iter_is_insertion_ordered() {
        let env = Environment::empty()
            .bind("x", 5)
            .and_then(|e| e.bind("pred_x", 4))
            .unwrap();
        let pairs: Vec<_> = env.iter().collect();
        assert_eq!(pairs, vec![("x", 5), ("pred_x", 4)]);
        assert_eq!(env.snapshot().to_string(), "{x: 5, pred_x: 4}");
    }
}
