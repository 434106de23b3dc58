use serde::{Deserialize, Serialize};
use std::fmt;

/// Root name used for the driver's top-level call expression.
pub const MAIN_ROOT: &str = "main";

/// One step from a node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathSegment {
    Left,
    Right,
    Cond,
    Then,
    Else,
    Arg,
    Value,
    Body,
}

impl PathSegment {
    pub fn as_str(self) -> &'static str {
        match self {
            PathSegment::Left => "left",
            PathSegment::Right => "right",
            PathSegment::Cond => "cond",
            PathSegment::Then => "then",
            PathSegment::Else => "else",
            PathSegment::Arg => "arg",
            PathSegment::Value => "value",
            PathSegment::Body => "body",
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of a sub-expression.
///
/// `root` names the function whose body is being walked (or [`MAIN_ROOT`]),
/// `segments` lead from that body to the node. Displayed as
/// `fact/else/right/arg`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExprPath {
    pub root: String,
    pub segments: Vec<PathSegment>,
}

impl ExprPath {
    /// The path of a body root.
    pub fn root(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            segments: Vec::new(),
        }
    }

    /// Extend this path by one segment.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self {
            root: self.root.clone(),
            segments,
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for ExprPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
