//! A finished, restartable evaluation trace.

use crate::scenario::Scenario;
use evaltrace_types::{EnvSnapshot, Step, StepKind};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Every step of one scenario run, in evaluation order, plus its result.
///
/// A trace owns plain data: it can be iterated any number of times and
/// shared across threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub scenario: Scenario,
    pub argument: i64,
    /// Environment the top-level call was evaluated in.
    pub initial_env: EnvSnapshot,
    pub steps: Vec<Step>,
    pub result: i64,
}

impl Trace {
    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps of one kind, in order.
    pub fn of_kind(&self, kind: StepKind) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(move |s| s.kind == kind)
    }

    /// The `Bind` steps that open a call frame.
    pub fn call_binds(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| s.is_call_bind())
    }

    /// Deepest call depth reached.
    pub fn max_depth(&self) -> u32 {
        self.steps.iter().map(|s| s.depth).max().unwrap_or(0)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Lowercase hex SHA-256 of the compact JSON encoding.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let digest = Sha256::digest(self.to_json()?.as_bytes());
        Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
