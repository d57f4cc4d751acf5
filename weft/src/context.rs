//! Workflow context: the ordered variable bag threaded through a run.
//!
//! Maps variable names to dynamically-typed [`Value`]s. Keys are unique and
//! insertion order is preserved, so iterating a context (and comparing one in
//! tests) is deterministic. Nodes take the context by value and return a new
//! one; ownership transfer guarantees each node an independent snapshot.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Dynamically-typed variable value: string, number, boolean, array, object,
/// or null. `serde_json::Value` is the tagged union used throughout.
pub type Value = serde_json::Value;

/// Names starting with this prefix are reserved for engine bookkeeping
/// (e.g. iteration counters) and are skipped when a node copies unmapped
/// variables forward between rounds.
pub const RESERVED_PREFIX: char = '_';

/// Returns true when the variable name belongs to the reserved key space.
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// Ordered mapping from variable name to [`Value`].
///
/// Created once per top-level run from caller-supplied initial values,
/// threaded through every node, and returned as the run result. Routing
/// intent never travels inside the context; nodes emit it through
/// [`Next`](crate::graph::Next) instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    vars: IndexMap<String, Value>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Builder-style insert, for seeding initial contexts.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the value of a variable, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Returns a variable's value as `&str` when it is a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.vars.get(name).and_then(Value::as_str)
    }

    /// True when the variable exists.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Removes a variable, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.vars.shift_remove(name)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True when no variables are set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterates variables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }

    /// Iterates variable names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.vars.keys()
    }
}

impl From<IndexMap<String, Value>> for Context {
    fn from(vars: IndexMap<String, Value>) -> Self {
        Self { vars }
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}
