//! Flow data model produced by the parser
//!
//! A `FlowGraph` is built once per parse and treated as immutable by the
//! layout stage, which recomputes everything it needs on every render.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A named task, optionally carrying free-form string properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    /// `key: value` lines found under the task header, in source order
    #[serde(flatten)]
    pub properties: IndexMap<String, String>,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    /// Get a property value by key
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Directed connection `source -> target`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Parsed flow: header, description, tasks and connections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowGraph {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Tasks keyed by name, in order of first appearance
    #[serde(default)]
    pub tasks: IndexMap<String, Task>,
    /// Edges in order of appearance; duplicates are kept
    #[serde(default)]
    pub connections: Vec<Edge>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a task by name
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// Check if task exists
    pub fn contains_task(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Insert a task unless one with the same name already exists.
    ///
    /// Returns the (possibly pre-existing) entry so callers can attach
    /// properties to it.
    pub fn insert_task(&mut self, name: &str) -> &mut Task {
        self.tasks
            .entry(name.to_string())
            .or_insert_with(|| Task::new(name))
    }

    /// Append an edge, creating both endpoints when they are missing
    pub fn connect(&mut self, source: &str, target: &str) {
        self.connections.push(Edge::new(source, target));
        self.insert_task(source);
        self.insert_task(target);
    }

    /// Make sure every edge endpoint has a task entry
    pub fn ensure_endpoints(&mut self) {
        let endpoints: Vec<String> = self
            .connections
            .iter()
            .flat_map(|edge| [edge.source.clone(), edge.target.clone()])
            .collect();
        for name in endpoints {
            self.insert_task(&name);
        }
    }

    /// True when the flow has neither tasks nor connections
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.connections.is_empty()
    }

    /// Task names in insertion order
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// Serialize the flow as pretty JSON
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
