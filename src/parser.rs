//! Line-oriented DSL parser
//!
//! ```text
//! flow deploy:
//!     description: "Build and ship"
//!     task build:
//!         cmd: "make all"
//!     build -> test
//!     test --> ship
//! ```
//!
//! The first line may carry the `flow <name>:` header. Every later line is
//! classified on its own (description, connection, task header, property)
//! and anything else is dropped. Parsing never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use crate::flow::FlowGraph;

/// `flow <name>:` (only looked for on the first line)
static FLOW_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^flow\s+(\w+)\s*:").unwrap());

/// `description: <text>` with optional surrounding quotes
static DESCRIPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^description:\s*(.*)$").unwrap());

/// `<source> -> <target>`, any number of hyphens, anywhere in the line
static CONNECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\s*-+>\s*(\w+)").unwrap());

/// `task <name>:`
static TASK_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^task\s+(\w+)\s*:").unwrap());

/// A line holding a single identifier
static BARE_TASK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)$").unwrap());

/// Classification of one trimmed, non-blank line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Description(&'a str),
    Connection { source: &'a str, target: &'a str },
    TaskHeader(&'a str),
    Property { key: &'a str, value: &'a str },
    BareTask(&'a str),
    Ignored,
}

/// DSL parser
///
/// By default a document without any connection yields no tasks at all,
/// even when `task` headers are present. `keep_isolated_tasks(true)` keeps
/// them and also accepts bare identifier lines as task declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    keep_isolated_tasks: bool,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep tasks that never appear in a connection
    pub fn keep_isolated_tasks(mut self, keep: bool) -> Self {
        self.keep_isolated_tasks = keep;
        self
    }

    /// Parse DSL text into a flow graph
    #[instrument(skip(self, text), fields(bytes = text.len()))]
    pub fn parse(&self, text: &str) -> FlowGraph {
        let mut flow = FlowGraph::new();
        // Leading blank lines do not count; the header is the first text
        let mut lines = text.trim_start().lines();

        if let Some(first) = lines.next() {
            if let Some(caps) = FLOW_HEADER.captures(first.trim()) {
                flow.name = caps[1].to_string();
            }
        }

        // Task receiving property lines; cleared by any non-property line
        let mut current_task: Option<String> = None;

        for raw in lines {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            match self.classify(line, current_task.is_some()) {
                Line::Description(text) => {
                    flow.description = strip_quotes(text).to_string();
                    current_task = None;
                }
                Line::Connection { source, target } => {
                    flow.connect(source, target);
                    current_task = None;
                }
                Line::TaskHeader(name) => {
                    flow.insert_task(name);
                    current_task = Some(name.to_string());
                }
                Line::Property { key, value } => {
                    let Some(name) = current_task.as_deref() else {
                        continue;
                    };
                    if key == "name" {
                        debug!(task = name, "ignoring 'name' property");
                        continue;
                    }
                    if let Some(task) = flow.tasks.get_mut(name) {
                        task.properties
                            .insert(key.to_string(), strip_quotes(value).to_string());
                    }
                }
                Line::BareTask(name) => {
                    flow.insert_task(name);
                    current_task = None;
                }
                Line::Ignored => {
                    current_task = None;
                }
            }
        }

        flow.ensure_endpoints();

        if flow.connections.is_empty() && !self.keep_isolated_tasks && !flow.tasks.is_empty() {
            debug!(
                dropped = flow.tasks.len(),
                "no connections in document, dropping declared tasks"
            );
            flow.tasks.clear();
        }

        debug!(
            name = %flow.name,
            tasks = flow.tasks.len(),
            connections = flow.connections.len(),
            "parsed flow"
        );
        flow
    }

    /// First matching rule wins: description, connection, task header,
    /// property (only inside a task), bare task (only when enabled)
    fn classify<'a>(&self, line: &'a str, in_task: bool) -> Line<'a> {
        if let Some(caps) = DESCRIPTION.captures(line) {
            let text = caps.get(1).map_or("", |m| m.as_str());
            return Line::Description(text);
        }
        if let Some(caps) = CONNECTION.captures(line) {
            let (Some(source), Some(target)) = (caps.get(1), caps.get(2)) else {
                return Line::Ignored;
            };
            return Line::Connection {
                source: source.as_str(),
                target: target.as_str(),
            };
        }
        if let Some(name) = TASK_HEADER.captures(line).and_then(|caps| caps.get(1)) {
            return Line::TaskHeader(name.as_str());
        }
        if in_task {
            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim();
                if !key.is_empty() {
                    return Line::Property {
                        key,
                        value: value.trim(),
                    };
                }
            }
        }
        if self.keep_isolated_tasks && BARE_TASK.is_match(line) {
            return Line::BareTask(line);
        }
        Line::Ignored
    }
}

/// Parse DSL text with the default parser
pub fn parse(text: &str) -> FlowGraph {
    Parser::new().parse(text)
}

/// Host heuristic for picking flow blocks out of arbitrary code blocks
pub fn looks_like_flow(text: &str) -> bool {
    text.trim().starts_with("flow ")
}

/// Strip one pair of surrounding double quotes
fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}
