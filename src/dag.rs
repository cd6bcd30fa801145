//! Dependency analysis over a parsed flow
//!
//! For an edge `source -> target`, `source` is a dependency of `target`.
//! Ordering uses a depth-first walk with three marks:
//! - Unvisited
//! - InProgress: on the current DFS path
//! - Finished: appended to the order, all its dependencies before it
//!
//! Meeting an InProgress task means the flow has a cycle.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, instrument, warn};

use crate::error::{FlowError, Result};
use crate::flow::FlowGraph;

/// Task -> tasks it depends on, borrowed from a `FlowGraph`
#[derive(Debug, Clone)]
pub struct DependencyGraph<'a> {
    /// Every task has an entry; sources are listed in edge order
    dependencies: IndexMap<&'a str, Vec<&'a str>>,
}

impl<'a> DependencyGraph<'a> {
    /// Build the dependency map by inverting the flow's edges.
    ///
    /// Fails with `UnknownTask` if an edge names a task missing from
    /// `flow.tasks` (parsed flows never do).
    pub fn from_flow(flow: &'a FlowGraph) -> Result<Self> {
        let mut dependencies: IndexMap<&'a str, Vec<&'a str>> = flow
            .tasks
            .keys()
            .map(|name| (name.as_str(), Vec::new()))
            .collect();

        for edge in &flow.connections {
            for endpoint in [&edge.source, &edge.target] {
                if !flow.tasks.contains_key(endpoint.as_str()) {
                    return Err(FlowError::UnknownTask {
                        task: endpoint.clone(),
                        edge: edge.to_string(),
                    });
                }
            }
            if let Some(deps) = dependencies.get_mut(edge.target.as_str()) {
                deps.push(edge.source.as_str());
            }
        }

        Ok(Self { dependencies })
    }

    /// Get dependencies of a task
    pub fn dependencies(&self, task: &str) -> &[&'a str] {
        self.dependencies.get(task).map_or(&[][..], Vec::as_slice)
    }

    pub fn task_count(&self) -> usize {
        self.dependencies.len()
    }

    /// Order tasks so that every dependency comes before its dependents.
    ///
    /// Roots are visited in task insertion order, dependencies in edge order,
    /// so the result is reproducible for a given flow.
    #[instrument(skip(self), fields(tasks = self.task_count()))]
    pub fn topological_order(&self) -> Result<Vec<&'a str>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            InProgress,
            Finished,
        }

        let mut marks: HashMap<&'a str, Mark> = HashMap::with_capacity(self.task_count());
        let mut order: Vec<&'a str> = Vec::with_capacity(self.task_count());
        // Current DFS path: each frame is a task and the index of its next
        // dependency to visit. Explicit so long chains cannot exhaust the stack.
        let mut stack: Vec<(&'a str, usize)> = Vec::new();

        for &root in self.dependencies.keys() {
            if marks.contains_key(root) {
                continue;
            }
            marks.insert(root, Mark::InProgress);
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let (task, next) = *frame;
                let Some(&dep) = self.dependencies(task).get(next) else {
                    stack.pop();
                    marks.insert(task, Mark::Finished);
                    order.push(task);
                    continue;
                };
                frame.1 += 1;

                match marks.get(dep).copied().unwrap_or(Mark::Unvisited) {
                    Mark::Finished => {}
                    Mark::InProgress => {
                        let err = cycle_error(dep, &stack);
                        warn!(error = %err, "flow cannot be ordered");
                        return Err(err);
                    }
                    Mark::Unvisited => {
                        marks.insert(dep, Mark::InProgress);
                        stack.push((dep, 0));
                    }
                }
            }
        }

        debug!(order = ?order, "topological order");
        Ok(order)
    }

    /// Assign each task its level: 0 without dependencies, otherwise one
    /// more than its deepest dependency.
    ///
    /// `order` must come from `topological_order`; the returned map follows it.
    pub fn levels(&self, order: &[&'a str]) -> IndexMap<&'a str, usize> {
        let mut levels: IndexMap<&'a str, usize> = IndexMap::with_capacity(order.len());
        for &task in order {
            let level = self
                .dependencies(task)
                .iter()
                .filter_map(|dep| levels.get(dep))
                .max()
                .map_or(0, |deepest| deepest + 1);
            levels.insert(task, level);
        }
        levels
    }
}

/// `CircularDependency` for a walk that reached `task` again.
///
/// `stack` runs from dependents down to dependencies; the cycle is flipped so
/// it reads in edge direction.
fn cycle_error(task: &str, stack: &[(&str, usize)]) -> FlowError {
    let start = stack.iter().position(|(t, _)| *t == task).unwrap_or(0);
    let mut cycle = Vec::with_capacity(stack.len() - start + 1);
    cycle.push(task.to_string());
    cycle.extend(stack[start + 1..].iter().rev().map(|(t, _)| t.to_string()));
    cycle.push(task.to_string());
    FlowError::CircularDependency { cycle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Edge;
    use crate::parser::parse;

    fn flow_from_edges(edges: &[(&str, &str)]) -> FlowGraph {
        let mut flow = FlowGraph::new();
        for (source, target) in edges {
            flow.connect(source, target);
        }
        flow
    }

    // ═══════════════════════════════════════════════════════════════
    // DEPENDENCY MAP
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn test_dependencies_follow_edge_order() {
        let flow = flow_from_edges(&[("b", "d"), ("a", "d"), ("c", "d")]);
        let graph = DependencyGraph::from_flow(&flow).unwrap();

        assert_eq!(graph.dependencies("d"), &["b", "a", "c"]);
        assert!(graph.dependencies("a").is_empty());
        assert!(graph.dependencies("missing").is_empty());
        assert_eq!(graph.task_count(), 4);
    }

    #[test]
    fn test_unknown_task_in_edge() {
        let mut flow = flow_from_edges(&[("a", "b")]);
        flow.connections.push(Edge::new("b", "ghost"));

        let err = DependencyGraph::from_flow(&flow).unwrap_err();
        assert_eq!(err.code(), "FLOW-021");
        assert!(err.to_string().contains("ghost"));
    }

    // ═══════════════════════════════════════════════════════════════
    // TOPOLOGICAL ORDER
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn test_order_linear_chain() {
        let flow = flow_from_edges(&[("b", "c"), ("a", "b")]);
        let graph = DependencyGraph::from_flow(&flow).unwrap();

        assert_eq!(graph.topological_order().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_order_diamond() {
        let flow = flow_from_edges(&[
            ("start", "t1"),
            ("t1", "t2"),
            ("t1", "t3"),
            ("t2", "t4"),
            ("t3", "t4"),
        ]);
        let graph = DependencyGraph::from_flow(&flow).unwrap();

        assert_eq!(
            graph.topological_order().unwrap(),
            vec!["start", "t1", "t2", "t3", "t4"]
        );
    }

    #[test]
    fn test_order_respects_every_edge() {
        let flow = parse("flow f:\ne -> f\nd -> e\nc -> d\nb -> c\na -> b\na -> f");
        let graph = DependencyGraph::from_flow(&flow).unwrap();
        let order = graph.topological_order().unwrap();

        let position = |name: &str| order.iter().position(|t| *t == name).unwrap();
        for edge in &flow.connections {
            assert!(
                position(edge.source.as_str()) < position(edge.target.as_str()),
                "{edge}"
            );
        }
    }

    #[test]
    fn test_order_empty_graph() {
        let flow = FlowGraph::new();
        let graph = DependencyGraph::from_flow(&flow).unwrap();
        assert!(graph.topological_order().unwrap().is_empty());
    }

    #[test]
    fn test_cycle_three_nodes() {
        let flow = flow_from_edges(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let graph = DependencyGraph::from_flow(&flow).unwrap();

        let err = graph.topological_order().unwrap_err();
        match err {
            FlowError::CircularDependency { cycle } => {
                assert_eq!(cycle, vec!["a", "b", "c", "a"]);
            }
            other => panic!("expected circular dependency, got {other:?}"),
        }
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let flow = flow_from_edges(&[("a", "a")]);
        let graph = DependencyGraph::from_flow(&flow).unwrap();

        let err = graph.topological_order().unwrap_err();
        assert_eq!(err.code(), "FLOW-020");
        assert!(err.to_string().contains("a -> a"));
    }

    #[test]
    fn test_cycle_behind_acyclic_prefix() {
        let flow = flow_from_edges(&[("start", "x"), ("x", "y"), ("y", "x")]);
        let graph = DependencyGraph::from_flow(&flow).unwrap();

        match graph.topological_order().unwrap_err() {
            FlowError::CircularDependency { cycle } => {
                assert_eq!(cycle.first(), cycle.last());
                assert!(!cycle.contains(&"start".to_string()));
            }
            other => panic!("expected circular dependency, got {other:?}"),
        }
    }

    #[test]
    fn test_order_long_chain_listed_bottom_up() {
        // Listed so the first root visited is the end of the chain
        let edges: Vec<(String, String)> = (0..10_000)
            .rev()
            .map(|i| (format!("t{i}"), format!("t{}", i + 1)))
            .collect();
        let mut flow = FlowGraph::new();
        for (source, target) in &edges {
            flow.connect(source, target);
        }
        let graph = DependencyGraph::from_flow(&flow).unwrap();
        let order = graph.topological_order().unwrap();

        assert_eq!(order.len(), 10_001);
        assert_eq!(order.first(), Some(&"t0"));
        assert_eq!(order.last(), Some(&"t10000"));

        let levels = graph.levels(&order);
        assert_eq!(levels["t10000"], 10_000);
    }

    #[test]
    fn test_cycle_at_end_of_long_chain() {
        let mut flow = FlowGraph::new();
        for i in (0..5_000).rev() {
            flow.connect(&format!("t{i}"), &format!("t{}", i + 1));
        }
        flow.connect("t5000", "t4999");
        let graph = DependencyGraph::from_flow(&flow).unwrap();

        match graph.topological_order().unwrap_err() {
            FlowError::CircularDependency { cycle } => {
                assert_eq!(cycle.len(), 3);
                assert_eq!(cycle.first(), cycle.last());
            }
            other => panic!("expected circular dependency, got {other:?}"),
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // LEVELS
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn test_levels_diamond() {
        let flow = flow_from_edges(&[
            ("start", "t1"),
            ("t1", "t2"),
            ("t1", "t3"),
            ("t2", "t4"),
            ("t3", "t4"),
        ]);
        let graph = DependencyGraph::from_flow(&flow).unwrap();
        let order = graph.topological_order().unwrap();
        let levels = graph.levels(&order);

        assert_eq!(levels["start"], 0);
        assert_eq!(levels["t1"], 1);
        assert_eq!(levels["t2"], 2);
        assert_eq!(levels["t3"], 2);
        assert_eq!(levels["t4"], 3);
    }

    #[test]
    fn test_levels_use_longest_chain() {
        // a -> d is a shortcut; d still sits below c
        let flow = flow_from_edges(&[("a", "b"), ("b", "c"), ("c", "d"), ("a", "d")]);
        let graph = DependencyGraph::from_flow(&flow).unwrap();
        let order = graph.topological_order().unwrap();
        let levels = graph.levels(&order);

        assert_eq!(levels["d"], 3);
    }

    #[test]
    fn test_levels_disconnected_roots() {
        let mut flow = flow_from_edges(&[("a", "b")]);
        flow.insert_task("solo");
        let graph = DependencyGraph::from_flow(&flow).unwrap();
        let order = graph.topological_order().unwrap();
        let levels = graph.levels(&order);

        assert_eq!(levels["a"], 0);
        assert_eq!(levels["solo"], 0);
        assert_eq!(levels["b"], 1);
    }
}
