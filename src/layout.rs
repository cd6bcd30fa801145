//! Layered layout: levels become rows, rows are centered on the canvas
//!
//! Recomputed from the `FlowGraph` on every render; nothing is cached.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::LayoutConfig;
use crate::dag::DependencyGraph;
use crate::error::Result;
use crate::flow::FlowGraph;

/// A position in SVG user units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Placement of one task's box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
    pub name: String,
    pub level: usize,
    /// Index within its row, left to right
    pub slot: usize,
    /// Top-left corner of the box
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl NodeLayout {
    /// Where outgoing connectors leave the box
    pub fn bottom_center(&self) -> Point {
        Point::new(self.origin.x + self.width / 2.0, self.origin.y + self.height)
    }

    /// Where incoming connectors enter the box
    pub fn top_center(&self) -> Point {
        Point::new(self.origin.x + self.width / 2.0, self.origin.y)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.width / 2.0,
            self.origin.y + self.height / 2.0,
        )
    }
}

/// Result of laying out a flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Dependencies before dependents
    pub order: Vec<String>,
    /// Task names per level, in order of appearance in `order`
    pub rows: Vec<Vec<String>>,
    /// Node boxes in the flow's task order
    pub nodes: IndexMap<String, NodeLayout>,
}

impl Layout {
    /// Order, level and place every task of `flow`.
    ///
    /// Fails with `CircularDependency` when the flow has a cycle; no partial
    /// layout is produced in that case.
    #[instrument(skip_all, fields(flow = %flow.name, tasks = flow.tasks.len()))]
    pub fn compute(flow: &FlowGraph, config: &LayoutConfig) -> Result<Self> {
        let graph = DependencyGraph::from_flow(flow)?;
        let order = graph.topological_order()?;
        let levels = graph.levels(&order);

        let depth = levels.values().copied().max().map_or(0, |deepest| deepest + 1);
        let mut rows: Vec<Vec<&str>> = vec![Vec::new(); depth];
        for (&task, &level) in &levels {
            rows[level].push(task);
        }

        let mut placed: IndexMap<&str, NodeLayout> = IndexMap::with_capacity(order.len());
        for (level, row) in rows.iter().enumerate() {
            let y = config.start_y + level as f64 * config.vertical_spacing;
            let left = row_left(row.len(), config);
            for (slot, &task) in row.iter().enumerate() {
                placed.insert(
                    task,
                    NodeLayout {
                        name: task.to_string(),
                        level,
                        slot,
                        origin: Point::new(left + slot as f64 * config.horizontal_spacing, y),
                        width: config.node_width,
                        height: config.node_height,
                    },
                );
            }
        }

        // Re-key in the flow's own task order so drawing order is stable
        let nodes: IndexMap<String, NodeLayout> = flow
            .tasks
            .keys()
            .filter_map(|name| placed.swap_remove(name.as_str()).map(|node| (name.clone(), node)))
            .collect();

        debug!(levels = rows.len(), nodes = nodes.len(), "layout computed");

        Ok(Self {
            order: order.into_iter().map(str::to_string).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect(),
            nodes,
        })
    }

    pub fn node(&self, name: &str) -> Option<&NodeLayout> {
        self.nodes.get(name)
    }

    pub fn level(&self, name: &str) -> Option<usize> {
        self.nodes.get(name).map(|node| node.level)
    }

    /// Top-left corner of a task's box
    pub fn position(&self, name: &str) -> Option<Point> {
        self.nodes.get(name).map(|node| node.origin)
    }

    /// Number of levels (0 for an empty flow)
    pub fn depth(&self) -> usize {
        self.rows.len()
    }
}

/// Left edge of a row of `count` nodes centered on the canvas
fn row_left(count: usize, config: &LayoutConfig) -> f64 {
    if count == 0 {
        return config.center_x();
    }
    let count = count as f64;
    let row_width = count * config.node_width
        + (count - 1.0) * (config.horizontal_spacing - config.node_width);
    config.center_x() - row_width / 2.0
}
