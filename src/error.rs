//! Error types with error codes and fix suggestions
//!
//! Error code ranges:
//! - FLOW-020-029: Graph errors (raised while laying out)
//! - FLOW-030-039: Configuration errors
//! - FLOW-040-049: Serialization errors
//!
//! Parsing never fails: malformed DSL lines are dropped, not reported.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlowError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum FlowError {
    // ─────────────────────────────────────────────────────────────
    // Graph errors (FLOW-020 to FLOW-021)
    // ─────────────────────────────────────────────────────────────
    #[error("[FLOW-020] Circular dependency detected: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    #[error("[FLOW-021] Edge '{edge}' references unknown task '{task}'")]
    UnknownTask { task: String, edge: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration errors (FLOW-030 to FLOW-031)
    // ─────────────────────────────────────────────────────────────
    #[error("[FLOW-030] Invalid render config: {reason}")]
    InvalidConfig { reason: String },

    #[error("[FLOW-031] Config parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ─────────────────────────────────────────────────────────────
    // Serialization errors (FLOW-040)
    // ─────────────────────────────────────────────────────────────
    #[error("[FLOW-040] JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlowError {
    /// Get the error code (e.g., "FLOW-020")
    pub fn code(&self) -> &'static str {
        match self {
            Self::CircularDependency { .. } => "FLOW-020",
            Self::UnknownTask { .. } => "FLOW-021",
            Self::InvalidConfig { .. } => "FLOW-030",
            Self::ConfigParse(_) => "FLOW-031",
            Self::Json(_) => "FLOW-040",
        }
    }

    /// True when the input graph itself cannot be drawn
    pub fn is_unrenderable(&self) -> bool {
        matches!(
            self,
            Self::CircularDependency { .. } | Self::UnknownTask { .. }
        )
    }
}

impl FixSuggestion for FlowError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            FlowError::CircularDependency { .. } => {
                Some("Remove one of the edges in the cycle so the flow has a start")
            }
            FlowError::UnknownTask { .. } => {
                Some("Insert the task into the graph or drop the edge that names it")
            }
            FlowError::InvalidConfig { .. } => {
                Some("Use positive values for node sizes, spacings and canvas dimensions")
            }
            FlowError::ConfigParse(_) => Some("Check YAML syntax: indentation and quoting"),
            FlowError::Json(_) => None,
        }
    }
}
