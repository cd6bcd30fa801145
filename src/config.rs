//! Render configuration
//!
//! All fields have defaults, so a host only spells out what it changes:
//!
//! ```yaml
//! layout:
//!   vertical_spacing: 140
//! theme:
//!   node_fill: "#2e8b57"
//! labels:
//!   underscores_as_spaces: false
//! ```
//!
//! The crate never reads files; hosts pass the YAML text in.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FlowError, Result};

/// Top-level render configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub layout: LayoutConfig,
    pub theme: Theme,
    pub labels: LabelConfig,
}

/// Geometry of the canvas, nodes and connectors (SVG user units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub node_width: f64,
    pub node_height: f64,
    /// Distance between the left edges of neighbouring nodes in a row
    pub horizontal_spacing: f64,
    /// Distance between the tops of consecutive rows
    pub vertical_spacing: f64,
    /// Top of the level-0 row
    pub start_y: f64,
    /// Vertical offset of both connector control points
    pub curve_offset: f64,
    pub title_y: f64,
    pub description_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            node_width: 120.0,
            node_height: 60.0,
            horizontal_spacing: 200.0,
            vertical_spacing: 100.0,
            start_y: 120.0,
            curve_offset: 30.0,
            title_y: 30.0,
            description_y: 55.0,
        }
    }
}

impl LayoutConfig {
    /// Horizontal center of the canvas; every row is centered on it
    pub fn center_x(&self) -> f64 {
        self.canvas_width / 2.0
    }
}

/// Colors and typography
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Theme {
    pub node_fill: String,
    pub node_stroke: String,
    pub node_stroke_width: f64,
    pub corner_radius: f64,
    pub label_color: String,
    pub label_font_size: f64,
    pub title_font_size: f64,
    pub title_font_weight: String,
    pub description_font_size: f64,
    pub connector_color: String,
    pub connector_width: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            node_fill: "#4682b4".to_string(),
            node_stroke: "#36648b".to_string(),
            node_stroke_width: 2.0,
            corner_radius: 5.0,
            label_color: "white".to_string(),
            label_font_size: 14.0,
            title_font_size: 20.0,
            title_font_weight: "bold".to_string(),
            description_font_size: 14.0,
            connector_color: "#36648b".to_string(),
            connector_width: 2.0,
        }
    }
}

/// How task names turn into node labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelConfig {
    /// `load_data` is drawn as `load data`
    pub underscores_as_spaces: bool,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            underscores_as_spaces: true,
        }
    }
}

impl LabelConfig {
    /// Node label for a task name
    pub fn label_for(&self, task_name: &str) -> String {
        if self.underscores_as_spaces {
            task_name.replace('_', " ")
        } else {
            task_name.to_string()
        }
    }
}

impl RenderConfig {
    /// Parse a YAML config; blank input yields the defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        debug!(?config, "render config loaded");
        Ok(config)
    }

    /// Serialize the config back to YAML
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject sizes that would make the layout meaningless
    pub fn validate(&self) -> Result<()> {
        let layout = &self.layout;
        let theme = &self.theme;
        let positive = [
            ("layout.canvas_width", layout.canvas_width),
            ("layout.canvas_height", layout.canvas_height),
            ("layout.node_width", layout.node_width),
            ("layout.node_height", layout.node_height),
            ("layout.horizontal_spacing", layout.horizontal_spacing),
            ("layout.vertical_spacing", layout.vertical_spacing),
            ("theme.label_font_size", theme.label_font_size),
            ("theme.title_font_size", theme.title_font_size),
            ("theme.description_font_size", theme.description_font_size),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(FlowError::InvalidConfig {
                    reason: format!("{field} must be a positive number, got {value}"),
                });
            }
        }

        let non_negative = [
            ("layout.start_y", layout.start_y),
            ("layout.curve_offset", layout.curve_offset),
            ("layout.title_y", layout.title_y),
            ("layout.description_y", layout.description_y),
            ("theme.node_stroke_width", theme.node_stroke_width),
            ("theme.corner_radius", theme.corner_radius),
            ("theme.connector_width", theme.connector_width),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(FlowError::InvalidConfig {
                    reason: format!("{field} must not be negative, got {value}"),
                });
            }
        }

        Ok(())
    }
}
