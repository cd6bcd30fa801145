//! Immutable scene graph produced by the renderer
//!
//! The scene only holds geometry and style. Turning it into markup is the
//! job of a serializer such as [`crate::svg`]; hosts that draw some other
//! way can read the elements directly or take the JSON form.

use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::flow::FlowGraph;
use crate::layout::{Layout, Point};

/// Id shared by the arrowhead marker and every connector referencing it
pub const ARROWHEAD_ID: &str = "arrowhead";

/// `min-x min-y width height` of the drawing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

/// A line of text, anchored at its horizontal middle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub content: String,
    pub position: Point,
    pub font_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Center vertically on `position.y` instead of sitting on it
    #[serde(default)]
    pub middle_baseline: bool,
}

/// Arrowhead definition drawn at the end of connectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub ref_x: f64,
    pub ref_y: f64,
    /// Polygon outline in marker units
    pub points: Vec<Point>,
    pub fill: String,
}

/// Cubic Bézier segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicCurve {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl CubicCurve {
    /// Curve leaving `start` straight down and entering `end` straight down
    pub fn vertical(start: Point, end: Point, offset: f64) -> Self {
        Self {
            start,
            control1: Point::new(start.x, start.y + offset),
            control2: Point::new(end.x, end.y - offset),
            end,
        }
    }

    /// SVG path data, e.g. `M400,180 C400,210 400,190 400,220`
    pub fn path_data(&self) -> String {
        format!(
            "M{},{} C{},{} {},{} {},{}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y
        )
    }
}

/// Curved arrow for one edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub source: String,
    pub target: String,
    pub curve: CubicCurve,
    pub stroke: String,
    pub stroke_width: f64,
    pub marker_id: String,
}

/// Rounded box behind a node label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectShape {
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
}

/// Group for one task: the group is translated, children use local units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeElement {
    pub task: String,
    pub translate: Point,
    pub rect: RectShape,
    pub label: TextElement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Text(TextElement),
    Marker(Marker),
    Connector(Connector),
    Node(NodeElement),
}

/// Complete drawing of a flow, in paint order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Flow name, used for the export file name
    pub name: String,
    pub view_box: ViewBox,
    pub elements: Vec<Element>,
}

impl Scene {
    /// Build the scene: title, optional description, the arrowhead marker,
    /// connectors, then nodes on top of the connector ends
    pub fn build(flow: &FlowGraph, layout: &Layout, config: &RenderConfig) -> Self {
        let geometry = &config.layout;
        let theme = &config.theme;
        let center_x = geometry.center_x();

        let mut elements =
            Vec::with_capacity(3 + flow.connections.len() + layout.nodes.len());

        elements.push(Element::Text(TextElement {
            content: flow.name.clone(),
            position: Point::new(center_x, geometry.title_y),
            font_size: theme.title_font_size,
            font_weight: Some(theme.title_font_weight.clone()),
            fill: None,
            middle_baseline: false,
        }));

        if !flow.description.is_empty() {
            elements.push(Element::Text(TextElement {
                content: flow.description.clone(),
                position: Point::new(center_x, geometry.description_y),
                font_size: theme.description_font_size,
                font_weight: None,
                fill: None,
                middle_baseline: false,
            }));
        }

        elements.push(Element::Marker(Marker {
            id: ARROWHEAD_ID.to_string(),
            width: 10.0,
            height: 7.0,
            ref_x: 10.0,
            ref_y: 3.5,
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 3.5),
                Point::new(0.0, 7.0),
            ],
            fill: theme.connector_color.clone(),
        }));

        for edge in &flow.connections {
            let (Some(source), Some(target)) =
                (layout.node(&edge.source), layout.node(&edge.target))
            else {
                continue;
            };
            elements.push(Element::Connector(Connector {
                source: edge.source.clone(),
                target: edge.target.clone(),
                curve: CubicCurve::vertical(
                    source.bottom_center(),
                    target.top_center(),
                    geometry.curve_offset,
                ),
                stroke: theme.connector_color.clone(),
                stroke_width: theme.connector_width,
                marker_id: ARROWHEAD_ID.to_string(),
            }));
        }

        for (name, node) in &layout.nodes {
            elements.push(Element::Node(NodeElement {
                task: name.clone(),
                translate: node.origin,
                rect: RectShape {
                    width: node.width,
                    height: node.height,
                    corner_radius: theme.corner_radius,
                    fill: theme.node_fill.clone(),
                    stroke: theme.node_stroke.clone(),
                    stroke_width: theme.node_stroke_width,
                },
                label: TextElement {
                    content: config.labels.label_for(name),
                    position: Point::new(node.width / 2.0, node.height / 2.0),
                    font_size: theme.label_font_size,
                    font_weight: None,
                    fill: Some(theme.label_color.clone()),
                    middle_baseline: true,
                },
            }));
        }

        Self {
            name: flow.name.clone(),
            view_box: ViewBox {
                min_x: 0.0,
                min_y: 0.0,
                width: geometry.canvas_width,
                height: geometry.canvas_height,
            },
            elements,
        }
    }

    /// Title text (always the first element)
    pub fn title(&self) -> Option<&TextElement> {
        match self.elements.first() {
            Some(Element::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.elements.iter().filter_map(|element| match element {
            Element::Connector(connector) => Some(connector),
            _ => None,
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeElement> {
        self.elements.iter().filter_map(|element| match element {
            Element::Node(node) => Some(node),
            _ => None,
        })
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.elements.iter().filter_map(|element| match element {
            Element::Marker(marker) => Some(marker),
            _ => None,
        })
    }

    /// Suggested file name when a host saves the drawing
    pub fn export_file_name(&self) -> String {
        let stem = if self.name.is_empty() {
            "flow"
        } else {
            self.name.as_str()
        };
        format!("{stem}_diagram.svg")
    }

    /// Serialize the scene as JSON for hosts that draw it themselves
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
