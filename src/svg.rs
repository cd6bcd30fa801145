//! SVG serialization of a [`Scene`]

use crate::scene::{Connector, Element, Marker, NodeElement, Scene, TextElement};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Serialize a scene to a standalone SVG document.
///
/// The drawing scales to its container (`width`/`height` are `100%`); the
/// viewBox is fixed, so large flows overflow instead of shrinking.
pub fn to_svg(scene: &Scene) -> String {
    let view_box = &scene.view_box;
    let mut svg = String::with_capacity(256 + scene.elements.len() * 192);

    svg.push_str(&format!(
        "<svg xmlns=\"{SVG_NS}\" width=\"100%\" height=\"100%\" viewBox=\"{} {} {} {}\">\n",
        view_box.min_x, view_box.min_y, view_box.width, view_box.height
    ));

    for element in &scene.elements {
        match element {
            Element::Text(text) => svg.push_str(&text_svg(text)),
            Element::Marker(marker) => svg.push_str(&marker_svg(marker)),
            Element::Connector(connector) => svg.push_str(&connector_svg(connector)),
            Element::Node(node) => svg.push_str(&node_svg(node)),
        }
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    svg
}

impl Scene {
    /// Shorthand for [`to_svg`]
    pub fn to_svg(&self) -> String {
        to_svg(self)
    }
}

fn text_svg(text: &TextElement) -> String {
    let mut attrs = format!(
        "x=\"{}\" y=\"{}\" text-anchor=\"middle\"",
        text.position.x, text.position.y
    );
    if text.middle_baseline {
        attrs.push_str(" dominant-baseline=\"middle\"");
    }
    if let Some(fill) = &text.fill {
        attrs.push_str(&format!(" fill=\"{}\"", escape_xml(fill)));
    }
    attrs.push_str(&format!(" font-size=\"{}\"", text.font_size));
    if let Some(weight) = &text.font_weight {
        attrs.push_str(&format!(" font-weight=\"{}\"", escape_xml(weight)));
    }
    format!("<text {attrs}>{}</text>", escape_xml(&text.content))
}

fn marker_svg(marker: &Marker) -> String {
    let points = marker
        .points
        .iter()
        .map(|p| format!("{} {}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "<defs><marker id=\"{}\" markerWidth=\"{}\" markerHeight=\"{}\" refX=\"{}\" refY=\"{}\" orient=\"auto\"><polygon points=\"{}\" fill=\"{}\"/></marker></defs>",
        escape_xml(&marker.id),
        marker.width,
        marker.height,
        marker.ref_x,
        marker.ref_y,
        points,
        escape_xml(&marker.fill)
    )
}

fn connector_svg(connector: &Connector) -> String {
    format!(
        "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" marker-end=\"url(#{})\"/>",
        connector.curve.path_data(),
        escape_xml(&connector.stroke),
        connector.stroke_width,
        escape_xml(&connector.marker_id)
    )
}

fn node_svg(node: &NodeElement) -> String {
    let rect = &node.rect;
    format!(
        "<g transform=\"translate({}, {})\"><rect width=\"{}\" height=\"{}\" rx=\"{}\" ry=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>{}</g>",
        node.translate.x,
        node.translate.y,
        rect.width,
        rect.height,
        rect.corner_radius,
        rect.corner_radius,
        escape_xml(&rect.fill),
        escape_xml(&rect.stroke),
        rect.stroke_width,
        text_svg(&node.label)
    )
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
