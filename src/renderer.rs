//! Renderer: flow graph in, scene out

use tracing::{debug, instrument, warn};

use crate::config::RenderConfig;
use crate::error::Result;
use crate::flow::FlowGraph;
use crate::layout::Layout;
use crate::parser::Parser;
use crate::scene::Scene;

/// Lays out and draws flows with one configuration
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
    parser: Parser,
}

impl Renderer {
    /// Fails with `InvalidConfig` when `config` does not validate
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            parser: Parser::new(),
        })
    }

    /// Build a renderer from YAML config text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::new(RenderConfig::from_yaml_str(yaml)?)
    }

    /// Use a custom parser for [`Renderer::render_source`]
    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parser = parser;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Lay out `flow` and build its scene.
    ///
    /// Each call starts from scratch; the result never depends on what was
    /// rendered before.
    #[instrument(skip_all, fields(flow = %flow.name))]
    pub fn render(&self, flow: &FlowGraph) -> Result<Scene> {
        let layout = Layout::compute(flow, &self.config.layout).map_err(|err| {
            warn!(code = err.code(), error = %err, "flow cannot be laid out");
            err
        })?;
        let scene = Scene::build(flow, &layout, &self.config);
        debug!(elements = scene.elements.len(), "scene built");
        Ok(scene)
    }

    /// Render straight to an SVG document
    pub fn render_svg(&self, flow: &FlowGraph) -> Result<String> {
        Ok(self.render(flow)?.to_svg())
    }

    /// Parse DSL text and render it
    pub fn render_source(&self, text: &str) -> Result<Scene> {
        self.render(&self.parser.parse(text))
    }
}

/// Render with the default configuration
pub fn render(flow: &FlowGraph) -> Result<Scene> {
    Renderer::default().render(flow)
}

/// Render to SVG with the default configuration
pub fn render_svg(flow: &FlowGraph) -> Result<String> {
    Renderer::default().render_svg(flow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowError;
    use crate::flow::Edge;
    use crate::parser::parse;

    #[test]
    fn test_render_simple_flow() {
        let scene = render(&parse("flow demo:\na -> b")).unwrap();
        assert_eq!(scene.name, "demo");
        assert_eq!(scene.nodes().count(), 2);
        assert_eq!(scene.connectors().count(), 1);
    }

    #[test]
    fn test_render_is_repeatable() {
        let renderer = Renderer::default();
        let flow = parse("flow f:\na -> b\na -> c\nb -> d\nc -> d");

        let first = renderer.render(&flow).unwrap();
        let second = renderer.render(&flow).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_cycle_fails() {
        let err = render(&parse("flow f:\na -> b\nb -> a")).unwrap_err();
        assert_eq!(err.code(), "FLOW-020");
    }

    #[test]
    fn test_render_unknown_task_fails() {
        let flow = FlowGraph {
            connections: vec![Edge::new("a", "ghost")],
            ..FlowGraph::default()
        };
        let err = render(&flow).unwrap_err();
        assert!(matches!(err, FlowError::UnknownTask { ref task, .. } if task == "a"));
    }

    #[test]
    fn test_render_empty_flow() {
        let scene = render(&FlowGraph::new()).unwrap();
        assert_eq!(scene.nodes().count(), 0);
        assert_eq!(scene.markers().count(), 1);
    }

    #[test]
    fn test_renderer_uses_config() {
        let renderer = Renderer::from_yaml_str("theme:\n  node_fill: \"#ff0000\"\n").unwrap();
        let svg = renderer.render_svg(&parse("flow f:\na -> b")).unwrap();
        assert!(svg.contains("fill=\"#ff0000\""));
        assert_eq!(renderer.config().theme.node_fill, "#ff0000");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = RenderConfig::default();
        config.layout.node_width = 0.0;
        let err = Renderer::new(config).unwrap_err();
        assert_eq!(err.code(), "FLOW-030");

        let mut config = RenderConfig::default();
        config.layout.vertical_spacing = f64::NAN;
        assert!(Renderer::new(config).is_err());
    }

    #[test]
    fn test_new_accepts_default_config() {
        let renderer = Renderer::new(RenderConfig::default()).unwrap();
        assert_eq!(renderer.config(), &RenderConfig::default());
    }

    #[test]
    fn test_render_source_with_custom_parser() {
        let renderer = Renderer::default().with_parser(Parser::new().keep_isolated_tasks(true));
        let scene = renderer.render_source("flow f:\nsolo").unwrap();
        assert_eq!(scene.nodes().next().unwrap().task, "solo");
    }
}
