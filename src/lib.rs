//! Flowdraw - render a small workflow DSL as a layered flow diagram
//!
//! ```
//! let flow = flowdraw::parse("flow deploy:\n  build -> test\n  test -> ship");
//! let svg = flowdraw::render_svg(&flow).unwrap();
//! assert!(svg.contains("<svg"));
//! ```

pub mod config;
pub mod dag;
pub mod error;
pub mod flow;
pub mod grammar;
pub mod layout;
pub mod parser;
pub mod renderer;
pub mod scene;
pub mod svg;

pub use config::{LabelConfig, LayoutConfig, RenderConfig, Theme};
pub use dag::DependencyGraph;
pub use error::{FixSuggestion, FlowError, Result};
pub use flow::{Edge, FlowGraph, Task};
pub use grammar::{Grammar, Token, TokenKind, TokenRule};
pub use layout::{Layout, NodeLayout, Point};
pub use parser::{looks_like_flow, parse, Parser};
pub use renderer::{render, render_svg, Renderer};
pub use scene::{Element, Scene};
pub use svg::to_svg;
