//! Quick benchmark for parse, layout and SVG output on generated flows
//!
//! Run with `RUST_LOG=flowdraw=debug` to see the per-stage spans.

use flowdraw::{parse, Grammar, Renderer};
use std::time::Instant;

/// Layered flow: `width` tasks per level, each wired to every task below
fn generate(levels: usize, width: usize) -> String {
    let mut dsl = String::from("flow generated:\n    description: \"benchmark\"\n");
    for level in 0..levels.saturating_sub(1) {
        for from in 0..width {
            for to in 0..width {
                dsl.push_str(&format!("    l{level}_{from} -> l{}_{to}\n", level + 1));
            }
        }
    }
    dsl
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let renderer = Renderer::default();
    let grammar = Grammar::flow();

    println!("Flow Rendering Performance Test");
    println!("===============================\n");

    for (levels, width) in [(3, 2), (10, 3), (25, 4)] {
        let dsl = generate(levels, width);
        let iterations = 1_000u32;

        let start = Instant::now();
        for _ in 0..iterations {
            let _ = parse(&dsl);
        }
        let parse_time = start.elapsed();

        let flow = parse(&dsl);
        let start = Instant::now();
        for _ in 0..iterations {
            let _ = renderer.render_svg(&flow);
        }
        let render_time = start.elapsed();

        let start = Instant::now();
        for _ in 0..iterations {
            let _ = grammar.tokenize(&dsl);
        }
        let tokenize_time = start.elapsed();

        println!(
            "Flow: {} tasks, {} connections",
            flow.tasks.len(),
            flow.connections.len()
        );
        println!("  Parse per op:    {:?}", parse_time / iterations);
        println!("  Render per op:   {:?}", render_time / iterations);
        println!("  Tokenize per op: {:?}\n", tokenize_time / iterations);
    }
}
