//! Mark a hexagonal element and propagate the mark onto its boundary.
//!
//! Builds a hexagon next to a small square, then drives Prod9/Prod10 until
//! neither matches, printing the edge set after every rewrite. Rewrites are
//! logged through `tracing`; raise the level with `RUST_LOG=debug`.
//!
//! Run with:
//! ```bash
//! cargo run --example hexagon_refinement -p hypergrammar-productions
//! ```

use std::sync::Arc;

use anyhow::Context;
use hypergrammar_productions::test_fixtures::TestHypergraphBuilder;
use hypergrammar_productions::{
    CompositeProduction, EdgeKind, ExtentCriterion, GrammarConfig, Hypergraph, Production,
};
use tracing_subscriber::EnvFilter;

const MAX_STEPS: usize = 32;

fn build_mesh() -> Hypergraph {
    let hexagon = ["h0", "h1", "h2", "h3", "h4", "h5"];
    let mut builder = TestHypergraphBuilder::new()
        .cycle(&hexagon)
        .element(&hexagon, 0)
        .cycle(&["h0", "h1", "s2", "s3"])
        .element(&["h0", "h1", "s2", "s3"], 0);

    for (i, name) in hexagon.iter().enumerate() {
        let angle = std::f64::consts::TAU * i as f64 / 6.0;
        builder = builder.position(name, angle.cos(), angle.sin());
    }

    builder
        .position("s2", 1.0, -0.9)
        .position("s3", 0.5, -0.9)
        .rfc(Arc::new(ExtentCriterion::new(1.0)))
        .build()
}

fn print_graph(step: usize, graph: &Hypergraph) {
    println!("── step {step} ──");
    for kind in [EdgeKind::Q, EdgeKind::E] {
        for edge in graph.edges_of_kind(kind) {
            let marker = if edge.is_marked() { "●" } else { "○" };
            println!("  {marker} {edge}");
        }
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Prod0 would reject the hexagon as a malformed quad, so only the
    // hexagon productions take part.
    let productions: Vec<Arc<dyn Production>> = GrammarConfig::fast()
        .productions()
        .into_iter()
        .filter(|p| p.id().name() != "prod0")
        .rev()
        .collect();
    let grammar = CompositeProduction::new("hexagon", "Propagate, then mark")
        .with_productions(productions);

    let mut graph = build_mesh();
    print_graph(0, &graph);

    for step in 1..=MAX_STEPS {
        match grammar
            .apply(&graph)
            .with_context(|| format!("step {step} failed"))?
        {
            Some(next) => {
                graph = next;
                print_graph(step, &graph);
            }
            None => {
                println!("\nFixpoint reached after {} rewrites.", step - 1);
                return Ok(());
            }
        }
    }

    anyhow::bail!("no fixpoint within {MAX_STEPS} steps")
}
