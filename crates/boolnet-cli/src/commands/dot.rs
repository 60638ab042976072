//! Graphviz export of the state graph and the wiring diagram.

use std::path::Path;

use anyhow::{Context, Result};
use boolnet_automaton::{BooleanNetwork, WiringDiagram};
use petgraph::dot::{Config, Dot};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use tracing::info;

/// One node per state, one labelled edge per transition.
pub fn state_graph(network: &BooleanNetwork) -> StableDiGraph<String, String> {
    let table = network.get_state_transition();
    let mut graph = StableDiGraph::with_capacity(table.len(), table.len());

    let nodes: Vec<NodeIndex> = table
        .iter()
        .map(|(current, _)| graph.add_node(current.to_string()))
        .collect();

    for (i, (current, next)) in table.iter().enumerate() {
        let label = format!("{current} → {next}");
        graph.add_edge(nodes[i], nodes[next.index()], label);
    }
    graph
}

/// One node per entity, one edge per regulator (self-loops omitted).
pub fn wiring_graph(network: &BooleanNetwork) -> Result<StableDiGraph<String, String>> {
    let wiring = WiringDiagram::analyze(network.get_state_transition())?;
    let mut graph = StableDiGraph::new();

    let nodes: Vec<NodeIndex> = network
        .entity_names()
        .iter()
        .map(|name| graph.add_node(name.clone()))
        .collect();

    for (source, target) in wiring.edges(false) {
        graph.add_edge(nodes[source], nodes[target], String::new());
    }
    Ok(graph)
}

/// Render DOT text and print it or write it to `output`.
pub fn run(network: &BooleanNetwork, wiring: bool, output: Option<&Path>) -> Result<()> {
    let text = if wiring {
        let graph = wiring_graph(network)?;
        Dot::with_config(&graph, &[Config::EdgeNoLabel]).to_string()
    } else {
        let graph = state_graph(network);
        Dot::with_config(&graph, &[]).to_string()
    };

    match output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write DOT to {}", path.display()))?;
            info!(path = %path.display(), "Wrote DOT file");
            println!("Wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
