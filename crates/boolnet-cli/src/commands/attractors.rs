//! Attractor listing.

use anyhow::Result;
use boolnet_automaton::{AnalysisConfig, AttractorAnalysis, AttractorDetector, BooleanNetwork};
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct AttractorReport {
    cycle: Vec<String>,
    period: usize,
    basin: usize,
}

/// Detect and print the attractors of `network`.
pub fn run(network: &BooleanNetwork, parallel: bool, basins: bool, json: bool) -> Result<()> {
    let analysis = analyze(network, parallel)?;
    let sizes = analysis.basin_sizes();

    if json {
        let reports: Vec<AttractorReport> = analysis
            .attractors()
            .iter()
            .zip(&sizes)
            .map(|(attractor, &basin)| AttractorReport {
                cycle: attractor.states().iter().map(ToString::to_string).collect(),
                period: attractor.period(),
                basin,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!("Detected Attractors:");
    for (attractor, basin) in analysis.attractors().iter().zip(&sizes) {
        if basins {
            println!("Cycle: {attractor}  (basin: {basin} states)");
        } else {
            println!("Cycle: {attractor}");
        }
    }
    Ok(())
}

fn analyze(network: &BooleanNetwork, parallel: bool) -> Result<AttractorAnalysis> {
    if !parallel || network.config().parallel {
        return Ok(network.attractors()?);
    }
    info!("Running parallel attractor scan");
    let config = AnalysisConfig {
        parallel: true,
        ..network.config().clone()
    };
    Ok(AttractorDetector::with_config(config).analyze(network.get_state_transition())?)
}
