//! Sum-of-Products synthesis from the network's own transition table.

use std::collections::BTreeMap;

use anyhow::Result;
use boolnet_automaton::{describe, synthesize, BooleanNetwork};

/// Print one synthesized formula per entity.
pub fn run(network: &BooleanNetwork, json: bool) -> Result<()> {
    let names = network.entity_names();
    let table = network.get_state_transition().to_truth_table();
    let formulas = synthesize(&table, names)?;

    if json {
        let by_name: BTreeMap<&str, String> = names
            .iter()
            .map(String::as_str)
            .zip(formulas.iter().map(ToString::to_string))
            .collect();
        println!("{}", serde_json::to_string_pretty(&by_name)?);
        return Ok(());
    }

    for line in describe(&formulas, names)? {
        println!("{line}");
    }
    Ok(())
}
