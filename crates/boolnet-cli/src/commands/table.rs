//! Truth table printer.

use anyhow::Result;
use boolnet_automaton::{BooleanNetwork, State};

/// Print every state, its successor, and a per-entity transition summary.
pub fn print(network: &BooleanNetwork) -> Result<()> {
    let names = network.entity_names();
    let primed: Vec<String> = names.iter().map(|n| format!("{n}'")).collect();
    let header = format!("{} | {} | Description", names.join(" | "), primed.join(" | "));

    println!("Truth Table for Boolean Network");
    println!("{header}");
    println!("{}", "-".repeat(header.chars().count()));

    for (current, next) in network.get_state_transition().iter() {
        let description = primed
            .iter()
            .zip(current.bits().iter().zip(next.bits()))
            .map(|(name, (&from, &to))| format!("{name}={}->{}", u8::from(from), u8::from(to)))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {} | {} | {description}", spaced(&current), spaced(&next));
    }
    Ok(())
}

fn spaced(state: &State) -> String {
    state
        .bits()
        .iter()
        .map(|&b| if b { "1" } else { "0" })
        .collect::<Vec<_>>()
        .join(" ")
}
