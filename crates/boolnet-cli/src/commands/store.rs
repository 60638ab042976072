//! Saving networks, listing saved versions and saving mutated copies.

use anyhow::{Context, Result};
use boolnet_automaton::{BooleanNetwork, NetworkRecord, NetworkStore, State};
use tracing::info;

use crate::commands::attractors;
use crate::config::Config;

/// Save `network` (rules and truth table) under `name` with tag `version`.
pub fn save(config: &Config, network: &BooleanNetwork, name: &str, version: &str) -> Result<()> {
    let store = NetworkStore::new(&config.store_dir);
    let record = NetworkRecord::from_network(network, true)?;
    let path = store
        .save(name, version, &record)
        .with_context(|| format!("Failed to save {name}@{version}"))?;
    println!("Saved {name}@{version} to {}", path.display());
    Ok(())
}

/// Print the saved versions of `name`.
pub fn versions(config: &Config, name: &str) -> Result<()> {
    let store = NetworkStore::new(&config.store_dir);
    let versions = store.list_versions(name)?;
    if versions.is_empty() {
        println!("No saved versions of {name}");
        return Ok(());
    }
    for version in versions {
        println!("{name}@{version}");
    }
    Ok(())
}

/// Flip the next value of one entity in one truth-table row, then save the
/// re-synthesized network under `name@version` and print its attractors.
///
/// `entity` is an index or an entity name.
pub fn mutate(
    config: &Config,
    network: &BooleanNetwork,
    state: &str,
    entity: &str,
    name: &str,
    version: &str,
) -> Result<()> {
    let state: State = state.parse()?;
    let index = match entity.parse::<usize>() {
        Ok(index) => index,
        Err(_) => network
            .entity_index(entity)
            .with_context(|| format!("Unknown entity: {entity}"))?,
    };

    let mutated = network.with_flipped_entry(&state, index)?;
    info!(%state, entity = index, "Flipped truth table entry");
    let next = mutated.get_next_state(&state)?;
    println!("{state} now steps to {next}");

    save(config, &mutated, name, version)?;
    attractors::run(&mutated, false, false, false)
}
