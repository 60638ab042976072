//! Choosing which network a command runs on.

use std::path::PathBuf;

use anyhow::{Context, Result};
use boolnet_automaton::{BooleanNetwork, NetworkStore};
use clap::Args;
use tracing::debug;

use crate::config::Config;
use crate::presets::{self, DEFAULT_PRESET};

/// Network selection and rule mutation flags shared by analysis commands.
#[derive(Args, Debug, Clone)]
pub struct NetworkArgs {
    /// Bundled scenario to load (see `bn presets`). Defaults to `poster`.
    #[arg(short, long, conflicts_with_all = ["load", "csv"])]
    pub preset: Option<String>,

    /// Saved network to load, as NAME@VERSION.
    #[arg(short, long, value_name = "NAME@VERSION", conflicts_with = "csv")]
    pub load: Option<String>,

    /// Truth table to synthesize rules from (header row, inputs then outputs).
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Replace one entity's rule, as INDEX=FORMULA (repeatable).
    #[arg(long = "set", value_name = "INDEX=FORMULA", allow_hyphen_values = true)]
    pub assignments: Vec<String>,

    /// Where rules come from: manual or external.
    #[arg(long, default_value = "manual")]
    pub source: String,
}

impl NetworkArgs {
    /// The default preset with no mutations.
    pub fn default_selection() -> Self {
        Self {
            preset: None,
            load: None,
            csv: None,
            assignments: Vec::new(),
            source: "manual".to_string(),
        }
    }

    /// Build the selected network and apply every `--set` in order.
    pub fn build(&self, config: &Config) -> Result<BooleanNetwork> {
        let analysis = config.analysis();

        let mut network = if let Some(reference) = &self.load {
            let (name, version) = split_reference(reference)?;
            let store = NetworkStore::new(&config.store_dir);
            BooleanNetwork::load_from(&store, name, version, analysis)?
        } else if let Some(path) = &self.csv {
            let store = NetworkStore::new(&config.store_dir);
            let (entities, table) = store
                .import_csv(path)
                .with_context(|| format!("Failed to import {}", path.display()))?;
            BooleanNetwork::from_truth_table(entities, &table, analysis)?
        } else {
            let name = self.preset.as_deref().unwrap_or(DEFAULT_PRESET);
            presets::registry().get(name)?.build(analysis)?
        };

        network.rules().load(&self.source)?;

        for assignment in &self.assignments {
            let (index, formula) = assignment
                .split_once('=')
                .with_context(|| format!("Expected INDEX=FORMULA, got: {assignment}"))?;
            let index: i64 = index
                .trim()
                .parse()
                .with_context(|| format!("Rule index is not an integer: {index}"))?;
            network.set_formula(index, formula.trim())?;
            debug!(index, formula = formula.trim(), "rule_replaced");
        }

        Ok(network)
    }
}

/// Split `name@version`.
pub fn split_reference(reference: &str) -> Result<(&str, &str)> {
    match reference.split_once('@') {
        Some((name, version)) if !name.is_empty() && !version.is_empty() => Ok((name, version)),
        _ => anyhow::bail!("Expected NAME@VERSION, got: {reference}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_reference() {
        assert_eq!(split_reference("poster@v1").unwrap(), ("poster", "v1"));
        assert!(split_reference("poster").is_err());
        assert!(split_reference("@v1").is_err());
        assert!(split_reference("poster@").is_err());
    }
}
