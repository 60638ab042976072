//! Named rule-set descriptors.
//!
//! A registry starts empty; drivers register the scenarios they want to
//! offer and build networks from them on demand.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::{NetworkError, NetworkResult};
use crate::network::BooleanNetwork;

/// A network definition: entity names and one optional formula per entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub entities: Vec<String>,
    /// `None` leaves the entity on the identity rule.
    pub formulas: Vec<Option<String>>,
}

impl RuleSet {
    /// Create a rule set with every entity on the identity rule.
    pub fn new<I, S>(name: impl Into<String>, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entities: Vec<String> = entities.into_iter().map(Into::into).collect();
        let formulas = vec![None; entities.len()];
        Self {
            name: name.into(),
            description: String::new(),
            entities,
            formulas,
        }
    }

    /// Set the description (builder pattern).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace all formulas, one per entity (builder pattern).
    pub fn with_formulas<I, S>(mut self, formulas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.formulas = formulas.into_iter().map(|f| Some(f.into())).collect();
        self
    }

    /// Build a network from this descriptor.
    pub fn build(&self, config: AnalysisConfig) -> NetworkResult<BooleanNetwork> {
        if self.formulas.len() != self.entities.len() {
            return Err(NetworkError::RuleCountMismatch {
                entities: self.entities.len(),
                rules: self.formulas.len(),
            });
        }
        BooleanNetwork::from_formulas(self.entities.clone(), &self.formulas, config)
    }
}

/// Rule sets by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct RuleSetRegistry {
    sets: Vec<RuleSet>,
}

impl RuleSetRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule set, replacing any existing one with the same name.
    pub fn register(&mut self, set: RuleSet) {
        match self.sets.iter_mut().find(|s| s.name == set.name) {
            Some(existing) => *existing = set,
            None => self.sets.push(set),
        }
    }

    /// Register a rule set (builder pattern).
    pub fn with_rule_set(mut self, set: RuleSet) -> Self {
        self.register(set);
        self
    }

    /// Look up a rule set by name.
    pub fn get(&self, name: &str) -> NetworkResult<&RuleSet> {
        self.sets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| NetworkError::UnknownRuleSet {
                name: name.to_string(),
            })
    }

    /// Check if a rule set exists.
    pub fn contains(&self, name: &str) -> bool {
        self.sets.iter().any(|s| s.name == name)
    }

    /// Registered names in order.
    pub fn names(&self) -> Vec<&str> {
        self.sets.iter().map(|s| s.name.as_str()).collect()
    }

    /// All rule sets in order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleSet> {
        self.sets.iter()
    }

    /// Number of rule sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
