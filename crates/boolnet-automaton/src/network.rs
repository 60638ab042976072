//! The synchronous Boolean network and its transition table.
//!
//! ```text
//! get_next_state(s)[i] = rule_i(s, i)   if slot i is set
//!                      = s[i]           otherwise
//! ```
//!
//! Every rule reads the same snapshot `s`, so an update never observes a
//! value written earlier in the same step.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::error::{NetworkError, NetworkResult};
use crate::expr;
use crate::rule::{ExprRule, SharedRule};
use crate::rule_store::RuleStore;
use crate::state::{state_count, State};
use crate::synth;
use crate::truth_table::TruthTable;

/// One binary variable of the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    /// Stable position in every state.
    pub index: usize,
    /// Display name, also used in formulas.
    pub name: String,
}

/// A deterministic one-step transition over a finite state space.
///
/// This is everything the attractor detector needs to know about a system.
pub trait StepFunction {
    /// Number of entities per state.
    fn entity_count(&self) -> usize;

    /// The unique successor of `state`.
    fn next_state(&self, state: &State) -> NetworkResult<State>;
}

/// Successor of every state, stored in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    entities: usize,
    successors: Vec<usize>,
}

impl TransitionTable {
    /// Build a table from successor indices in canonical order.
    pub fn from_successors(entities: usize, successors: Vec<usize>) -> NetworkResult<Self> {
        let expected = state_count(entities)?;
        if successors.len() != expected {
            return Err(NetworkError::length_mismatch(
                "transition table",
                expected,
                successors.len(),
            ));
        }
        if let Some(&bad) = successors.iter().find(|&&s| s >= expected) {
            return Err(NetworkError::IndexOutOfRange {
                index: bad.to_string(),
                len: expected,
            });
        }
        Ok(Self {
            entities,
            successors,
        })
    }

    /// Number of states (`2^N`).
    pub fn len(&self) -> usize {
        self.successors.len()
    }

    /// Always false: a table covers at least the empty state.
    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    /// Successor index of the state at canonical position `index`.
    pub fn successor(&self, index: usize) -> Option<usize> {
        self.successors.get(index).copied()
    }

    /// Successor of `state`, if it belongs to this table's state space.
    pub fn get(&self, state: &State) -> Option<State> {
        if state.len() != self.entities {
            return None;
        }
        self.successor(state.index())
            .map(|next| State::from_index(self.entities, next))
    }

    /// `(current, next)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (State, State)> + '_ {
        self.successors.iter().enumerate().map(|(i, &next)| {
            (
                State::from_index(self.entities, i),
                State::from_index(self.entities, next),
            )
        })
    }

    /// States that map to themselves.
    pub fn fixed_points(&self) -> Vec<State> {
        self.successors
            .iter()
            .enumerate()
            .filter(|&(i, &next)| i == next)
            .map(|(i, _)| State::from_index(self.entities, i))
            .collect()
    }

    /// Number of predecessors of every state, in canonical order.
    ///
    /// States with in-degree 0 are Garden-of-Eden states.
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.successors.len()];
        for &next in &self.successors {
            degrees[next] += 1;
        }
        degrees
    }

    /// The same mapping as a truth table.
    pub fn to_truth_table(&self) -> TruthTable {
        self.iter()
            .map(|(current, next)| (current, next.into_bits()))
            .collect()
    }
}

impl StepFunction for TransitionTable {
    fn entity_count(&self) -> usize {
        self.entities
    }

    fn next_state(&self, state: &State) -> NetworkResult<State> {
        self.get(state)
            .ok_or_else(|| NetworkError::length_mismatch("state", self.entities, state.len()))
    }
}

/// A synchronous, deterministic Boolean network.
#[derive(Debug, Clone)]
pub struct BooleanNetwork {
    entities: Vec<Entity>,
    names: Vec<String>,
    state_count: usize,
    rules: RuleStore,
    config: AnalysisConfig,
    transitions: OnceLock<TransitionTable>,
}

impl BooleanNetwork {
    /// Create a network with default configuration.
    ///
    /// Fails with [`NetworkError::RuleCountMismatch`] if `rules` does not
    /// have exactly one slot per name.
    pub fn new(names: Vec<String>, rules: RuleStore) -> NetworkResult<Self> {
        Self::with_config(names, rules, AnalysisConfig::default())
    }

    /// Create with custom configuration.
    ///
    /// Names must be unique and usable in formulas (see
    /// [`expr::validate_name`]); otherwise saved rules would not read back
    /// as the same network.
    pub fn with_config(
        names: Vec<String>,
        rules: RuleStore,
        config: AnalysisConfig,
    ) -> NetworkResult<Self> {
        validate_names(&names)?;
        if rules.len() != names.len() {
            return Err(NetworkError::RuleCountMismatch {
                entities: names.len(),
                rules: rules.len(),
            });
        }
        if names.len() > config.max_entities {
            return Err(NetworkError::TooManyEntities {
                entities: names.len(),
                limit: config.max_entities,
            });
        }
        let states = state_count(names.len())?;

        let entities = names
            .iter()
            .enumerate()
            .map(|(index, name)| Entity {
                index,
                name: name.clone(),
            })
            .collect();

        debug!(entities = names.len(), "network_created");
        Ok(Self {
            entities,
            names,
            state_count: states,
            rules,
            config,
            transitions: OnceLock::new(),
        })
    }

    /// A network where every entity holds its value.
    pub fn identity(names: Vec<String>) -> NetworkResult<Self> {
        let rules = RuleStore::new(names.len());
        Self::new(names, rules)
    }

    /// Build from one optional formula per entity; `None` means identity.
    pub fn from_formulas<S: AsRef<str>>(
        names: Vec<String>,
        formulas: &[Option<S>],
        config: AnalysisConfig,
    ) -> NetworkResult<Self> {
        validate_names(&names)?;
        let slots = formulas
            .iter()
            .map(|f| {
                f.as_ref()
                    .map(|src| {
                        ExprRule::parse(src.as_ref(), &names).map(|r| Arc::new(r) as SharedRule)
                    })
                    .transpose()
            })
            .collect::<NetworkResult<Vec<_>>>()?;
        Self::with_config(names, RuleStore::from_slots(slots), config)
    }

    /// Build from an observed truth table via Sum-of-Products synthesis.
    pub fn from_truth_table(
        names: Vec<String>,
        table: &TruthTable,
        config: AnalysisConfig,
    ) -> NetworkResult<Self> {
        let rules = synth::synthesize_rules(table, &names)?;
        Self::with_config(names, rules, config)
    }

    /// Default entity names `N1..Nn`.
    pub fn default_names(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("N{i}")).collect()
    }

    /// Number of entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entities in index order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Number of states (`2^N`).
    pub fn state_count(&self) -> usize {
        self.state_count
    }

    /// Entity names in index order.
    pub fn entity_names(&self) -> &[String] {
        &self.names
    }

    /// Index of the entity called `name`.
    pub fn entity_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// The rule slots.
    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Mutable access to the rule slots. Drops any cached transition table.
    pub fn rules_mut(&mut self) -> &mut RuleStore {
        self.invalidate();
        &mut self.rules
    }

    /// Replace the rule of one entity. Drops any cached transition table.
    pub fn set_rule<I>(&mut self, index: I, rule: SharedRule) -> NetworkResult<()>
    where
        I: TryInto<usize> + Copy + std::fmt::Display,
    {
        self.rules.set_rule(index, rule)?;
        self.invalidate();
        Ok(())
    }

    /// Replace the rule of one entity with a parsed formula.
    pub fn set_formula<I>(&mut self, index: I, formula: &str) -> NetworkResult<()>
    where
        I: TryInto<usize> + Copy + std::fmt::Display,
    {
        let rule = ExprRule::parse(formula, &self.names)?;
        self.set_rule(index, Arc::new(rule))
    }

    /// Reset every rule to identity.
    pub fn clear_rules(&mut self) {
        self.rules.clear_rules();
        self.invalidate();
    }

    /// The analysis configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The next state of `current` under a synchronous update.
    pub fn get_next_state(&self, current: &State) -> NetworkResult<State> {
        if current.len() != self.entity_count() {
            return Err(NetworkError::length_mismatch(
                "state",
                self.entity_count(),
                current.len(),
            ));
        }
        Ok(self.step(current))
    }

    /// The complete transition table, computed once per rule configuration.
    pub fn get_state_transition(&self) -> &TransitionTable {
        self.transitions.get_or_init(|| self.build_transitions())
    }

    /// Symbolic form of every rule: the rule's own formula if it has one,
    /// otherwise the Sum-of-Products synthesized from the transition table.
    /// Unset slots are `None`.
    pub fn formulas(&self) -> NetworkResult<Vec<Option<String>>> {
        let mut synthesized: Option<Vec<synth::SumOfProducts>> = None;
        let mut out = Vec::with_capacity(self.entity_count());

        for index in 0..self.entity_count() {
            let Some(rule) = self.rules.get(index) else {
                out.push(None);
                continue;
            };
            if let Some(formula) = rule.formula(&self.names, index) {
                out.push(Some(formula));
                continue;
            }
            if synthesized.is_none() {
                let table = self.get_state_transition().to_truth_table();
                synthesized = Some(synth::synthesize(&table, &self.names)?);
            }
            out.push(
                synthesized
                    .as_ref()
                    .and_then(|formulas| formulas.get(index))
                    .map(ToString::to_string),
            );
        }
        Ok(out)
    }

    /// A new network whose truth table differs from this one in a single
    /// entry: the next value of `entity` from `state` is inverted. Rules are
    /// re-synthesized from the mutated table.
    pub fn with_flipped_entry(&self, state: &State, entity: usize) -> NetworkResult<Self> {
        let mut table = self.get_state_transition().to_truth_table();
        let value = table.flip(state, entity)?;
        info!(state = %state, entity, value, "truth_table_mutated");
        Self::from_truth_table(self.names.clone(), &table, self.config.clone())
    }

    fn step(&self, current: &State) -> State {
        let bits = (0..self.entity_count())
            .map(|i| self.rules.resolve(i).evaluate(current, i))
            .collect::<Vec<_>>();
        State::new(bits)
    }

    fn build_transitions(&self) -> TransitionTable {
        let n = self.entity_count();
        let successors: Vec<usize> = (0..self.state_count)
            .map(|i| self.step(&State::from_index(n, i)).index())
            .collect();
        info!(
            entities = n,
            states = successors.len(),
            "transition_table_built"
        );
        TransitionTable {
            entities: n,
            successors,
        }
    }

    fn invalidate(&mut self) {
        if self.transitions.take().is_some() {
            debug!("transition_table_invalidated");
        }
    }
}

impl StepFunction for BooleanNetwork {
    fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn next_state(&self, state: &State) -> NetworkResult<State> {
        self.get_next_state(state)
    }
}

fn validate_names(names: &[String]) -> NetworkResult<()> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        expr::validate_name(name)?;
        if !seen.insert(name.as_str()) {
            return Err(NetworkError::InvalidEntityName {
                name: name.clone(),
                message: "duplicate name".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{ConstantRule, FnRule};
    use crate::state::StateSpace;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn poster() -> BooleanNetwork {
        BooleanNetwork::from_formulas(
            names(&["A", "B", "C", "D"]),
            &[Some("B"), Some("C"), Some("D"), Some("A OR C")],
            AnalysisConfig::default(),
        )
        .unwrap()
    }

    fn state(s: &str) -> State {
        s.parse().unwrap()
    }

    #[test]
    fn test_rule_count_mismatch() {
        let err = BooleanNetwork::new(names(&["A", "B"]), RuleStore::new(3)).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::RuleCountMismatch {
                entities: 2,
                rules: 3
            }
        ));
    }

    #[test]
    fn test_entity_ceiling() {
        let config = AnalysisConfig {
            max_entities: 2,
            ..Default::default()
        };
        let err = BooleanNetwork::with_config(names(&["A", "B", "C"]), RuleStore::new(3), config)
            .unwrap_err();
        assert!(matches!(err, NetworkError::TooManyEntities { entities: 3, limit: 2 }));
    }

    #[test]
    fn test_names_must_be_unique_formula_tokens() {
        let err = BooleanNetwork::identity(names(&["A", "A"])).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidEntityName { ref name, .. } if name == "A"));

        let err = BooleanNetwork::from_formulas(
            names(&["gene-1", "gene-2"]),
            &[Some("gene-2"), None],
            AnalysisConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, NetworkError::InvalidEntityName { .. }));

        assert!(BooleanNetwork::identity(names(&["gene_1", "gene_2"])).is_ok());
    }

    #[test]
    fn test_poster_step() {
        let net = poster();
        assert_eq!(net.get_next_state(&state("0000")).unwrap(), state("0000"));
        assert_eq!(net.get_next_state(&state("1000")).unwrap(), state("0001"));
        assert_eq!(net.get_next_state(&state("0010")).unwrap(), state("0101"));
    }

    #[test]
    fn test_synchronous_update_uses_snapshot() {
        // A' = B, B' = A: a swap only works if B reads the old A.
        let net = BooleanNetwork::from_formulas(
            names(&["A", "B"]),
            &[Some("B"), Some("A")],
            AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(net.get_next_state(&state("10")).unwrap(), state("01"));
    }

    #[test]
    fn test_identity_fallback() {
        let mut net = BooleanNetwork::identity(names(&["A", "B", "C"])).unwrap();
        net.set_rule(1, Arc::new(ConstantRule(true))).unwrap();
        for s in StateSpace::new(3).unwrap() {
            let next = net.get_next_state(&s).unwrap();
            assert_eq!(next[0], s[0]);
            assert!(next[1]);
            assert_eq!(next[2], s[2]);
        }
    }

    #[test]
    fn test_wrong_state_length() {
        let err = poster().get_next_state(&state("010")).unwrap_err();
        assert!(matches!(err, NetworkError::LengthMismatch { expected: 4, actual: 3, .. }));
    }

    #[test]
    fn test_transition_table_is_total_and_ordered() {
        let net = poster();
        let table = net.get_state_transition();
        assert_eq!(table.len(), 16);
        for (i, (current, next)) in table.iter().enumerate() {
            assert_eq!(current.index(), i);
            assert_eq!(next, net.get_next_state(&current).unwrap());
        }
        assert_eq!(table.fixed_points(), vec![state("0000")]);
        assert_eq!(table.in_degrees().iter().sum::<usize>(), 16);
    }

    #[test]
    fn test_rule_change_invalidates_table() {
        let mut net = poster();
        assert_eq!(net.get_state_transition().get(&state("1000")), Some(state("0001")));

        net.set_formula(3, "0").unwrap();
        assert_eq!(net.get_state_transition().get(&state("1000")), Some(state("0000")));

        net.clear_rules();
        assert_eq!(net.get_state_transition().fixed_points().len(), 16);
    }

    #[test]
    fn test_set_rule_out_of_range() {
        let mut net = poster();
        assert!(matches!(
            net.set_formula(4, "A"),
            Err(NetworkError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            net.set_formula(-1, "A"),
            Err(NetworkError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_formulas_synthesize_closures() {
        let mut net = BooleanNetwork::identity(names(&["A", "B"])).unwrap();
        net.set_rule(0, Arc::new(FnRule::new("not b", |s, _| !s[1])))
            .unwrap();
        let formulas = net.formulas().unwrap();
        assert_eq!(formulas[0].as_deref(), Some("NOT A AND NOT B OR A AND NOT B"));
        assert_eq!(formulas[1], None);
    }

    #[test]
    fn test_from_successors_validation() {
        assert!(TransitionTable::from_successors(1, vec![1, 0]).is_ok());
        assert!(matches!(
            TransitionTable::from_successors(1, vec![0]),
            Err(NetworkError::LengthMismatch { .. })
        ));
        assert!(matches!(
            TransitionTable::from_successors(1, vec![0, 2]),
            Err(NetworkError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_with_flipped_entry() {
        let net = poster();
        let mutated = net.with_flipped_entry(&state("0000"), 0).unwrap();

        assert_eq!(mutated.get_next_state(&state("0000")).unwrap(), state("1000"));
        for (current, next) in net.get_state_transition().iter().skip(1) {
            assert_eq!(mutated.get_next_state(&current).unwrap(), next);
        }
        assert!(matches!(
            net.with_flipped_entry(&state("0000"), 4),
            Err(NetworkError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_default_names() {
        assert_eq!(BooleanNetwork::default_names(3), vec!["N1", "N2", "N3"]);
    }
}
