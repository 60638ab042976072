//! Fixed-size rule slots, one per entity.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{NetworkError, NetworkResult};
use crate::rule::{IdentityRule, Rule, SharedRule};

static IDENTITY: IdentityRule = IdentityRule;

/// Where rule slot contents come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSource {
    /// Slots populated by the caller through [`RuleStore::set_rule`].
    Manual,
    /// Interactive entry handled outside the core. Not implemented here.
    External,
}

impl FromStr for RuleSource {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "external" => Ok(Self::External),
            other => Err(NetworkError::UnsupportedSource {
                source_name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => f.write_str("manual"),
            Self::External => f.write_str("external"),
        }
    }
}

/// Holds exactly one optional rule per entity. An unset slot behaves as
/// [`IdentityRule`].
#[derive(Clone)]
pub struct RuleStore {
    slots: Vec<Option<SharedRule>>,
}

impl RuleStore {
    /// Create a store with `entity_count` unset slots.
    pub fn new(entity_count: usize) -> Self {
        Self {
            slots: vec![None; entity_count],
        }
    }

    /// Create a store from explicit slot contents.
    pub fn from_slots(slots: Vec<Option<SharedRule>>) -> Self {
        Self { slots }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the store has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Overwrite slot `index`.
    ///
    /// Accepts any integer type so that signed indices from user input are
    /// rejected here rather than wrapping.
    pub fn set_rule<I>(&mut self, index: I, rule: SharedRule) -> NetworkResult<()>
    where
        I: TryInto<usize> + Copy + fmt::Display,
    {
        let slot = self.slot_index(index)?;
        debug!(slot, rule = rule.description(), "rule_slot_set");
        self.slots[slot] = Some(rule);
        Ok(())
    }

    /// Reset slot `index` to identity.
    pub fn unset_rule<I>(&mut self, index: I) -> NetworkResult<()>
    where
        I: TryInto<usize> + Copy + fmt::Display,
    {
        let slot = self.slot_index(index)?;
        self.slots[slot] = None;
        Ok(())
    }

    /// Reset every slot to identity.
    pub fn clear_rules(&mut self) {
        let len = self.slots.len();
        self.slots = vec![None; len];
        debug!(slots = len, "rule_slots_cleared");
    }

    /// Contents of slot `index`, `None` if unset or out of range.
    pub fn get(&self, index: usize) -> Option<&SharedRule> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Check if slot `index` holds a rule.
    pub fn is_set(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// The rule to evaluate for entity `index`: the slot contents, or the
    /// identity rule if unset.
    pub fn resolve(&self, index: usize) -> &dyn Rule {
        match self.get(index) {
            Some(rule) => rule.as_ref(),
            None => &IDENTITY,
        }
    }

    /// All slots in entity order.
    pub fn slots(&self) -> &[Option<SharedRule>] {
        &self.slots
    }

    /// Return the slot contents for the named source.
    ///
    /// `"manual"` returns the slots as populated by [`RuleStore::set_rule`].
    /// `"external"` is delegated outside the core: it logs that it is not
    /// implemented and returns the slots unchanged. Anything else fails with
    /// [`NetworkError::UnsupportedSource`].
    pub fn load(&self, source: &str) -> NetworkResult<&[Option<SharedRule>]> {
        match source.parse::<RuleSource>()? {
            RuleSource::Manual => Ok(&self.slots),
            RuleSource::External => {
                warn!(source, "external rule entry is not implemented; keeping current slots");
                Ok(&self.slots)
            }
        }
    }

    fn slot_index<I>(&self, index: I) -> NetworkResult<usize>
    where
        I: TryInto<usize> + Copy + fmt::Display,
    {
        index
            .try_into()
            .ok()
            .filter(|&i| i < self.slots.len())
            .ok_or_else(|| NetworkError::IndexOutOfRange {
                index: index.to_string(),
                len: self.slots.len(),
            })
    }
}

impl<R: Rule + 'static> FromIterator<Option<R>> for RuleStore {
    fn from_iter<T: IntoIterator<Item = Option<R>>>(iter: T) -> Self {
        Self {
            slots: iter
                .into_iter()
                .map(|r| r.map(|r| Arc::new(r) as SharedRule))
                .collect(),
        }
    }
}

impl fmt::Debug for RuleStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots: Vec<&str> = self
            .slots
            .iter()
            .map(|s| s.as_ref().map_or("<identity>", |r| r.description()))
            .collect();
        f.debug_struct("RuleStore").field("slots", &slots).finish()
    }
}
