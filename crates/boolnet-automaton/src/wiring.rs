//! Regulatory wiring inferred from the transition function.
//!
//! Entity `j` regulates entity `i` when flipping bit `j` of some state
//! changes the next value of `i`. The analysis is exhaustive over the state
//! space, so it reports exactly the inputs each update function depends on.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::NetworkResult;
use crate::network::StepFunction;
use crate::state::StateSpace;

/// Regulators of every entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiringDiagram {
    regulators: Vec<BTreeSet<usize>>,
}

impl WiringDiagram {
    /// Infer the wiring of `system` by single-bit flips.
    pub fn analyze<S>(system: &S) -> NetworkResult<Self>
    where
        S: StepFunction + ?Sized,
    {
        let width = system.entity_count();
        let mut regulators = vec![BTreeSet::new(); width];

        for state in StateSpace::new(width)? {
            let next = system.next_state(&state)?;
            for source in 0..width {
                let flipped = system.next_state(&state.with_flipped(source))?;
                for (target, regs) in regulators.iter_mut().enumerate() {
                    if next.get(target) != flipped.get(target) {
                        regs.insert(source);
                    }
                }
            }
        }

        debug!(
            entities = width,
            edges = regulators.iter().map(BTreeSet::len).sum::<usize>(),
            "wiring_inferred"
        );
        Ok(Self { regulators })
    }

    /// Number of entities.
    pub fn entity_count(&self) -> usize {
        self.regulators.len()
    }

    /// Entities whose value influences `target`'s next value.
    pub fn regulators(&self, target: usize) -> Option<&BTreeSet<usize>> {
        self.regulators.get(target)
    }

    /// `(source, target)` pairs ordered by target, then source.
    pub fn edges(&self, include_self: bool) -> Vec<(usize, usize)> {
        self.regulators
            .iter()
            .enumerate()
            .flat_map(|(target, sources)| sources.iter().map(move |&source| (source, target)))
            .filter(|&(source, target)| include_self || source != target)
            .collect()
    }
}
