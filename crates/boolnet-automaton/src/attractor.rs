//! Attractor detection over a finite deterministic state space.
//!
//! Every start state is walked forward until a state repeats. The suffix of
//! the walk from the first occurrence of that state is the cycle the orbit
//! enters:
//!
//! ```text
//! s0 -> s1 -> s2 -> s3 -> s4
//!             ^           |
//!             +-----------+      cycle = [s2, s3, s4]
//! ```
//!
//! Cycles are canonicalized to their lexicographically smallest rotation so
//! that the same attractor reached from different entry points compares
//! equal. Canonicalization compares full rotations and is O(period²) per
//! walk, which is fine for periods up to a few thousand states.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::error::{NetworkError, NetworkResult};
use crate::network::{BooleanNetwork, StepFunction};
use crate::state::{state_count, State, StateSpace};

/// A cycle of the transition function, stored from its smallest rotation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attractor {
    states: Vec<State>,
}

impl Attractor {
    /// Canonicalize a raw cycle given in visitation order.
    pub fn from_cycle(cycle: Vec<State>) -> Self {
        Self {
            states: canonical_rotation(cycle),
        }
    }

    /// States around the cycle, starting from the canonical representative.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Cycle length.
    pub fn period(&self) -> usize {
        self.states.len()
    }

    /// Check if this is a period-1 attractor.
    pub fn is_fixed_point(&self) -> bool {
        self.states.len() == 1
    }

    /// Check if `state` lies on the cycle.
    pub fn contains(&self, state: &State) -> bool {
        self.states.contains(state)
    }
}

impl fmt::Display for Attractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, state) in self.states.iter().enumerate() {
            if i > 0 {
                f.write_str(" → ")?;
            }
            write!(f, "{state}")?;
        }
        Ok(())
    }
}

/// Rotate `cycle` so it starts at its lexicographically smallest rotation.
pub fn canonical_rotation(mut cycle: Vec<State>) -> Vec<State> {
    let period = cycle.len();
    let best = (1..period).fold(0, |best, offset| {
        if compare_rotations(&cycle, offset, best) == Ordering::Less {
            offset
        } else {
            best
        }
    });
    cycle.rotate_left(best);
    cycle
}

fn compare_rotations(cycle: &[State], a: usize, b: usize) -> Ordering {
    let period = cycle.len();
    (0..period)
        .map(|k| cycle[(a + k) % period].cmp(&cycle[(b + k) % period]))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Walk forward from `start` and return the cycle the orbit enters, in
/// visitation order.
pub fn find_cycle<S>(system: &S, start: State) -> NetworkResult<Vec<State>>
where
    S: StepFunction + ?Sized,
{
    let width = system.entity_count();
    if start.len() != width {
        return Err(NetworkError::length_mismatch("start state", width, start.len()));
    }

    let mut visited: HashMap<State, usize> = HashMap::new();
    let mut order: Vec<State> = Vec::new();
    let mut current = start;

    while !visited.contains_key(&current) {
        let next = system.next_state(&current)?;
        if next.len() != width {
            return Err(NetworkError::length_mismatch(
                "step function output",
                width,
                next.len(),
            ));
        }
        visited.insert(current.clone(), order.len());
        order.push(current);
        current = next;
    }

    let cycle_start = visited[&current];
    order.drain(..cycle_start);
    Ok(order)
}

/// Attractors of a system plus the attractor every state ends up in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttractorAnalysis {
    entities: usize,
    attractors: Vec<Attractor>,
    basin: Vec<usize>,
}

impl AttractorAnalysis {
    /// Unique canonical attractors.
    pub fn attractors(&self) -> &[Attractor] {
        &self.attractors
    }

    /// Consume the analysis, keeping only the attractor list.
    pub fn into_attractors(self) -> Vec<Attractor> {
        self.attractors
    }

    /// Index into [`Self::attractors`] of the attractor `state` flows into.
    pub fn attractor_index(&self, state: &State) -> Option<usize> {
        if state.len() != self.entities {
            return None;
        }
        self.basin.get(state.index()).copied()
    }

    /// The attractor `state` flows into.
    pub fn attractor_of(&self, state: &State) -> Option<&Attractor> {
        self.attractor_index(state)
            .and_then(|i| self.attractors.get(i))
    }

    /// Number of states flowing into each attractor (sums to `2^N`).
    pub fn basin_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.attractors.len()];
        for &i in &self.basin {
            sizes[i] += 1;
        }
        sizes
    }

    /// Period-1 attractors.
    pub fn fixed_points(&self) -> impl Iterator<Item = &State> {
        self.attractors
            .iter()
            .filter(|a| a.is_fixed_point())
            .flat_map(|a| a.states.first())
    }
}

/// Finds every attractor of a [`StepFunction`].
#[derive(Debug, Clone, Default)]
pub struct AttractorDetector {
    config: AnalysisConfig,
}

impl AttractorDetector {
    /// Create a detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Unique canonical attractors of `system`.
    ///
    /// Sequential scans report attractors in first-discovery order over the
    /// canonical state enumeration; parallel scans report them sorted.
    pub fn detect<S>(&self, system: &S) -> NetworkResult<Vec<Attractor>>
    where
        S: StepFunction + Sync + ?Sized,
    {
        Ok(self.analyze(system)?.into_attractors())
    }

    /// Attractors plus basin membership for every state.
    pub fn analyze<S>(&self, system: &S) -> NetworkResult<AttractorAnalysis>
    where
        S: StepFunction + Sync + ?Sized,
    {
        let entities = system.entity_count();
        let total = state_count(entities)?;
        let workers = self.config.worker_count().min(total);

        let analysis = if self.config.parallel && workers > 1 {
            self.analyze_parallel(system, total)?
        } else {
            self.analyze_sequential(system)?
        };

        info!(
            entities,
            states = total,
            attractors = analysis.attractors.len(),
            parallel = self.config.parallel,
            "attractor_scan_complete"
        );
        Ok(analysis)
    }

    fn analyze_sequential<S>(&self, system: &S) -> NetworkResult<AttractorAnalysis>
    where
        S: StepFunction + ?Sized,
    {
        let entities = system.entity_count();
        let space = StateSpace::new(entities)?;

        let mut index_of: HashMap<Attractor, usize> = HashMap::new();
        let mut attractors = Vec::new();
        let mut basin = Vec::with_capacity(space.len());

        for start in space {
            let attractor = Attractor::from_cycle(find_cycle(system, start)?);
            let index = match index_of.get(&attractor) {
                Some(&index) => index,
                None => {
                    debug!(period = attractor.period(), attractor = %attractor, "attractor_found");
                    let index = attractors.len();
                    index_of.insert(attractor.clone(), index);
                    attractors.push(attractor);
                    index
                }
            };
            basin.push(index);
        }

        Ok(AttractorAnalysis {
            entities,
            attractors,
            basin,
        })
    }

    fn analyze_parallel<S>(&self, system: &S, total: usize) -> NetworkResult<AttractorAnalysis>
    where
        S: StepFunction + Sync + ?Sized,
    {
        let entities = system.entity_count();
        let scan = || {
            (0..total)
                .into_par_iter()
                .map(|i| {
                    find_cycle(system, State::from_index(entities, i)).map(Attractor::from_cycle)
                })
                .collect::<NetworkResult<Vec<_>>>()
        };

        let per_start = if self.config.workers > 0 {
            ThreadPoolBuilder::new()
                .num_threads(self.config.workers)
                .build()?
                .install(scan)?
        } else {
            scan()?
        };

        // Sort before the uniqueness pass so output does not depend on scheduling.
        let mut attractors = per_start.clone();
        attractors.sort();
        attractors.dedup();

        let basin = per_start
            .par_iter()
            .map(|a| attractors.binary_search(a).unwrap_or_default())
            .collect();

        debug!(workers = self.config.worker_count(), "parallel_scan_merged");
        Ok(AttractorAnalysis {
            entities,
            attractors,
            basin,
        })
    }
}

impl BooleanNetwork {
    /// Attractors and basins of this network, scanned over its cached
    /// transition table with the network's configuration.
    pub fn attractors(&self) -> NetworkResult<AttractorAnalysis> {
        AttractorDetector::with_config(self.config().clone()).analyze(self.get_state_transition())
    }
}
