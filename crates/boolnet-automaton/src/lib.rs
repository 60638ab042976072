//! Synchronous Boolean networks with exhaustive attractor detection and
//! Sum-of-Products rule synthesis.
//!
//! A network of `N` entities evolves over the state space `{0,1}^N`. Every
//! entity has an update rule that reads the full current state and produces
//! that entity's next bit; all entities update at once. Because the space is
//! finite and the update deterministic, every orbit ends in a cycle, and the
//! distinct cycles are the network's attractors.
//!
//! ## Core Concepts
//!
//! - **State**: An ordered bit vector, entity 0 first
//! - **Rule**: Computes one entity's next bit; unset slots hold their value
//! - **RuleStore**: One optional rule per entity
//! - **BooleanNetwork**: Entities plus rules, with a cached transition table
//! - **AttractorDetector**: Finds every cycle and the basin of each
//! - **Synthesizer**: Turns an observed truth table back into formulas
//!
//! ## State Order
//!
//! ```text
//! index:  0     1     2     3    ...  2^N - 1
//! state:  0000  0001  0010  0011 ...  1111     (entity 0 is the leftmost bit)
//! ```
//!
//! Transition tables, truth tables and attractor scans all enumerate states
//! in this order.

pub mod attractor;
pub mod config;
mod error;
pub mod expr;
pub mod network;
pub mod persistence;
pub mod registry;
mod rule;
mod rule_store;
mod state;
pub mod synth;
mod truth_table;
pub mod wiring;

pub use attractor::{
    canonical_rotation, find_cycle, Attractor, AttractorAnalysis, AttractorDetector,
};
pub use config::{AnalysisConfig, DEFAULT_MAX_ENTITIES};
pub use error::{NetworkError, NetworkResult};
pub use expr::Expr;
pub use network::{BooleanNetwork, Entity, StepFunction, TransitionTable};
pub use rule::{ConstantRule, ExprRule, FnRule, IdentityRule, Rule, SharedRule};
pub use rule_store::{RuleSource, RuleStore};
pub use state::{state_count, State, StateSpace};
pub use truth_table::TruthTable;
pub use wiring::WiringDiagram;

// Synthesis
pub use synth::{describe, synthesize, synthesize_rules, Literal, SumOfProducts};

// Registry
pub use registry::{RuleSet, RuleSetRegistry};

// Persistence
pub use persistence::{NetworkRecord, NetworkStore, NETWORKS_DIR};
