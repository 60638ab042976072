//! Error types for the Boolean network core.

use std::path::PathBuf;

use thiserror::Error;

use crate::state::State;

/// Result type alias for network operations.
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur while building or analysing a network.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The number of configured rule slots differs from the entity count.
    #[error("rule count mismatch: {rules} rule slots for {entities} entities")]
    RuleCountMismatch { entities: usize, rules: usize },

    /// A rule slot index outside `0..len`.
    #[error("entity index {index} out of range (network has {len} entities)")]
    IndexOutOfRange { index: String, len: usize },

    /// A rule source the store does not know how to load from.
    #[error("unsupported rule source: {source_name:?}")]
    UnsupportedSource { source_name: String },

    /// A truth table does not cover the whole state space.
    #[error("incomplete truth table: no row for state {missing} ({present} of {expected} rows present)")]
    IncompleteTruthTable {
        missing: State,
        present: usize,
        expected: usize,
    },

    /// Two sequences that must agree in length do not.
    #[error("length mismatch in {context}: expected {expected}, got {actual}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A saved network file does not exist.
    #[error("network not found: {}", path.display())]
    NetworkNotFound { path: PathBuf },

    /// A state string containing something other than '0' and '1'.
    #[error("invalid state {input:?}: {message}")]
    InvalidState { input: String, message: String },

    /// The state space is larger than the configured ceiling.
    #[error("too many entities: {entities} (limit is {limit})")]
    TooManyEntities { entities: usize, limit: usize },

    /// A Boolean formula could not be parsed.
    #[error("cannot parse expression {input:?} at offset {offset}: {message}")]
    ExpressionParse {
        input: String,
        offset: usize,
        message: String,
    },

    /// A formula references a name that is not an entity of the network.
    #[error("unknown entity {name:?}")]
    UnknownEntity { name: String },

    /// A rule set was requested from a registry that does not contain it.
    #[error("unknown rule set {name:?}")]
    UnknownRuleSet { name: String },

    /// An entity name that formulas could not refer to unambiguously.
    #[error("invalid entity name {name:?}: {message}")]
    InvalidEntityName { name: String, message: String },

    /// A store name or version tag that is not a single path component.
    #[error("invalid {kind} {value:?}: {message}")]
    InvalidStoreKey {
        kind: &'static str,
        value: String,
        message: String,
    },

    /// The worker pool for a parallel scan could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A tabular import could not be interpreted.
    #[error("invalid table at line {line}: {message}")]
    InvalidTable { line: usize, message: String },

    /// Record serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error (file operations).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetworkError {
    pub(crate) fn length_mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            context,
            expected,
            actual,
        }
    }
}
