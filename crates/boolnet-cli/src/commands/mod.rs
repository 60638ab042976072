//! CLI command implementations.

pub mod attractors;
pub mod config;
pub mod dot;
pub mod store;
pub mod synth;
pub mod table;
