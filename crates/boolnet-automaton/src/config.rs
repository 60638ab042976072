//! Analysis configuration.

use serde::{Deserialize, Serialize};

/// Default ceiling on entity count; `2^20` states is about a million walks.
pub const DEFAULT_MAX_ENTITIES: usize = 20;

/// Configuration shared by the network model and the attractor detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Largest entity count a network may be built with.
    #[serde(default = "default_max_entities")]
    pub max_entities: usize,

    /// Run per-start-state walks on worker threads.
    ///
    /// Attractors are then reported in sorted canonical order rather than
    /// first-discovery order.
    #[serde(default)]
    pub parallel: bool,

    /// Worker thread count for parallel scans (0 = rayon's global pool).
    #[serde(default)]
    pub workers: usize,
}

fn default_max_entities() -> usize {
    DEFAULT_MAX_ENTITIES
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            parallel: false,
            workers: 0,
        }
    }
}

impl AnalysisConfig {
    /// Small networks only, sequential scan.
    pub fn fast() -> Self {
        Self {
            max_entities: 12,
            ..Default::default()
        }
    }

    /// Larger ceiling with a parallel scan.
    pub fn thorough() -> Self {
        Self {
            max_entities: 24,
            parallel: true,
            ..Default::default()
        }
    }

    /// Number of worker threads a parallel scan should use.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            rayon::current_num_threads()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.max_entities, DEFAULT_MAX_ENTITIES);
        assert!(!config.parallel);
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"parallel": true}"#).unwrap();
        assert!(config.parallel);
        assert_eq!(config.max_entities, DEFAULT_MAX_ENTITIES);
    }

    #[test]
    fn test_explicit_workers() {
        let config = AnalysisConfig {
            workers: 3,
            ..AnalysisConfig::thorough()
        };
        assert_eq!(config.worker_count(), 3);
    }
}
