//! CLI configuration management.
//!
//! Values come from built-in defaults, then the JSON config file, then
//! environment variables (a `.env` file is read first). Later sources win.

use std::path::PathBuf;

use anyhow::{Context, Result};
use boolnet_automaton::{AnalysisConfig, DEFAULT_MAX_ENTITIES};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding saved networks.
    pub store_dir: PathBuf,

    /// Largest network the CLI will enumerate.
    pub max_entities: usize,

    /// Scan start states on worker threads.
    pub parallel: bool,

    /// Worker threads for parallel scans (0 = available parallelism).
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        let store_dir = project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("boolnet"));

        Self {
            store_dir,
            max_entities: DEFAULT_MAX_ENTITIES,
            parallel: false,
            workers: 0,
        }
    }
}

impl Config {
    /// Load configuration from the config file and environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();

        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config from {}", path.display()))?;
                serde_json::from_str(&contents).with_context(|| "Failed to parse config file")?
            }
            _ => Self::default(),
        };

        if let Ok(store_dir) = std::env::var("BN_STORE_DIR") {
            config.store_dir = PathBuf::from(store_dir);
        }
        if let Ok(max) = std::env::var("BN_MAX_ENTITIES") {
            config.max_entities = max
                .parse()
                .with_context(|| format!("BN_MAX_ENTITIES is not a number: {max}"))?;
        }
        if let Ok(parallel) = std::env::var("BN_PARALLEL") {
            config.parallel = matches!(
                parallel.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        Ok(config)
    }

    /// Get the path to the config file.
    pub fn config_file_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Analysis settings for the core library.
    pub fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            max_entities: self.max_entities,
            parallel: self.parallel,
            workers: self.workers,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "boolnet", "bn")
}
