//! Saved networks on disk.
//!
//! ## File Structure
//!
//! ```text
//! <root>/
//! └── networks/
//!     ├── poster/
//!     │   ├── v1.json        # NetworkRecord
//!     │   └── mutated.json
//!     └── imported/
//!         └── v1.json
//! ```
//!
//! Version tags are chosen by the caller; the store never numbers versions
//! on its own.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::error::{NetworkError, NetworkResult};
use crate::network::BooleanNetwork;
use crate::truth_table::TruthTable;

/// Subdirectory holding saved networks.
pub const NETWORKS_DIR: &str = "networks";

const RECORD_EXTENSION: &str = "json";

/// Serialized form of a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRecord {
    /// Entity names in index order.
    pub entities: Vec<String>,

    /// One formula per entity; `null` means identity.
    #[serde(default)]
    pub rules: Vec<Option<String>>,

    /// Observed or computed state → next-state mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truth_table: Option<TruthTable>,
}

impl NetworkRecord {
    /// Describe `network`. Rules without a formula of their own are saved as
    /// their synthesized Sum-of-Products.
    pub fn from_network(
        network: &BooleanNetwork,
        include_truth_table: bool,
    ) -> NetworkResult<Self> {
        let truth_table =
            include_truth_table.then(|| network.get_state_transition().to_truth_table());
        Ok(Self {
            entities: network.entity_names().to_vec(),
            rules: network.formulas()?,
            truth_table,
        })
    }

    /// A record holding only an observed truth table.
    pub fn from_truth_table(entities: Vec<String>, truth_table: TruthTable) -> Self {
        let rules = vec![None; entities.len()];
        Self {
            entities,
            rules,
            truth_table: Some(truth_table),
        }
    }

    /// Rebuild the network.
    ///
    /// If no rule is given but a truth table is present, rules are
    /// synthesized from the table. An empty `rules` list means identity for
    /// every entity.
    pub fn into_network(self, config: AnalysisConfig) -> NetworkResult<BooleanNetwork> {
        let has_rules = self.rules.iter().any(Option::is_some);
        match self.truth_table {
            Some(table) if !has_rules => {
                BooleanNetwork::from_truth_table(self.entities, &table, config)
            }
            _ => {
                let rules = if self.rules.is_empty() {
                    vec![None; self.entities.len()]
                } else {
                    self.rules
                };
                BooleanNetwork::from_formulas(self.entities, &rules, config)
            }
        }
    }
}

/// Store manages saved networks within `<root>/networks/`.
#[derive(Debug, Clone)]
pub struct NetworkStore {
    /// Root path given by the caller.
    root: PathBuf,

    /// Path to the `networks` directory.
    networks_dir: PathBuf,
}

impl NetworkStore {
    /// Create a new store under the given root.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let networks_dir = root.join(NETWORKS_DIR);
        Self { root, networks_dir }
    }

    /// Get the root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the path to the networks directory.
    pub fn networks_dir(&self) -> &Path {
        &self.networks_dir
    }

    /// Path a record with this name and version is stored at.
    ///
    /// Both must be a single path component, so a record can never land
    /// outside `networks/`.
    pub fn record_path(&self, name: &str, version: &str) -> NetworkResult<PathBuf> {
        check_key("network name", name)?;
        check_key("version tag", version)?;
        Ok(self
            .networks_dir
            .join(name)
            .join(format!("{version}.{RECORD_EXTENSION}")))
    }

    /// Check if a record exists.
    pub fn exists(&self, name: &str, version: &str) -> bool {
        self.record_path(name, version)
            .is_ok_and(|path| path.exists())
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Save a record under `name` with the caller's `version` tag,
    /// overwriting any previous record with the same tag.
    pub fn save(
        &self,
        name: &str,
        version: &str,
        record: &NetworkRecord,
    ) -> NetworkResult<PathBuf> {
        let path = self.record_path(name, version)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&path, json)?;

        info!(
            path = %path.display(),
            entities = record.entities.len(),
            "Saved network"
        );
        Ok(path)
    }

    /// Load a record. Fails with [`NetworkError::NetworkNotFound`] if it was
    /// never saved.
    pub fn load(&self, name: &str, version: &str) -> NetworkResult<NetworkRecord> {
        let path = self.record_path(name, version)?;
        if !path.exists() {
            return Err(NetworkError::NetworkNotFound { path });
        }

        let json = std::fs::read_to_string(&path)?;
        let record: NetworkRecord = serde_json::from_str(&json)?;

        info!(
            path = %path.display(),
            entities = record.entities.len(),
            "Loaded network"
        );
        Ok(record)
    }

    /// Saved version tags of `name`, sorted.
    pub fn list_versions(&self, name: &str) -> NetworkResult<Vec<String>> {
        check_key("network name", name)?;
        let dir = self.networks_dir.join(name);
        if !dir.exists() {
            return Ok(vec![]);
        }

        let mut versions: Vec<String> = std::fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == RECORD_EXTENSION))
            .filter_map(|p| p.file_stem()?.to_str().map(str::to_string))
            .collect();
        versions.sort();
        Ok(versions)
    }

    /// Names of all saved networks, sorted.
    pub fn list_networks(&self) -> NetworkResult<Vec<String>> {
        if !self.networks_dir.exists() {
            return Ok(vec![]);
        }

        let mut names: Vec<String> = std::fs::read_dir(&self.networks_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Delete one saved version.
    pub fn remove(&self, name: &str, version: &str) -> NetworkResult<()> {
        let path = self.record_path(name, version)?;
        if !path.exists() {
            return Err(NetworkError::NetworkNotFound { path });
        }
        std::fs::remove_file(&path)?;
        debug!(path = %path.display(), "Removed network version");
        Ok(())
    }

    // =========================================================================
    // Tabular import
    // =========================================================================

    /// Read a tabular truth table (see [`TruthTable::from_csv_str`]).
    pub fn import_csv(&self, path: impl AsRef<Path>) -> NetworkResult<(Vec<String>, TruthTable)> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(NetworkError::NetworkNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let imported = TruthTable::from_csv_str(&text)?;
        info!(path = %path.display(), rows = imported.1.len(), "Imported truth table");
        Ok(imported)
    }

    // =========================================================================
    // Cleanup
    // =========================================================================

    /// Remove all saved networks.
    pub fn clean(&self) -> NetworkResult<()> {
        if self.networks_dir.exists() {
            std::fs::remove_dir_all(&self.networks_dir)?;
            info!(path = %self.networks_dir.display(), "Removed networks directory");
        }
        Ok(())
    }
}

fn check_key(kind: &'static str, value: &str) -> NetworkResult<()> {
    let message = if value.is_empty() {
        "must not be empty"
    } else if value == "." || value == ".." {
        "must not be '.' or '..'"
    } else if value.contains(['/', '\\', '\0']) {
        "must not contain path separators"
    } else {
        return Ok(());
    };
    Err(NetworkError::InvalidStoreKey {
        kind,
        value: value.to_string(),
        message: message.to_string(),
    })
}

// =============================================================================
// BooleanNetwork Extensions
// =============================================================================

impl BooleanNetwork {
    /// Save this network (rules plus its truth table) to a store.
    pub fn save_to(
        &self,
        store: &NetworkStore,
        name: &str,
        version: &str,
    ) -> NetworkResult<PathBuf> {
        let record = NetworkRecord::from_network(self, true)?;
        store.save(name, version, &record)
    }

    /// Load a network from a store.
    pub fn load_from(
        store: &NetworkStore,
        name: &str,
        version: &str,
        config: AnalysisConfig,
    ) -> NetworkResult<Self> {
        store.load(name, version)?.into_network(config)
    }
}

// =============================================================================
// Tests
// =============================================================================
