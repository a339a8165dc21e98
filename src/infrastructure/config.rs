// Infrastructure: configuration files and instance loading

use crate::application::mappers::{self, MappingError};
use crate::application::SolveStrategy;
use crate::domain::SolverBackend;
use crate::scheduling::{Instance, Objective, SearchConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: {source}")]
    Instance {
        path: PathBuf,
        #[source]
        source: MappingError,
    },
}

/// Everything a run needs besides the instance. Missing keys keep defaults.
///
/// ```json
/// {
///   "backend": "microlp",
///   "objective": {"kind": "weighted_tardiness", "weights": [1, 2, 1]},
///   "strategy": "branch_and_bound",
///   "search": {"node_limit": 10000, "node_selection": "best_bound", "workers": 4}
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: SolverBackend,
    pub objective: Objective,
    pub strategy: SolveStrategy,
    pub search: SearchConfig,
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = read(path)?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Read and validate an instance document
pub fn load_instance(path: impl AsRef<Path>) -> Result<Instance, ConfigError> {
    let path = path.as_ref();
    let text = read(path)?;
    mappers::parse_instance(&text).map_err(|source| ConfigError::Instance {
        path: path.to_path_buf(),
        source,
    })
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::NodeSelection;

    #[test]
    fn test_empty_config_is_default() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.backend, SolverBackend::Auto);
        assert_eq!(config.objective, Objective::TotalTardiness);
        assert_eq!(config.strategy, SolveStrategy::BranchAndBound);
        assert!(config.search.warm_start);
    }

    #[test]
    fn test_full_config() {
        let config = AppConfig::from_json(
            r#"{
                "backend": "microlp",
                "objective": {"kind": "weighted_tardiness", "weights": [1, 2]},
                "strategy": "external",
                "search": {"node_limit": 100, "node_selection": "best_bound", "workers": 2}
            }"#,
        )
        .unwrap();

        assert_eq!(config.backend, SolverBackend::MicroLp);
        assert_eq!(config.objective, Objective::WeightedTardiness(vec![1.0, 2.0]));
        assert_eq!(config.strategy, SolveStrategy::External);
        assert_eq!(config.search.node_limit, Some(100));
        assert_eq!(config.search.node_selection, NodeSelection::BestBound);
        assert_eq!(config.search.worker_count(), 2);
    }

    #[test]
    fn test_files() {
        let dir = std::env::temp_dir().join(format!("pastdue-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let instance_path = dir.join("instance.json");
        let config_path = dir.join("config.json");
        fs::write(&instance_path, r#"{"a": [0, 2, 3], "b": [1, 1, 4]}"#).unwrap();
        fs::write(&config_path, r#"{"search": {"workers": "many"}}"#).unwrap();

        assert_eq!(load_instance(&instance_path).unwrap().len(), 2);
        assert!(matches!(
            AppConfig::load(&config_path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            load_instance(dir.join("missing.json")),
            Err(ConfigError::Io { .. })
        ));

        fs::remove_dir_all(&dir).unwrap();
    }
}
