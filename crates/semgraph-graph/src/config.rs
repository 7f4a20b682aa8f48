//! Tunable analysis thresholds.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::holes::DEFAULT_HOLE_THRESHOLD;
use crate::ranking::DEFAULT_BRIDGE_THRESHOLD;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Thresholds used by the analytics commands.
///
/// Missing fields fall back to their defaults, so a partial config file
/// only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Cluster pairs with connection strength below this are reported as holes.
    pub structural_hole_threshold: f64,

    /// Minimum normalized centrality for a node to count as a bridge entity.
    pub bridge_threshold: f64,

    /// Largest graph the dense distance matrix is built for.
    pub max_matrix_nodes: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            structural_hole_threshold: DEFAULT_HOLE_THRESHOLD,
            bridge_threshold: DEFAULT_BRIDGE_THRESHOLD,
            max_matrix_nodes: 500,
        }
    }
}

impl AnalyticsConfig {
    /// Loads a config file, or the defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = AnalyticsConfig::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AnalyticsConfig::default());
        assert_eq!(config.structural_hole_threshold, 0.15);
    }

    #[test]
    fn test_partial_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"bridge_threshold": 0.5}"#).unwrap();

        let config = AnalyticsConfig::load(&path).unwrap();
        assert_eq!(config.bridge_threshold, 0.5);
        assert_eq!(config.max_matrix_nodes, 500);
    }
}
