//! File-based fusion settings.
//!
//! A TOML file can supply any fusion parameter; command-line flags layered on
//! top take precedence. Every field is optional so partial files work:
//!
//! ```toml
//! method = "weighted"
//! weights = [0.7, 0.3]
//! depth = 100
//! runtag = "bm25+splade"
//! ```

use std::path::Path;

use fuse_engine::{FusionError, OutputFormat, Result};
use serde::{Deserialize, Serialize};

/// Fusion settings as read from a config file or collected from flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuseFileConfig {
    /// Fusion method name (`average`, `rrf`, `interpolation`, `weighted`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// RRF smoothing constant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rrf_k: Option<f64>,
    /// Interpolation weight of the first run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    /// Per-run weights for weighted fusion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
    /// Documents kept per topic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<i64>,
    /// Documents read from each run per topic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<i64>,
    /// Label for the last output column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtag: Option<String>,
    /// Min-max normalize scores before combining.
    pub min_max_normalization: bool,
    /// Re-sort input runs by score on read.
    pub resort: bool,
    /// Output line layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl FuseFileConfig {
    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FusionError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| FusionError::Config(format!("{}: {e}", path.display())))
    }

    /// Save settings to a TOML file, creating parent directories as needed.
    /// Tests use it to write config files that [`Self::from_file`] reads back.
    #[cfg(test)]
    pub(crate) fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| FusionError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Layer `overrides` on top of `self`: every value set in `overrides`
    /// wins, flags are enabled if either side enables them.
    pub fn overlay(self, overrides: Self) -> Self {
        Self {
            method: overrides.method.or(self.method),
            rrf_k: overrides.rrf_k.or(self.rrf_k),
            alpha: overrides.alpha.or(self.alpha),
            weights: overrides.weights.or(self.weights),
            k: overrides.k.or(self.k),
            depth: overrides.depth.or(self.depth),
            runtag: overrides.runtag.or(self.runtag),
            min_max_normalization: overrides.min_max_normalization || self.min_max_normalization,
            resort: overrides.resort || self.resort,
            format: overrides.format.or(self.format),
        }
    }
}
