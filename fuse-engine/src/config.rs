//! Fusion configuration with sensible defaults.
//!
//! [`FusionConfig`] controls the fusion method, how many documents each run
//! contributes per topic, how many fused documents are kept, whether scores
//! are min-max normalized first, and the tag written to the output.

use crate::error::FusionError;
use crate::types::FusionMethod;

/// Default number of documents taken from each run per topic.
pub const DEFAULT_DEPTH: usize = 1000;
/// Default number of fused documents kept per topic.
pub const DEFAULT_K: usize = 1000;
/// Default run tag written in the last output column.
pub const DEFAULT_RUN_TAG: &str = "anserini.fusion";

/// Configuration for one fuse operation.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionConfig {
    /// How per-run scores are combined.
    pub method: FusionMethod,
    /// Per-run input cutoff: only the first `depth` entries of each topic
    /// participate.
    pub depth: usize,
    /// Per-topic output cutoff.
    pub k: usize,
    /// Rescale every run's scores to `[0, 1]` per topic before combining.
    /// Ignored by reciprocal rank fusion.
    pub min_max_normalization: bool,
    /// Label written in the sixth output column.
    pub run_tag: String,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            method: FusionMethod::Rrf {
                k: FusionMethod::DEFAULT_RRF_K,
            },
            depth: DEFAULT_DEPTH,
            k: DEFAULT_K,
            min_max_normalization: false,
            run_tag: DEFAULT_RUN_TAG.to_string(),
        }
    }
}

impl FusionConfig {
    /// Default configuration using `method`.
    pub fn with_method(method: FusionMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `depth` must be greater than 0
    /// - `k` must be greater than 0
    /// - the method's own parameters (see [`FusionMethod::validate`])
    pub fn validate(&self) -> Result<(), FusionError> {
        if self.depth == 0 {
            return Err(FusionError::Validation(
                "Option depth must be greater than 0".into(),
            ));
        }
        if self.k == 0 {
            return Err(FusionError::Validation(
                "Option k must be greater than 0".into(),
            ));
        }
        self.method.validate()
    }
}
