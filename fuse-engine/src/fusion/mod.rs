//! Fusion pipeline: optional normalization followed by the merge.
//!
//! # Pipeline
//!
//! 1. Validate the configuration and the run count
//! 2. Min-max normalize every run (score-based methods only)
//! 3. Merge the runs topic by topic

pub mod merge;
pub mod normalize;
pub mod rescore;

use crate::config::FusionConfig;
use crate::error::Result;
use crate::types::{FusedRun, Run};

/// Fuse `runs` according to `config`.
///
/// Takes the runs by value because normalization rewrites their scores.
///
/// # Errors
///
/// Returns [`crate::FusionError::Validation`] for an invalid configuration
/// or a run count the method cannot handle.
pub fn fuse(mut runs: Vec<Run>, config: &FusionConfig) -> Result<FusedRun> {
    // 1. Validate before touching any scores.
    config.validate()?;
    config.method.check_run_count(runs.len())?;

    // 2. Normalize. RRF only looks at ranks, so the flag has no effect there.
    if config.min_max_normalization {
        if config.method.is_rrf() {
            tracing::debug!("min-max normalization has no effect on rrf; skipped");
        } else {
            for run in &mut runs {
                normalize::min_max(run);
            }
            tracing::debug!(runs = runs.len(), "runs min-max normalized");
        }
    }

    // 3. Merge.
    merge::merge(&runs, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Entry, FusionMethod};

    fn runs() -> Vec<Run> {
        vec![
            Run::from_entries([
                Entry::new("q", "a", 1, 100.0),
                Entry::new("q", "b", 2, 0.0),
            ])
            .expect("unique"),
            Run::from_entries([
                Entry::new("q", "b", 1, 2.0),
                Entry::new("q", "a", 2, 1.0),
            ])
            .expect("unique"),
        ]
    }

    fn scores(fused: &FusedRun) -> Vec<(String, f64)> {
        fused.topics[0]
            .docs
            .iter()
            .map(|d| (d.docid.clone(), d.score))
            .collect()
    }

    #[test]
    fn normalization_changes_score_based_fusion() {
        let mut config = FusionConfig::with_method(FusionMethod::Average);
        let raw = fuse(runs(), &config).expect("fuse");
        assert_eq!(scores(&raw), vec![("a".to_string(), 50.5), ("b".to_string(), 1.0)]);

        config.min_max_normalization = true;
        let normalized = fuse(runs(), &config).expect("fuse");
        // a: (1 + 0) / 2, b: (0 + 1) / 2 → tie, docid order.
        assert_eq!(
            scores(&normalized),
            vec![("a".to_string(), 0.5), ("b".to_string(), 0.5)]
        );
    }

    #[test]
    fn normalization_ignored_for_rrf() {
        let mut config = FusionConfig::with_method(FusionMethod::Rrf { k: 60.0 });
        let plain = fuse(runs(), &config).expect("fuse");
        config.min_max_normalization = true;
        let flagged = fuse(runs(), &config).expect("fuse");
        assert_eq!(plain, flagged);
    }

    #[test]
    fn invalid_config_rejected_before_merge() {
        let mut config = FusionConfig::with_method(FusionMethod::Average);
        config.k = 0;
        assert!(fuse(runs(), &config).is_err());
        assert!(fuse(Vec::new(), &FusionConfig::default()).is_err());
    }
}
