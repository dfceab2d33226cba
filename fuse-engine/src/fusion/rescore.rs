//! Per-run score transforms.
//!
//! Two strategies rewrite a run's scores in place:
//!
//! ```text
//! Scale(factor): score' = score * factor
//! Rrf(k):        score' = 1.0 / (k + rank)
//! ```
//!
//! RRF ignores the original score entirely; only the entry's current rank
//! matters. The merger evaluates the same RRF formula read-only through
//! [`RescoreMethod::score_for`].

use crate::error::{FusionError, Result};
use crate::types::{Entry, Run};

/// How [`rescore`] rewrites scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RescoreMethod {
    /// Multiply every score by a constant factor (any real number).
    Scale(f64),
    /// Replace every score by `1 / (k + rank)`.
    Rrf(f64),
}

impl RescoreMethod {
    /// Score that `entry` receives under this method.
    pub fn score_for(&self, entry: &Entry) -> f64 {
        match *self {
            Self::Scale(factor) => entry.score * factor,
            Self::Rrf(k) => rrf_score(k, entry.rank),
        }
    }
}

/// Reciprocal rank contribution of a document at `rank`.
///
/// # Scoring Formula
///
/// ```text
/// score = 1.0 / (k + rank)
/// ```
///
/// With the customary `k = 60`, rank 1 contributes `1/61 ≈ 0.016393`.
pub fn rrf_score(k: f64, rank: u32) -> f64 {
    1.0 / (k + f64::from(rank))
}

/// Rewrite every score of `run` in place and hand the same run back.
///
/// # Errors
///
/// Returns [`FusionError::Validation`] if an RRF `k` is negative or not
/// finite. The run is left untouched in that case.
pub fn rescore(run: &mut Run, method: RescoreMethod) -> Result<&mut Run> {
    if let RescoreMethod::Rrf(k) = method {
        check_rrf_k(k)?;
    }
    for entry in &mut run.entries {
        entry.score = method.score_for(entry);
    }
    Ok(run)
}

/// RRF's `k` must be a finite, non-negative number.
pub(crate) fn check_rrf_k(k: f64) -> Result<()> {
    if k.is_finite() && k >= 0.0 {
        Ok(())
    } else {
        Err(FusionError::Validation(format!(
            "RRF k must be a finite non-negative number, got {k}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_run() -> Run {
        Run::from_entries([
            Entry::new("query1", "doc1", 1, 7.0),
            Entry::new("query1", "doc2", 2, 6.0),
            Entry::new("query1", "doc3", 3, 5.0),
            Entry::new("query2", "doc1", 1, 14.0),
            Entry::new("query2", "doc2", 2, 13.0),
            Entry::new("query2", "doc3", 3, 12.0),
        ])
        .expect("unique entries")
    }

    fn scores(run: &Run) -> Vec<f64> {
        run.entries().iter().map(|e| e.score).collect()
    }

    #[test]
    fn scale_multiplies_every_score() {
        let mut run = sample_run();
        rescore(&mut run, RescoreMethod::Scale(2.0)).expect("scale");
        assert_eq!(scores(&run), vec![14.0, 12.0, 10.0, 28.0, 26.0, 24.0]);
    }

    #[test]
    fn scale_accepts_negative_factor() {
        let mut run = sample_run();
        rescore(&mut run, RescoreMethod::Scale(-0.5)).expect("scale");
        assert!((run.entries()[0].score + 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rrf_replaces_scores_from_rank() {
        let mut run = sample_run();
        rescore(&mut run, RescoreMethod::Rrf(60.0)).expect("rrf");
        let expected = [
            1.0 / 61.0,
            1.0 / 62.0,
            1.0 / 63.0,
            1.0 / 61.0,
            1.0 / 62.0,
            1.0 / 63.0,
        ];
        assert_eq!(scores(&run), expected.to_vec());
    }

    #[test]
    fn rrf_uses_rank_not_score() {
        let mut run = Run::from_entries([Entry::new("q", "d", 4, 1000.0)]).expect("unique");
        rescore(&mut run, RescoreMethod::Rrf(1.0)).expect("rrf");
        assert!((run.entries()[0].score - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn rescore_returns_same_run_for_chaining() {
        let mut run = sample_run();
        let len = rescore(&mut run, RescoreMethod::Scale(1.0))
            .expect("scale")
            .len();
        assert_eq!(len, 6);
    }

    #[test]
    fn invalid_rrf_k_leaves_run_untouched() {
        let mut run = sample_run();
        let err = rescore(&mut run, RescoreMethod::Rrf(-5.0)).unwrap_err();
        assert!(err.to_string().contains("RRF k must be a finite non-negative number"));
        assert_eq!(scores(&run), scores(&sample_run()));
        assert!(rescore(&mut run, RescoreMethod::Rrf(f64::NAN)).is_err());
    }

    #[test]
    fn rrf_score_formula() {
        assert!((rrf_score(60.0, 1) - 0.016_393_442_622_950_82).abs() < 1e-15);
        assert!(rrf_score(60.0, 1) > rrf_score(60.0, 2));
        assert!((rrf_score(0.0, 1) - 1.0).abs() < f64::EPSILON);
    }
}
