//! Per-topic min-max score normalization.
//!
//! Formula: `score' = (score - min) / (max - min)` over the topic's entries.
//! A topic whose scores are all equal (including a single-entry topic) is set
//! to `0.0` throughout instead of dividing by zero.

use crate::types::Run;

/// Rewrite every score of `run` into `[0, 1]`, topic by topic, in place.
///
/// All entries of a topic take part, regardless of any later depth cutoff.
pub fn min_max(run: &mut Run) {
    let entries = &mut run.entries;
    for group in &run.groups {
        let Some((min, max)) = bounds(group.indices.iter().map(|&i| entries[i].score)) else {
            continue;
        };
        let range = max - min;
        for &idx in &group.indices {
            let entry = &mut entries[idx];
            entry.score = if range == 0.0 {
                0.0
            } else {
                (entry.score - min) / range
            };
        }
    }
}

/// Minimum and maximum of `scores`, or `None` when empty.
fn bounds(scores: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    scores.fold(None, |acc, score| match acc {
        None => Some((score, score)),
        Some((min, max)) => Some((min.min(score), max.max(score))),
    })
}
