//! Run merger: per-topic union, combination, sort and truncation.
//!
//! For every topic in the union of the input runs (first-observed order):
//!
//! 1. Take the first `depth` entries of that topic from each run
//! 2. Union their document ids; a run without the document contributes 0
//! 3. Combine: `fused = Σ w_i * s_i`, where `s_i` is the run's score (or
//!    `1 / (k + rank)` for RRF) and `w_i` the method's per-run weight
//! 4. Sort by fused score descending, ties by docid ascending
//! 5. Keep the first `k` documents and assign ranks `1..len`

use std::collections::{HashMap, HashSet};

use crate::config::FusionConfig;
use crate::error::Result;
use crate::types::{rank_at, Entry, FusedDoc, FusedRun, FusedTopic, FusionMethod, Run};

use super::rescore::rrf_score;

/// Log a progress line every this many merged topics.
const PROGRESS_INTERVAL: usize = 100;

/// Merge `runs` into one fused ranking per topic.
///
/// Runs are only read. Min-max normalization, when wanted, must already have
/// been applied (see [`crate::fuse`]); `config.min_max_normalization` is not
/// consulted here.
///
/// # Errors
///
/// Returns [`crate::FusionError::Validation`] if `config` is invalid, fewer
/// than two runs are given, interpolation gets other than two runs, or the
/// weight count differs from the run count.
pub fn merge(runs: &[Run], config: &FusionConfig) -> Result<FusedRun> {
    config.validate()?;
    config.method.check_run_count(runs.len())?;

    let weights = config.method.run_weights(runs.len());
    let topics = topic_union(runs);

    let mut fused = FusedRun {
        topics: Vec::with_capacity(topics.len()),
    };
    for (merged, topic) in topics.into_iter().enumerate() {
        fused
            .topics
            .push(merge_topic(runs, topic, &weights, &config.method, config.depth, config.k));
        if (merged + 1) % PROGRESS_INTERVAL == 0 {
            tracing::info!(merged = merged + 1, "queries merged");
        }
    }

    tracing::debug!(
        method = %config.method,
        runs = runs.len(),
        topics = fused.topics.len(),
        documents = fused.len(),
        "merge complete"
    );
    Ok(fused)
}

/// Topic ids across all runs, in order of first appearance.
fn topic_union(runs: &[Run]) -> Vec<&str> {
    let mut seen = HashSet::new();
    runs.iter()
        .flat_map(Run::topics)
        .filter(|topic| seen.insert(*topic))
        .collect()
}

/// What one entry contributes before weighting.
fn contribution(method: &FusionMethod, entry: &Entry) -> f64 {
    match method {
        FusionMethod::Rrf { k } => rrf_score(*k, entry.rank),
        _ => entry.score,
    }
}

fn merge_topic(
    runs: &[Run],
    topic: &str,
    weights: &[f64],
    method: &FusionMethod,
    depth: usize,
    k: usize,
) -> FusedTopic {
    // Map from docid → slot in `docs`; contributions accumulate in run order.
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut docs: Vec<FusedDoc> = Vec::new();

    for (run, weight) in runs.iter().zip(weights) {
        for entry in run.topic_entries(topic).take(depth) {
            let slot = match slots.get(entry.docid.as_str()) {
                Some(&slot) => slot,
                None => {
                    slots.insert(entry.docid.as_str(), docs.len());
                    // Start from +0.0 so a lone -0.0 contribution cannot
                    // leave a negative zero behind.
                    docs.push(FusedDoc {
                        docid: entry.docid.clone(),
                        rank: 0,
                        score: 0.0,
                    });
                    docs.len() - 1
                }
            };
            docs[slot].score += weight * contribution(method, entry);
        }
    }

    docs.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.docid.cmp(&b.docid))
    });
    docs.truncate(k);
    for (position, doc) in docs.iter_mut().enumerate() {
        doc.rank = rank_at(position);
    }

    FusedTopic {
        topic: topic.to_string(),
        docs,
    }
}
