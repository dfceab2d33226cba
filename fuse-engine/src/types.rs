//! Core types: run entries, runs grouped by topic, fused output and the
//! fusion method selector.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

/// Method names accepted on the command line, in documentation order.
pub const SUPPORTED_METHODS: &str = "average, rrf, interpolation, weighted";

/// A single line of a TREC run: one document retrieved for one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Topic (query) identifier.
    pub topic: String,
    /// Retrieved document identifier.
    pub docid: String,
    /// 1-based position of the document within its topic.
    pub rank: u32,
    /// Retrieval score (higher is better).
    pub score: f64,
}

impl Entry {
    /// Convenience constructor.
    pub fn new(topic: impl Into<String>, docid: impl Into<String>, rank: u32, score: f64) -> Self {
        Self {
            topic: topic.into(),
            docid: docid.into(),
            rank,
            score,
        }
    }
}

/// Positions of one topic's entries inside [`Run::entries`], in current
/// ranking order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TopicGroup {
    pub(crate) topic: String,
    pub(crate) indices: Vec<usize>,
    docids: HashSet<String>,
}

/// One retrieval system's complete output across all topics.
///
/// Entries are stored in the order they were added (file order). Grouping by
/// topic is a view over those entries: topics are remembered in order of
/// first appearance, and each topic keeps the positions of its entries in
/// ranking order. `(topic, docid)` pairs are unique.
///
/// Scores are mutated in place by [`crate::fusion::normalize::min_max`],
/// [`crate::fusion::rescore::rescore`] and [`Run::resort`]; clone the run
/// first if the original scores are still needed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub(crate) entries: Vec<Entry>,
    pub(crate) groups: Vec<TopicGroup>,
    positions: HashMap<String, usize>,
}

impl Run {
    /// Create an empty run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a run from entries in ranking order.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::Validation`] if a `(topic, docid)` pair repeats.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Result<Self> {
        let mut run = Self::new();
        for entry in entries {
            run.try_push(entry)?;
        }
        Ok(run)
    }

    /// Append an entry after the existing entries of its topic.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::Validation`] if the topic already holds the
    /// same document.
    pub fn try_push(&mut self, entry: Entry) -> Result<()> {
        if self.contains(&entry.topic, &entry.docid) {
            return Err(FusionError::Validation(format!(
                "Duplicate document {} for topic {}",
                entry.docid, entry.topic
            )));
        }
        self.insert(entry);
        Ok(())
    }

    fn insert(&mut self, entry: Entry) {
        let group = match self.positions.get(&entry.topic) {
            Some(&idx) => idx,
            None => {
                let idx = self.groups.len();
                self.groups.push(TopicGroup {
                    topic: entry.topic.clone(),
                    ..Default::default()
                });
                self.positions.insert(entry.topic.clone(), idx);
                idx
            }
        };
        let group = &mut self.groups[group];
        group.docids.insert(entry.docid.clone());
        group.indices.push(self.entries.len());
        self.entries.push(entry);
    }

    /// Whether `topic` already holds `docid`.
    pub fn contains(&self, topic: &str, docid: &str) -> bool {
        self.positions
            .get(topic)
            .is_some_and(|&g| self.groups[g].docids.contains(docid))
    }

    /// Total number of entries across all topics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the run holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in insertion (file) order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Topic ids in order of first appearance.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.topic.as_str())
    }

    /// Number of distinct topics.
    pub fn topic_count(&self) -> usize {
        self.groups.len()
    }

    /// Entries of `topic` in ranking order. Empty if the topic is unknown.
    pub fn topic_entries<'a>(&'a self, topic: &str) -> impl Iterator<Item = &'a Entry> + 'a {
        let indices: &'a [usize] = match self.positions.get(topic) {
            Some(&g) => &self.groups[g].indices,
            None => &[],
        };
        indices.iter().map(move |&i| &self.entries[i])
    }

    /// Re-sort every topic by score descending and reassign ranks `1..n`.
    ///
    /// The sort is stable: entries with equal scores keep their previous
    /// relative order. The original rank column is discarded.
    pub fn resort(&mut self) {
        let entries = &mut self.entries;
        for group in &mut self.groups {
            group
                .indices
                .sort_by(|&a, &b| entries[b].score.total_cmp(&entries[a].score));
            for (position, &idx) in group.indices.iter().enumerate() {
                entries[idx].rank = rank_at(position);
            }
        }
    }
}

/// 1-based rank for a 0-based position.
pub(crate) fn rank_at(position: usize) -> u32 {
    u32::try_from(position + 1).unwrap_or(u32::MAX)
}

/// One document in a fused ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedDoc {
    /// Document identifier.
    pub docid: String,
    /// 1-based rank after fusion.
    pub rank: u32,
    /// Fused score.
    pub score: f64,
}

/// The fused ranking for one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedTopic {
    /// Topic identifier.
    pub topic: String,
    /// Documents sorted by fused score, ranks `1..=docs.len()`.
    pub docs: Vec<FusedDoc>,
}

/// Output of the merger: topics in first-observed order across the inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FusedRun {
    /// Per-topic fused rankings.
    pub topics: Vec<FusedTopic>,
}

impl FusedRun {
    /// Total number of fused documents across all topics.
    pub fn len(&self) -> usize {
        self.topics.iter().map(|t| t.docs.len()).sum()
    }

    /// Whether there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.topics.iter().all(|t| t.docs.is_empty())
    }

    /// Look up the fused ranking of one topic.
    pub fn topic(&self, topic: &str) -> Option<&FusedTopic> {
        self.topics.iter().find(|t| t.topic == topic)
    }
}

/// A fused run can be fed into a further fusion.
impl From<FusedRun> for Run {
    fn from(fused: FusedRun) -> Self {
        let mut run = Run::new();
        for topic in fused.topics {
            for doc in topic.docs {
                run.insert(Entry {
                    topic: topic.topic.clone(),
                    docid: doc.docid,
                    rank: doc.rank,
                    score: doc.score,
                });
            }
        }
        run
    }
}

/// How per-run contributions are combined into one fused score.
///
/// Each variant carries exactly the parameters it needs. Use the
/// constructors to reject invalid parameters up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum FusionMethod {
    /// Mean of the per-run scores (absent documents count as 0).
    Average,
    /// Weighted sum of the per-run scores, one weight per run.
    Weighted {
        /// Weight applied to each run, in input order.
        weights: Vec<f64>,
    },
    /// `alpha * first + (1 - alpha) * second`; exactly two runs.
    Interpolation {
        /// Weight of the first run.
        alpha: f64,
    },
    /// Reciprocal rank fusion: sum of `1 / (k + rank)` over runs.
    Rrf {
        /// Smoothing constant.
        k: f64,
    },
}

impl FusionMethod {
    /// Default RRF smoothing constant (Cormack et al., 2009).
    pub const DEFAULT_RRF_K: f64 = 60.0;
    /// Default interpolation weight of the first run.
    pub const DEFAULT_ALPHA: f64 = 0.5;

    /// Simple averaging.
    pub fn average() -> Self {
        Self::Average
    }

    /// Weighted linear combination.
    ///
    /// # Errors
    ///
    /// Fails if `weights` is empty or holds a non-finite value.
    pub fn weighted(weights: Vec<f64>) -> Result<Self> {
        let method = Self::Weighted { weights };
        method.validate()?;
        Ok(method)
    }

    /// Two-run interpolation.
    ///
    /// # Errors
    ///
    /// Fails if `alpha` is not finite.
    pub fn interpolation(alpha: f64) -> Result<Self> {
        let method = Self::Interpolation { alpha };
        method.validate()?;
        Ok(method)
    }

    /// Reciprocal rank fusion.
    ///
    /// # Errors
    ///
    /// Fails if `k` is negative or not finite.
    pub fn rrf(k: f64) -> Result<Self> {
        let method = Self::Rrf { k };
        method.validate()?;
        Ok(method)
    }

    /// Command-line name of this method.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Weighted { .. } => "weighted",
            Self::Interpolation { .. } => "interpolation",
            Self::Rrf { .. } => "rrf",
        }
    }

    /// RRF consumes ranks, so score normalization never applies to it.
    pub fn is_rrf(&self) -> bool {
        matches!(self, Self::Rrf { .. })
    }

    /// Check the method's own parameters.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::Validation`] describing the first bad parameter.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Average => Ok(()),
            Self::Weighted { weights } => {
                if weights.is_empty() {
                    return Err(FusionError::Validation(
                        "Weights must be provided for weighted fusion method".into(),
                    ));
                }
                match weights.iter().find(|w| !w.is_finite()) {
                    Some(bad) => Err(FusionError::Validation(format!(
                        "Invalid weight value: {bad}"
                    ))),
                    None => Ok(()),
                }
            }
            Self::Interpolation { alpha } if !alpha.is_finite() => Err(
                FusionError::Validation(format!("Invalid alpha value: {alpha}")),
            ),
            Self::Interpolation { .. } => Ok(()),
            Self::Rrf { k } => crate::fusion::rescore::check_rrf_k(*k),
        }
    }

    /// Check that this method can fuse `runs` runs.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::Validation`] for fewer than two runs, an
    /// interpolation over anything but two runs, or a weight count that
    /// differs from the run count.
    pub fn check_run_count(&self, runs: usize) -> Result<()> {
        if runs < 2 {
            return Err(FusionError::Validation(
                "Merge requires at least 2 runs.".into(),
            ));
        }
        match self {
            Self::Interpolation { .. } if runs != 2 => Err(FusionError::Validation(
                "Interpolation requires exactly 2 runs".into(),
            )),
            Self::Weighted { weights } if weights.is_empty() => Err(FusionError::Validation(
                "Weights must be provided for weighted fusion method".into(),
            )),
            Self::Weighted { weights } if weights.len() != runs => Err(FusionError::Validation(
                "Number of runs must match number of weights".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Per-run multiplier applied to each run's contribution before summing.
    ///
    /// Averaging is a weighted sum with `1/N` per run and interpolation one
    /// with `[alpha, 1 - alpha]`, so all score-based methods share one
    /// accumulation path. RRF sums its reciprocal ranks unweighted.
    pub fn run_weights(&self, runs: usize) -> Vec<f64> {
        match self {
            Self::Average => vec![1.0 / runs as f64; runs],
            Self::Weighted { weights } => weights.clone(),
            Self::Interpolation { alpha } => vec![*alpha, 1.0 - alpha],
            Self::Rrf { .. } => vec![1.0; runs],
        }
    }
}

impl fmt::Display for FusionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
