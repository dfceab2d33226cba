//! # fuse-engine
//!
//! Combine ranked retrieval runs in TREC format into one fused run.
//!
//! Several retrieval systems answer the same set of topics; each produces a
//! run (per topic, a ranked list of scored documents). This crate merges
//! those runs per topic into a single ranking.
//!
//! ## Design
//!
//! - Four fusion methods: reciprocal rank fusion, averaging, weighted sum and
//!   two-run interpolation
//! - Optional per-topic min-max score normalization before combining
//! - Per-run input depth and per-topic output cutoff
//! - Deterministic output: equal fused scores are ordered by docid
//! - Fused output is itself a valid run and can be fused again
//!
//! The library never prints; all failures surface as [`FusionError`].

pub mod config;
pub mod error;
pub mod fusion;
pub mod reader;
pub mod types;
pub mod writer;

pub use config::FusionConfig;
pub use error::{FusionError, Result};
pub use fusion::fuse;
pub use fusion::rescore::{rescore, RescoreMethod};
pub use reader::{parse_run, read_run};
pub use types::{Entry, FusedDoc, FusedRun, FusedTopic, FusionMethod, Run, SUPPORTED_METHODS};
pub use writer::{write_run, write_to, OutputFormat};

/// Read every run at `paths`, fuse them, and write the result to `output`.
///
/// The output file is only created once fusion has succeeded.
///
/// # Errors
///
/// Any error from [`read_run`], [`fuse`] or [`write_run`].
///
/// # Examples
///
/// ```no_run
/// # fn example() -> fuse_engine::Result<()> {
/// use std::path::PathBuf;
///
/// let config = fuse_engine::FusionConfig::default();
/// let runs = [PathBuf::from("run.bm25.txt"), PathBuf::from("run.splade.txt")];
/// fuse_engine::fuse_files(
///     &runs,
///     std::path::Path::new("run.fused.txt"),
///     &config,
///     false,
///     fuse_engine::OutputFormat::Trec,
/// )?;
/// # Ok(())
/// # }
/// ```
pub fn fuse_files(
    paths: &[std::path::PathBuf],
    output: &std::path::Path,
    config: &FusionConfig,
    resort: bool,
    format: OutputFormat,
) -> Result<FusedRun> {
    config.validate()?;
    config.method.check_run_count(paths.len())?;

    let runs = paths
        .iter()
        .map(|path| read_run(path, resort))
        .collect::<Result<Vec<_>>>()?;
    let fused = fuse(runs, config)?;
    write_run(output, &config.run_tag, &fused, format)?;
    Ok(fused)
}
