//! Fusion command driver: parse, resolve settings, fuse, report.
//!
//! This is the only place that turns a [`FusionError`] into text for the
//! user. Library code below it never prints.

use std::io::Write;
use std::path::PathBuf;

use fuse_engine::config::{DEFAULT_DEPTH, DEFAULT_K, DEFAULT_RUN_TAG};
use fuse_engine::{FusedRun, FusionConfig, FusionError, FusionMethod, OutputFormat, Result};

use crate::args::{build_method, options_text, parse_args, Command, FuseArgs};
use crate::config::FuseFileConfig;

/// Exit status after a successful invocation (including `-options`).
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status after any reported error.
pub const EXIT_FAILURE: i32 = 1;

/// A fully resolved fusion request.
#[derive(Debug, Clone, PartialEq)]
pub struct FuseJob {
    /// Input run files, in order.
    pub runs: Vec<PathBuf>,
    /// Output run file.
    pub output: PathBuf,
    /// Engine configuration.
    pub config: FusionConfig,
    /// Re-sort runs by score on read.
    pub resort: bool,
    /// Output line layout.
    pub format: OutputFormat,
}

/// Run the fusion command with `args` (without the program name).
///
/// Diagnostics and the `-options` listing go to `stderr`. Returns the
/// process exit status.
pub fn run<I, S>(args: I, stderr: &mut impl Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let result = parse_args(args).and_then(|command| match command {
        Command::Options => {
            let _ = stderr.write_all(options_text().as_bytes());
            Ok(())
        }
        Command::Fuse(args) => resolve(args).and_then(|job| fuse_runs(&job).map(|_| ())),
    });

    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "fusion failed");
            let _ = writeln!(stderr, "{}", diagnostic(&err));
            EXIT_FAILURE
        }
    }
}

/// The single-line message printed for `err`.
pub fn diagnostic(err: &FusionError) -> String {
    let message = err.to_string();
    format!(
        "Error: {}. Please check the provided arguments. Use the \"-options\" flag to print out detailed information about available options and their usage.",
        message.trim_end_matches('.')
    )
}

/// Combine file settings with command-line flags into a [`FuseJob`].
///
/// # Errors
///
/// - [`FusionError::Config`] if the `-config` file cannot be loaded.
/// - [`FusionError::Argument`] for a missing or unknown method.
/// - [`FusionError::Validation`] for invalid method parameters, or a `depth`
///   or `k` that is not positive.
pub fn resolve(args: FuseArgs) -> Result<FuseJob> {
    let settings = match &args.config {
        Some(path) => FuseFileConfig::from_file(path)?.overlay(args.settings),
        None => args.settings,
    };

    let method = build_method(&settings)?;
    warn_ignored(&method, &settings);

    let config = FusionConfig {
        method,
        depth: positive(settings.depth, DEFAULT_DEPTH, "depth")?,
        k: positive(settings.k, DEFAULT_K, "k")?,
        min_max_normalization: settings.min_max_normalization,
        run_tag: settings
            .runtag
            .unwrap_or_else(|| DEFAULT_RUN_TAG.to_string()),
    };

    Ok(FuseJob {
        runs: args.runs,
        output: args.output,
        config,
        resort: settings.resort,
        format: settings.format.unwrap_or_default(),
    })
}

fn positive(value: Option<i64>, default: usize, option: &str) -> Result<usize> {
    match value {
        None => Ok(default),
        Some(value) => usize::try_from(value)
            .ok()
            .filter(|&value| value > 0)
            .ok_or_else(|| {
                FusionError::Validation(format!("Option {option} must be greater than 0"))
            }),
    }
}

/// Parameters that the chosen method does not use are accepted but logged.
fn warn_ignored(method: &FusionMethod, settings: &FuseFileConfig) {
    let ignored = [
        (
            "rrf_k",
            settings.rrf_k.is_some() && !matches!(method, FusionMethod::Rrf { .. }),
        ),
        (
            "alpha",
            settings.alpha.is_some() && !matches!(method, FusionMethod::Interpolation { .. }),
        ),
        (
            "weights",
            settings.weights.is_some() && !matches!(method, FusionMethod::Weighted { .. }),
        ),
        (
            "min_max_normalization",
            settings.min_max_normalization && method.is_rrf(),
        ),
    ];
    for (parameter, _) in ignored.into_iter().filter(|&(_, ignored)| ignored) {
        tracing::warn!(parameter, method = %method, "parameter ignored by fusion method");
    }
}

/// Read, fuse and write according to `job`.
///
/// # Errors
///
/// Any error from reading the runs, fusing them, or writing the output.
pub fn fuse_runs(job: &FuseJob) -> Result<FusedRun> {
    tracing::info!(
        runs = ?job.runs,
        output = %job.output.display(),
        run_tag = %job.config.run_tag,
        method = %job.config.method,
        depth = job.config.depth,
        k = job.config.k,
        resort = job.resort,
        min_max_normalization = job.config.min_max_normalization,
        format = %job.format,
        "initializing fusion"
    );
    match &job.config.method {
        FusionMethod::Rrf { k } => tracing::info!(rrf_k = k, "reciprocal rank fusion"),
        FusionMethod::Interpolation { alpha } => tracing::info!(alpha, "interpolation"),
        FusionMethod::Weighted { weights } => tracing::info!(?weights, "weighted fusion"),
        FusionMethod::Average => {}
    }

    let fused = fuse_engine::fuse_files(
        &job.runs,
        &job.output,
        &job.config,
        job.resort,
        job.format,
    )?;
    tracing::info!(
        topics = fused.topics.len(),
        documents = fused.len(),
        output = %job.output.display(),
        "fusion complete"
    );
    Ok(fused)
}
