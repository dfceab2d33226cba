//! Error types for the fuse-engine crate.
//!
//! Messages are user-facing: the CLI driver prints them verbatim inside its
//! single-line diagnostic.

use std::path::PathBuf;

/// Errors that can occur while reading, fusing or writing runs.
#[derive(Debug, thiserror::Error)]
pub enum FusionError {
    /// Invalid command-line argument (unknown method, bad number, missing flag).
    #[error("{0}")]
    Argument(String),

    /// A run file could not be opened, or the output could not be created.
    #[error("{} ({source})", path.display())]
    FileAccess {
        /// The path that could not be accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A run file line is malformed.
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        /// Source of the offending line.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// The requested fusion is not valid for the given runs or parameters.
    #[error("{0}")]
    Validation(String),

    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error while reading or writing an already opened file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for fuse-engine results.
pub type Result<T> = std::result::Result<T, FusionError>;
