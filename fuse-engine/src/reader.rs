//! TREC run file reader.
//!
//! Each line holds six whitespace-separated fields:
//!
//! ```text
//! <topic> Q0 <docid> <rank> <score> <tag>
//! ```
//!
//! The `Q0` and tag columns are ignored on read.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use crate::error::{FusionError, Result};
use crate::types::{Entry, Run};

const FIELDS_PER_LINE: usize = 6;

/// Read a run file from disk.
///
/// With `resort`, each topic is re-sorted by score (descending) and ranks are
/// reassigned `1..n`; otherwise the file's order and rank column are kept.
///
/// # Errors
///
/// - [`FusionError::FileAccess`] if the file cannot be opened.
/// - [`FusionError::Parse`] for a malformed or non-UTF-8 line, or a
///   repeated document.
/// - [`FusionError::Io`] if reading fails part-way.
pub fn read_run(path: &Path, resort: bool) -> Result<Run> {
    let file = File::open(path).map_err(|source| FusionError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let run = parse_run(BufReader::new(file), path, resort)?;
    tracing::debug!(
        path = %path.display(),
        entries = run.len(),
        topics = run.topic_count(),
        resort,
        "run loaded"
    );
    Ok(run)
}

/// Parse a run from any buffered reader. `source` names the input in errors.
///
/// # Errors
///
/// See [`read_run`]; opening is the caller's concern.
pub fn parse_run(reader: impl BufRead, source: &Path, resort: bool) -> Result<Run> {
    let mut run = Run::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                return Err(parse_error(source, idx + 1, "line is not valid UTF-8".into()));
            }
            Err(err) => return Err(err.into()),
        };
        if line.trim().is_empty() {
            continue;
        }
        let entry = parse_line(&line).map_err(|message| parse_error(source, idx + 1, message))?;
        run.try_push(entry)
            .map_err(|err| parse_error(source, idx + 1, err.to_string()))?;
    }
    if resort {
        run.resort();
    }
    Ok(run)
}

fn parse_error(source: &Path, line: usize, message: String) -> FusionError {
    FusionError::Parse {
        path: PathBuf::from(source),
        line,
        message,
    }
}

/// Split one non-empty line into an [`Entry`].
fn parse_line(line: &str) -> std::result::Result<Entry, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELDS_PER_LINE {
        return Err(format!(
            "expected {FIELDS_PER_LINE} fields, found {}",
            fields.len()
        ));
    }
    let rank: u32 = fields[3]
        .parse()
        .map_err(|_| format!("invalid rank \"{}\"", fields[3]))?;
    let score: f64 = fields[4]
        .parse()
        .map_err(|_| format!("invalid score \"{}\"", fields[4]))?;
    Ok(Entry {
        topic: fields[0].to_string(),
        docid: fields[2].to_string(),
        rank,
        score,
    })
}
