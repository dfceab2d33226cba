//! Fused run writer.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};
use crate::types::FusedRun;

/// Line layout of the written run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `topic Q0 docid rank score tag`, score with six decimals.
    #[default]
    Trec,
    /// `topic<TAB>docid<TAB>rank`.
    MsMarco,
}

impl OutputFormat {
    /// Name accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Trec => "trec",
            Self::MsMarco => "msmarco",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trec" => Ok(Self::Trec),
            "msmarco" => Ok(Self::MsMarco),
            _ => Err(FusionError::Argument(format!(
                "Unknown output format: {s}. Supported formats are: trec, msmarco."
            ))),
        }
    }
}

/// Write `fused` to `path`, replacing any existing file.
///
/// Lines go to a sibling `<path>.tmp` file that is renamed over `path` once
/// everything is flushed, so a failed write never leaves a partial run at
/// `path`.
///
/// # Errors
///
/// - [`FusionError::Validation`] if `fused` holds no documents. No file is
///   created in that case.
/// - [`FusionError::FileAccess`] if the file cannot be created or moved into
///   place.
/// - [`FusionError::Io`] if a write fails.
pub fn write_run(path: &Path, run_tag: &str, fused: &FusedRun, format: OutputFormat) -> Result<()> {
    ensure_not_empty(fused)?;
    replace_file(path, |out| write_to(out, run_tag, fused, format))?;
    tracing::debug!(
        path = %path.display(),
        documents = fused.len(),
        %format,
        "fused run written"
    );
    Ok(())
}

/// Run `write` against a temporary sibling of `path`, then rename it into
/// place. The temporary file is removed if anything fails.
fn replace_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let tmp = temp_path(path);
    let file = File::create(&tmp).map_err(|source| FusionError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    let mut out = BufWriter::new(file);
    let written = write(&mut out).and_then(|()| {
        let file = out.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()?;
        Ok(())
    });
    let result = written.and_then(|()| {
        std::fs::rename(&tmp, path).map_err(|source| FusionError::FileAccess {
            path: path.to_path_buf(),
            source,
        })
    });
    if result.is_err() {
        if let Err(err) = std::fs::remove_file(&tmp) {
            tracing::warn!(path = %tmp.display(), error = %err, "could not remove temporary output");
        }
    }
    result
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `fused` to any writer, topics in order, documents in rank order.
///
/// # Errors
///
/// [`FusionError::Validation`] for an empty run, [`FusionError::Io`] if a
/// write fails.
pub fn write_to<W: Write>(
    writer: &mut W,
    run_tag: &str,
    fused: &FusedRun,
    format: OutputFormat,
) -> Result<()> {
    ensure_not_empty(fused)?;
    for topic in &fused.topics {
        for doc in &topic.docs {
            match format {
                OutputFormat::Trec => writeln!(
                    writer,
                    "{} Q0 {} {} {:.6} {}",
                    topic.topic, doc.docid, doc.rank, doc.score, run_tag
                )?,
                OutputFormat::MsMarco => {
                    writeln!(writer, "{}\t{}\t{}", topic.topic, doc.docid, doc.rank)?
                }
            }
        }
    }
    Ok(())
}

fn ensure_not_empty(fused: &FusedRun) -> Result<()> {
    if fused.is_empty() {
        return Err(FusionError::Validation(
            "Nothing to save. Fused run is empty".into(),
        ));
    }
    Ok(())
}
