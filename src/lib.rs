//! trecfuse: command-line fusion of TREC run files.
//!
//! The fusion itself lives in the `fuse-engine` workspace crate. This crate
//! adds the command-line surface:
//!
//! - **Arguments**: single-dash options (`-runs a.txt b.txt -method rrf`)
//! - **Config file**: optional TOML settings, overridden by flags
//! - **Driver**: validation, orchestration Reader → Normalizer → Merger →
//!   Writer, and the single place errors are reported to the user

pub mod args;
pub mod config;
pub mod driver;

pub use args::{parse_args, Command, FuseArgs};
pub use config::FuseFileConfig;
pub use driver::{run, FuseJob};
pub use fuse_engine::{FusionError, Result};
