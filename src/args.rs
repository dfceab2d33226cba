//! Command-line options for the fusion tool.
//!
//! Options use a single dash (`-runs a.txt b.txt -method rrf`). `-runs` takes
//! every following token up to the next option; every other value option
//! takes exactly one token.

use std::iter::Peekable;
use std::path::PathBuf;
use std::str::FromStr;

use fuse_engine::{FusionError, FusionMethod, Result, SUPPORTED_METHODS};

use crate::config::FuseFileConfig;

/// Name shown in the options listing.
pub const PROGRAM_NAME: &str = "trecfuse-fuse-runs";

/// Options that must be present (`-method` may come from `-config` instead).
pub const REQUIRED_OPTIONS: [&str; 3] = ["-runs", "-output", "-method"];

struct OptionDoc {
    name: &'static str,
    meta: &'static str,
    usage: &'static str,
}

const OPTION_DOCS: &[OptionDoc] = &[
    OptionDoc {
        name: "-alpha",
        meta: "[value]",
        usage: "Alpha value used for interpolation. (default: 0.5)",
    },
    OptionDoc {
        name: "-config",
        meta: "[file]",
        usage: "TOML file with fusion settings; command-line options take precedence.",
    },
    OptionDoc {
        name: "-depth",
        meta: "[number]",
        usage: "Pool depth per topic. (default: 1000)",
    },
    OptionDoc {
        name: "-format",
        meta: "[trec|msmarco]",
        usage: "Output format. (default: trec)",
    },
    OptionDoc {
        name: "-k",
        meta: "[number]",
        usage: "Number of documents to output for topic. (default: 1000)",
    },
    OptionDoc {
        name: "-method",
        meta: "[method]",
        usage: "Fusion method: average, rrf, interpolation or weighted.",
    },
    OptionDoc {
        name: "-min_max_normalization",
        meta: "",
        usage: "Apply min-max score normalization per topic before fusion.",
    },
    OptionDoc {
        name: "-options",
        meta: "",
        usage: "Print information about options.",
    },
    OptionDoc {
        name: "-output",
        meta: "[output]",
        usage: "Path to save the output.",
    },
    OptionDoc {
        name: "-resort",
        meta: "",
        usage: "Re-sort each run file by score before fusion.",
    },
    OptionDoc {
        name: "-rrf_k",
        meta: "[number]",
        usage: "Parameter k needed for reciprocal rank fusion. (default: 60)",
    },
    OptionDoc {
        name: "-runs",
        meta: "[file] [file] ...",
        usage: "Paths to the run files to fuse.",
    },
    OptionDoc {
        name: "-runtag",
        meta: "[runtag]",
        usage: "Run tag for the fusion. (default: anserini.fusion)",
    },
    OptionDoc {
        name: "-weights",
        meta: "[w1,w2,...]",
        usage: "Comma-separated weights for weighted fusion, one per run.",
    },
];

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the options listing and stop.
    Options,
    /// Fuse runs.
    Fuse(FuseArgs),
}

/// Parsed options for a fusion invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FuseArgs {
    /// Input run files, in order.
    pub runs: Vec<PathBuf>,
    /// Output run file.
    pub output: PathBuf,
    /// Optional TOML settings file.
    pub config: Option<PathBuf>,
    /// Fusion settings given on the command line.
    pub settings: FuseFileConfig,
}

type Tokens = Peekable<std::vec::IntoIter<String>>;

/// Parse command-line arguments (without the program name).
///
/// `-options` anywhere wins over everything else.
///
/// # Errors
///
/// Returns [`FusionError::Argument`] for unknown options, missing operands,
/// non-numeric values, and missing `-runs` or `-output`.
pub fn parse_args<I, S>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    if args.iter().any(|arg| arg == "-options") {
        return Ok(Command::Options);
    }

    let mut runs: Option<Vec<PathBuf>> = None;
    let mut output = None;
    let mut config = None;
    let mut settings = FuseFileConfig::default();

    let mut tokens: Tokens = args.into_iter().peekable();
    while let Some(arg) = tokens.next() {
        match arg.as_str() {
            "-runs" => {
                let mut paths = Vec::new();
                while let Some(path) = tokens.next_if(|token| !token.starts_with('-')) {
                    paths.push(PathBuf::from(path));
                }
                if paths.is_empty() {
                    return Err(missing_operand("-runs"));
                }
                runs = Some(paths);
            }
            "-output" => output = Some(PathBuf::from(operand(&mut tokens, "-output")?)),
            "-config" => config = Some(PathBuf::from(operand(&mut tokens, "-config")?)),
            "-method" => settings.method = Some(operand(&mut tokens, "-method")?),
            "-rrf_k" => settings.rrf_k = Some(number(&mut tokens, "-rrf_k")?),
            "-alpha" => settings.alpha = Some(number(&mut tokens, "-alpha")?),
            "-k" => settings.k = Some(number(&mut tokens, "-k")?),
            "-depth" => settings.depth = Some(number(&mut tokens, "-depth")?),
            "-weights" => settings.weights = Some(parse_weights(&operand(&mut tokens, "-weights")?)?),
            "-runtag" => settings.runtag = Some(operand(&mut tokens, "-runtag")?),
            "-format" => settings.format = Some(operand(&mut tokens, "-format")?.parse()?),
            "-min_max_normalization" => settings.min_max_normalization = true,
            "-resort" => settings.resort = true,
            other if other.starts_with('-') => {
                return Err(FusionError::Argument(format!(
                    "\"{other}\" is not a valid option"
                )));
            }
            other => {
                return Err(FusionError::Argument(format!(
                    "No argument is allowed: {other}"
                )));
            }
        }
    }

    Ok(Command::Fuse(FuseArgs {
        runs: runs.ok_or_else(|| missing_option("-runs"))?,
        output: output.ok_or_else(|| missing_option("-output"))?,
        config,
        settings,
    }))
}

fn operand(tokens: &mut Tokens, option: &str) -> Result<String> {
    tokens.next().ok_or_else(|| missing_operand(option))
}

fn number<T: FromStr>(tokens: &mut Tokens, option: &str) -> Result<T> {
    let value = operand(tokens, option)?;
    value.parse().map_err(|_| {
        FusionError::Argument(format!("\"{value}\" is not a valid value for \"{option}\""))
    })
}

fn missing_operand(option: &str) -> FusionError {
    FusionError::Argument(format!("Option \"{option}\" takes an operand"))
}

pub(crate) fn missing_option(option: &str) -> FusionError {
    FusionError::Argument(format!("Option \"{option}\" is required"))
}

/// Parse `-weights`: comma-separated floats. An empty value yields no weights.
///
/// # Errors
///
/// Returns [`FusionError::Argument`] naming the first token that is not a
/// finite number.
pub fn parse_weights(value: &str) -> Result<Vec<f64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(str::trim)
        .map(|token| {
            token
                .parse::<f64>()
                .ok()
                .filter(|weight| weight.is_finite())
                .ok_or_else(|| FusionError::Argument(format!("Invalid weight value: {token}")))
        })
        .collect()
}

/// Build the fusion method named in `settings` with its parameters.
///
/// # Errors
///
/// - [`FusionError::Argument`] if no method is named or the name is unknown.
/// - [`FusionError::Validation`] if the method's parameters are invalid.
pub fn build_method(settings: &FuseFileConfig) -> Result<FusionMethod> {
    let name = settings
        .method
        .as_deref()
        .ok_or_else(|| missing_option("-method"))?;
    match name {
        "average" => Ok(FusionMethod::average()),
        "rrf" => FusionMethod::rrf(settings.rrf_k.unwrap_or(FusionMethod::DEFAULT_RRF_K)),
        "interpolation" => {
            FusionMethod::interpolation(settings.alpha.unwrap_or(FusionMethod::DEFAULT_ALPHA))
        }
        "weighted" => FusionMethod::weighted(settings.weights.clone().unwrap_or_default()),
        other => Err(FusionError::Argument(format!(
            "Unknown fusion method: {other}. Supported methods are: {SUPPORTED_METHODS}."
        ))),
    }
}

/// Option documentation as printed by `-options`.
pub fn options_text() -> String {
    let mut text = format!("Options for {PROGRAM_NAME}:\n\n");
    for doc in OPTION_DOCS {
        let head = format!("{} {}", doc.name, doc.meta);
        text.push_str(&format!(" {:<36}: {}\n", head.trim_end(), doc.usage));
    }
    text.push_str(&format!(
        "\nRequired options are [{}]\n",
        REQUIRED_OPTIONS.join(", ")
    ));
    text
}
