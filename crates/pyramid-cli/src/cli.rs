//! CLI argument definitions for pyramid matching.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use pyramid_match::{DEFAULT_THRESHOLD, MatcherKind};
use pyramid_model::options::DEFAULT_SUFFIX;

#[derive(Parser)]
#[command(
    name = "pyramid-match",
    version,
    about = "Match a candidate administrative hierarchy against a reference one",
    long_about = "Match a candidate administrative hierarchy against a reference one.\n\n\
                  Levels are matched shallowest first with fuzzy string similarity; a\n\
                  child is only compared with children of its matched parent."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match two pyramid CSV files and write the result tables.
    Run(RunArgs),

    /// List available scorers and matchers.
    Scorers,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Reference (authoritative) pyramid CSV.
    #[arg(long = "reference", value_name = "CSV")]
    pub reference: PathBuf,

    /// Candidate pyramid CSV to align with the reference.
    #[arg(long = "candidate", value_name = "CSV")]
    pub candidate: PathBuf,

    /// Output directory for result tables.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Levels to match, comma separated (default: every level in both files).
    #[arg(long = "levels", value_name = "LEVELS", value_delimiter = ',')]
    pub levels: Vec<String>,

    /// Suffix of the name columns compared at each level.
    #[arg(long = "suffix", default_value = DEFAULT_SUFFIX)]
    pub suffix: String,

    /// Matching strategy.
    #[arg(long = "matcher", value_enum, default_value = "fuzzy")]
    pub matcher: MatcherArg,

    /// Fuzzy similarity scorer (ratio, partial_ratio, token_sort_ratio,
    /// token_set_ratio, wratio).
    #[arg(long = "scorer", default_value = "wratio")]
    pub scorer: String,

    /// Minimum accepted score (0-100, inclusive).
    #[arg(long = "threshold", default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Also write the run report as JSON to this path.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Match and summarize without writing result tables.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// CLI matcher choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum MatcherArg {
    Fuzzy,
    Transformer,
    Geometry,
}

impl From<MatcherArg> for MatcherKind {
    fn from(arg: MatcherArg) -> Self {
        match arg {
            MatcherArg::Fuzzy => MatcherKind::Fuzzy,
            MatcherArg::Transformer => MatcherKind::Transformer,
            MatcherArg::Geometry => MatcherKind::Geometry,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_defaults() {
        let cli = Cli::try_parse_from([
            "pyramid-match",
            "run",
            "--reference",
            "reference.csv",
            "--candidate",
            "candidate.csv",
            "--levels",
            "level_1,level_2",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.levels, vec!["level_1", "level_2"]);
        assert_eq!(args.suffix, "_name");
        assert_eq!(args.scorer, "wratio");
        assert!((args.threshold - 80.0).abs() < f64::EPSILON);
        assert_eq!(args.output_dir, PathBuf::from("output"));
        assert!(!args.dry_run);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["pyramid-match", "scorers", "--log-format", "json"]).unwrap();
        assert!(matches!(cli.command, Command::Scorers));
        assert!(matches!(cli.log_format, LogFormatArg::Json));
    }
}
