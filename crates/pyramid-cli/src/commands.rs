use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span};

use pyramid_ingest::{read_pyramid_csv, write_frame_csv};
use pyramid_match::{MatchOutput, MatchReport, MatcherKind, PyramidMatcher, ScorerKind};
use pyramid_model::MatchOptions;

use crate::cli::RunArgs;
use crate::summary::apply_table_style;

pub const MATCHED_FILE: &str = "matched.csv";
pub const SIMPLIFIED_FILE: &str = "matched_simplified.csv";
pub const REFERENCE_UNMATCHED_FILE: &str = "reference_unmatched.csv";
pub const CANDIDATE_UNMATCHED_FILE: &str = "candidate_unmatched.csv";

/// Outcome of one `run` invocation.
#[derive(Debug)]
pub struct RunResult {
    pub report: MatchReport,
    /// Directory the tables were written to, `None` on a dry run.
    pub output_dir: Option<PathBuf>,
    pub written: Vec<PathBuf>,
}

pub fn run_scorers() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Kind", "Name", "Default"]);
    apply_table_style(&mut table);
    for kind in ScorerKind::ALL {
        let default = if kind == ScorerKind::default() { "yes" } else { "" };
        table.add_row(vec!["scorer", kind.name(), default]);
    }
    for kind in MatcherKind::ALL {
        let default = if kind == MatcherKind::default() { "yes" } else { "" };
        table.add_row(vec!["matcher", kind.name(), default]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_match(args: &RunArgs) -> Result<RunResult> {
    let run_span = info_span!("run", reference = %args.reference.display(), candidate = %args.candidate.display());
    let _run_guard = run_span.enter();

    let mut options = MatchOptions::default().with_suffix(args.suffix.as_str());
    if !args.levels.is_empty() {
        options = options.with_levels(args.levels.iter().cloned());
    }
    let matcher = MatcherKind::from(args.matcher)
        .build(args.threshold, &args.scorer)
        .context("configure matcher")?;

    let reference = read_pyramid_csv(&args.reference)
        .with_context(|| format!("load reference pyramid {}", args.reference.display()))?;
    let candidate = read_pyramid_csv(&args.candidate)
        .with_context(|| format!("load candidate pyramid {}", args.candidate.display()))?;

    let output = PyramidMatcher::new(matcher, options)
        .run_matching(&reference, &candidate)
        .context("match pyramids")?;

    if let Some(path) = &args.report {
        write_report(&output.report, path)?;
    }
    if args.dry_run {
        info!("dry run, no tables written");
        return Ok(RunResult {
            report: output.report,
            output_dir: None,
            written: Vec::new(),
        });
    }

    let written = write_outputs(&output, &args.output_dir)?;
    Ok(RunResult {
        report: output.report,
        output_dir: Some(args.output_dir.clone()),
        written,
    })
}

fn write_outputs(output: &MatchOutput, dir: &Path) -> Result<Vec<PathBuf>> {
    let tables = [
        (MATCHED_FILE, &output.full),
        (SIMPLIFIED_FILE, &output.simplified),
        (REFERENCE_UNMATCHED_FILE, &output.unmatched_reference),
        (CANDIDATE_UNMATCHED_FILE, &output.unmatched_candidate),
    ];
    let mut written = Vec::with_capacity(tables.len());
    for (name, df) in tables {
        let path = dir.join(name);
        write_frame_csv(df, &path).with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), rows = df.height(), "wrote table");
        written.push(path);
    }
    Ok(written)
}

fn write_report(report: &MatchReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("serialize run report")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
