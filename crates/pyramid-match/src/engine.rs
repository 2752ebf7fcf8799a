//! Level-by-level pyramid matching.
//!
//! Level 1 compares the whole candidate table with the whole reference table.
//! Every deeper level only compares rows whose ancestors were matched to each
//! other, so a child can only match under its matched parent.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use pyramid_model::{LevelSchema, MatchOptions, PyramidSchema, PyramidSide, Result};
use tracing::{debug, info, info_span, trace, warn};

use crate::frame::{
    column_names, column_strings, concat_frames, dedupe_rows, filter_rows, require_level_columns,
    tag_rows,
};
use crate::levels::resolve_schema;
use crate::matcher::{Attributes, Candidates, FuzzyMatcher, Matcher};
use crate::output::{
    Chain, LevelReport, Link, MatchOutput, MatchReport, full_table, repeated_flags,
    simplified_table,
};

/// Matches a candidate pyramid against a reference pyramid.
#[derive(Debug)]
pub struct PyramidMatcher {
    matcher: Box<dyn Matcher>,
    options: MatchOptions,
}

impl Default for PyramidMatcher {
    fn default() -> Self {
        Self::new(Box::new(FuzzyMatcher::default()), MatchOptions::default())
    }
}

impl PyramidMatcher {
    pub fn new(matcher: Box<dyn Matcher>, options: MatchOptions) -> Self {
        Self { matcher, options }
    }

    pub fn matcher(&self) -> &dyn Matcher {
        self.matcher.as_ref()
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Match `candidate` against `reference`, shallowest level first.
    ///
    /// Inputs are left untouched. Configuration problems (levels, suffix,
    /// missing columns) fail before any level is matched.
    pub fn run_matching(&self, reference: &DataFrame, candidate: &DataFrame) -> Result<MatchOutput> {
        let span = info_span!("pyramid_matching");
        let _guard = span.enter();

        let reference_columns = column_names(reference);
        let candidate_columns = column_names(candidate);
        require_level_columns(&reference_columns, PyramidSide::Reference)?;
        require_level_columns(&candidate_columns, PyramidSide::Candidate)?;
        let schema = resolve_schema(&reference_columns, &candidate_columns, &self.options)?;
        let levels: Vec<&str> = schema.iter().map(|spec| spec.level.as_str()).collect();
        info!(
            levels = ?levels,
            matcher = %self.matcher,
            "starting pyramid matching"
        );

        let reference = Side::load(dedupe_rows(reference)?, &schema, PyramidSide::Reference)?;
        let candidate = Side::load(dedupe_rows(candidate)?, &schema, PyramidSide::Candidate)?;

        let mut chains = vec![Chain::root(reference.height(), candidate.height())];
        let mut unmatched_reference = Vec::new();
        let mut unmatched_candidate = Vec::new();
        let mut reports = Vec::with_capacity(schema.len());
        let mut exhausted = false;

        for (level, spec) in schema.iter().enumerate() {
            if chains.is_empty() && !exhausted {
                warn!(level = %spec.level, "no parent matches survived, skipping remaining levels");
                exhausted = true;
            }
            let outcome = self.match_level(level, spec, &chains, &reference, &candidate)?;
            info!(
                level = %spec.level,
                groups = chains.len(),
                matched = outcome.chains.len(),
                unmatched_reference = outcome.reference.unmatched(),
                unmatched_candidate = outcome.candidate.unmatched(),
                "level matched"
            );
            reports.push(LevelReport {
                level: spec.level.to_string(),
                groups: chains.len(),
                matched: outcome.chains.len(),
                unmatched_reference: outcome.reference.unmatched(),
                unmatched_candidate: outcome.candidate.unmatched(),
                repeated: 0,
            });

            let tag = self.options.unmatched_level_column.as_str();
            if let Some(rows) = reference.unmatched_rows(&outcome.reference, tag, spec)? {
                unmatched_reference.push(rows);
            }
            if let Some(rows) = candidate.unmatched_rows(&outcome.candidate, tag, spec)? {
                unmatched_candidate.push(rows);
            }
            chains = outcome.chains;
        }

        let flags = repeated_flags(&chains, schema.len());
        for (level, report) in reports.iter_mut().enumerate() {
            report.repeated = flags.iter().filter(|row| row[level]).count();
        }

        let tag = self.options.unmatched_level_column.as_str();
        let output = MatchOutput {
            full: full_table(&chains, &flags, &schema, &self.options)?,
            simplified: simplified_table(&chains, &schema, &self.options)?,
            unmatched_reference: concat_frames(unmatched_reference, &reference.frame, tag)?,
            unmatched_candidate: concat_frames(unmatched_candidate, &candidate.frame, tag)?,
            report: MatchReport {
                matcher: self.matcher.to_string(),
                reference_rows: reference.height(),
                candidate_rows: candidate.height(),
                full_matches: chains.len(),
                levels: reports,
            },
        };
        info!(
            full_matches = output.report.full_matches,
            unmatched_reference = output.unmatched_reference.height(),
            unmatched_candidate = output.unmatched_candidate.height(),
            "pyramid matching finished"
        );
        Ok(output)
    }

    fn match_level(
        &self,
        level: usize,
        spec: &LevelSchema,
        parents: &[Chain],
        reference: &Side,
        candidate: &Side,
    ) -> Result<LevelOutcome> {
        let mut outcome = LevelOutcome {
            chains: Vec::new(),
            reference: RowStatus::new(reference.height()),
            candidate: RowStatus::new(candidate.height()),
        };

        for (group, parent) in parents.iter().enumerate() {
            let queries = candidate.choices(level, &parent.candidate_rows);
            let choices = reference.choices(level, &parent.reference_rows);
            debug!(
                level = %spec.level,
                group,
                candidate_names = queries.len(),
                reference_names = choices.len(),
                "matching group"
            );

            let mut matched_inputs = BTreeSet::new();
            let mut matched_targets = BTreeSet::new();
            if !choices.is_empty() {
                for (query, input_attributes) in &queries {
                    let Some(result) = self.matcher.get_similarity(query, &choices)? else {
                        trace!(level = %spec.level, query = %query, "no acceptable match");
                        continue;
                    };
                    trace!(
                        level = %spec.level,
                        query = %query,
                        matched = %result.matched,
                        score = result.score,
                        "match accepted"
                    );
                    let reference_rows =
                        reference.rows_named(level, &parent.reference_rows, &result.matched);
                    let candidate_rows = candidate.rows_named(level, &parent.candidate_rows, query);
                    matched_inputs.insert(query.clone());
                    matched_targets.insert(result.matched.clone());
                    let link = Link {
                        input: result.query,
                        input_attributes: input_attributes.clone(),
                        target: result.matched,
                        target_attributes: result.attributes,
                        score: result.score,
                    };
                    outcome
                        .chains
                        .push(parent.extend(link, reference_rows, candidate_rows));
                }
            }

            reference.classify(level, &parent.reference_rows, &matched_targets, &mut outcome.reference);
            candidate.classify(level, &parent.candidate_rows, &matched_inputs, &mut outcome.candidate);
        }
        Ok(outcome)
    }
}

struct LevelOutcome {
    chains: Vec<Chain>,
    reference: RowStatus,
    candidate: RowStatus,
}

/// Per-row result at one level: `None` when the row did not reach the level.
struct RowStatus(Vec<Option<bool>>);

impl RowStatus {
    fn new(height: usize) -> Self {
        Self(vec![None; height])
    }

    /// A row reached through several groups counts as matched if any group
    /// matched it.
    fn record(&mut self, row: usize, matched: bool) {
        let status = &mut self.0[row];
        *status = Some(status.unwrap_or(false) || matched);
    }

    fn unmatched_mask(&self) -> Vec<bool> {
        self.0.iter().map(|status| *status == Some(false)).collect()
    }

    fn unmatched(&self) -> usize {
        self.0.iter().filter(|status| **status == Some(false)).count()
    }
}

/// One deduplicated input table with its level columns extracted.
struct Side {
    frame: DataFrame,
    /// Names per level, one entry per row.
    names: Vec<Vec<Option<String>>>,
    /// Attribute columns per level, each one entry per row.
    attributes: Vec<Vec<Vec<Option<String>>>>,
}

impl Side {
    fn load(frame: DataFrame, schema: &PyramidSchema, side: PyramidSide) -> Result<Self> {
        let mut names = Vec::with_capacity(schema.len());
        let mut attributes = Vec::with_capacity(schema.len());
        for spec in schema.iter() {
            names.push(column_strings(&frame, &spec.name_column)?);
            attributes.push(
                spec.attributes(side)
                    .iter()
                    .map(|column| column_strings(&frame, column))
                    .collect::<Result<Vec<_>>>()?,
            );
        }
        Ok(Self {
            frame,
            names,
            attributes,
        })
    }

    fn height(&self) -> usize {
        self.frame.height()
    }

    fn name(&self, level: usize, row: usize) -> Option<&str> {
        self.names[level][row].as_deref()
    }

    fn row_attributes(&self, level: usize, row: usize) -> Attributes {
        self.attributes[level]
            .iter()
            .map(|column| column[row].clone())
            .collect()
    }

    /// Distinct names of `rows` at `level` with the attributes of their first row.
    fn choices(&self, level: usize, rows: &[usize]) -> Candidates {
        let mut choices = Candidates::new();
        for &row in rows {
            if let Some(name) = self.name(level, row) {
                choices
                    .entry(name.to_string())
                    .or_insert_with(|| self.row_attributes(level, row));
            }
        }
        choices
    }

    fn rows_named(&self, level: usize, rows: &[usize], name: &str) -> Vec<usize> {
        rows.iter()
            .copied()
            .filter(|&row| self.name(level, row) == Some(name))
            .collect()
    }

    /// Record each row as matched when its name is in `matched`. Rows with a
    /// null name are unmatched.
    fn classify(
        &self,
        level: usize,
        rows: &[usize],
        matched: &BTreeSet<String>,
        status: &mut RowStatus,
    ) {
        for &row in rows {
            let is_matched = self
                .name(level, row)
                .is_some_and(|name| matched.contains(name));
            status.record(row, is_matched);
        }
    }

    /// Rows unmatched at this level, tagged with the level id.
    fn unmatched_rows(
        &self,
        status: &RowStatus,
        tag: &str,
        spec: &LevelSchema,
    ) -> Result<Option<DataFrame>> {
        if status.unmatched() == 0 {
            return Ok(None);
        }
        let rows = filter_rows(&self.frame, &status.unmatched_mask())?;
        tag_rows(rows, tag, spec.level.as_str()).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_status_prefers_matched() {
        let mut status = RowStatus::new(3);
        status.record(0, false);
        status.record(0, true);
        status.record(1, false);
        assert_eq!(status.unmatched(), 1);
        assert_eq!(status.unmatched_mask(), vec![false, true, false]);
    }
}
