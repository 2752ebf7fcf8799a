//! Match chains and the tables assembled from them.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{Column, DataFrame};
use pyramid_model::{MatchOptions, PyramidSchema, PyramidSide, Result};
use serde::Serialize;

use crate::matcher::Attributes;

/// One accepted match at one level.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub input: String,
    pub input_attributes: Attributes,
    pub target: String,
    pub target_attributes: Attributes,
    pub score: f64,
}

/// Accepted matches from the first level down to the current one.
///
/// Carries the rows of both tables that share the chain's names at every
/// level so far, which are the rows eligible at the next level.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub links: Vec<Link>,
    pub reference_rows: Vec<usize>,
    pub candidate_rows: Vec<usize>,
}

impl Chain {
    /// Chain holding every row of both tables, before any level is matched.
    pub fn root(reference_height: usize, candidate_height: usize) -> Self {
        Self {
            links: Vec::new(),
            reference_rows: (0..reference_height).collect(),
            candidate_rows: (0..candidate_height).collect(),
        }
    }

    /// Extend the chain with a match over the given rows.
    pub fn extend(&self, link: Link, reference_rows: Vec<usize>, candidate_rows: Vec<usize>) -> Self {
        let mut links = self.links.clone();
        links.push(link);
        Self {
            links,
            reference_rows,
            candidate_rows,
        }
    }
}

/// Per-level counts of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LevelReport {
    pub level: String,
    /// Parent groups matched at this level.
    pub groups: usize,
    /// Accepted matches at this level.
    pub matched: usize,
    pub unmatched_reference: usize,
    pub unmatched_candidate: usize,
    /// Final chains flagged as repeated at this level.
    pub repeated: usize,
}

/// Summary of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    pub matcher: String,
    pub reference_rows: usize,
    pub candidate_rows: usize,
    /// Chains that matched every level.
    pub full_matches: usize,
    pub levels: Vec<LevelReport>,
}

impl MatchReport {
    pub fn unmatched(&self, side: PyramidSide) -> usize {
        self.levels
            .iter()
            .map(|level| match side {
                PyramidSide::Reference => level.unmatched_reference,
                PyramidSide::Candidate => level.unmatched_candidate,
            })
            .sum()
    }
}

/// Tables produced by one run.
#[derive(Debug, Clone)]
pub struct MatchOutput {
    /// Complete chains with names, attributes, scores and repeated flags.
    pub full: DataFrame,
    /// Complete chains with input and target names only.
    pub simplified: DataFrame,
    /// Reference rows unmatched at some level, tagged with that level.
    pub unmatched_reference: DataFrame,
    /// Candidate rows unmatched at some level, tagged with that level.
    pub unmatched_candidate: DataFrame,
    pub report: MatchReport,
}

impl MatchOutput {
    /// The four tables as `(full, simplified, unmatched_reference, unmatched_candidate)`.
    pub fn into_tables(self) -> (DataFrame, DataFrame, DataFrame, DataFrame) {
        (
            self.full,
            self.simplified,
            self.unmatched_reference,
            self.unmatched_candidate,
        )
    }
}

/// Repeated-match flags per chain and level.
///
/// Chains sharing the target names of every ancestor and the target name at
/// a level are flagged at that level when they carry more than one distinct
/// input name there.
pub fn repeated_flags(chains: &[Chain], depth: usize) -> Vec<Vec<bool>> {
    let mut flags = vec![vec![false; depth]; chains.len()];
    for level in 0..depth {
        let mut inputs: BTreeMap<Vec<&str>, BTreeSet<&str>> = BTreeMap::new();
        for chain in chains {
            if let Some(key) = target_path(chain, level) {
                inputs
                    .entry(key)
                    .or_default()
                    .insert(chain.links[level].input.as_str());
            }
        }
        for (idx, chain) in chains.iter().enumerate() {
            if let Some(key) = target_path(chain, level) {
                flags[idx][level] = inputs.get(&key).is_some_and(|names| names.len() > 1);
            }
        }
    }
    flags
}

fn target_path(chain: &Chain, level: usize) -> Option<Vec<&str>> {
    let links = chain.links.get(..=level)?;
    Some(links.iter().map(|link| link.target.as_str()).collect())
}

/// Full match table, one row per chain.
///
/// Columns per level: input name, input attributes, target name, target
/// attributes, score, repeated flag.
pub fn full_table(
    chains: &[Chain],
    flags: &[Vec<bool>],
    schema: &PyramidSchema,
    options: &MatchOptions,
) -> Result<DataFrame> {
    let mut columns = Vec::new();
    for (level, spec) in schema.iter().enumerate() {
        let links: Vec<Option<&Link>> = chains.iter().map(|chain| chain.links.get(level)).collect();

        columns.push(string_column(
            options.input_column(&spec.name_column),
            links.iter().map(|link| link.map(|link| link.input.clone())),
        ));
        for (pos, attribute) in spec.attributes(PyramidSide::Candidate).iter().enumerate() {
            columns.push(string_column(
                options.input_column(attribute),
                links
                    .iter()
                    .map(|link| link.and_then(|link| link.input_attributes.get(pos).cloned().flatten())),
            ));
        }
        columns.push(string_column(
            options.target_column(&spec.name_column),
            links.iter().map(|link| link.map(|link| link.target.clone())),
        ));
        for (pos, attribute) in spec.attributes(PyramidSide::Reference).iter().enumerate() {
            columns.push(string_column(
                options.target_column(attribute),
                links
                    .iter()
                    .map(|link| link.and_then(|link| link.target_attributes.get(pos).cloned().flatten())),
            ));
        }

        let scores: Vec<Option<f64>> = links.iter().map(|link| link.map(|link| link.score)).collect();
        columns.push(Column::new(spec.score_column().into(), scores));
        let repeated: Vec<bool> = flags
            .iter()
            .map(|row| row.get(level).copied().unwrap_or(false))
            .collect();
        columns.push(Column::new(spec.repeated_column().into(), repeated));
    }
    Ok(DataFrame::new(columns)?)
}

/// Simplified match table: input and target names per level.
pub fn simplified_table(
    chains: &[Chain],
    schema: &PyramidSchema,
    options: &MatchOptions,
) -> Result<DataFrame> {
    let mut columns = Vec::new();
    for (level, spec) in schema.iter().enumerate() {
        let links: Vec<Option<&Link>> = chains.iter().map(|chain| chain.links.get(level)).collect();
        columns.push(string_column(
            options.input_column(&spec.name_column),
            links.iter().map(|link| link.map(|link| link.input.clone())),
        ));
        columns.push(string_column(
            options.target_column(&spec.name_column),
            links.iter().map(|link| link.map(|link| link.target.clone())),
        ));
    }
    Ok(DataFrame::new(columns)?)
}

fn string_column(name: String, values: impl Iterator<Item = Option<String>>) -> Column {
    let values: Vec<Option<String>> = values.collect();
    Column::new(name.into(), values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(input: &str, target: &str) -> Link {
        Link {
            input: input.to_string(),
            input_attributes: Vec::new(),
            target: target.to_string(),
            target_attributes: vec![Some(format!("{target}-id"))],
            score: 90.0,
        }
    }

    fn chain(pairs: &[(&str, &str)]) -> Chain {
        Chain {
            links: pairs.iter().map(|(input, target)| link(input, target)).collect(),
            reference_rows: Vec::new(),
            candidate_rows: Vec::new(),
        }
    }

    #[test]
    fn flags_distinct_inputs_sharing_target_and_ancestry() {
        let chains = vec![
            chain(&[("TSHUAPA", "TSHUAPA"), ("BOENDE", "BOENDE")]),
            chain(&[("TSHUAPA", "TSHUAPA"), ("BOENDE ZS", "BOENDE")]),
            chain(&[("KWILU", "KWILU"), ("BOENDE", "BOENDE")]),
        ];
        let flags = repeated_flags(&chains, 2);
        assert_eq!(flags[0], vec![false, true]);
        assert_eq!(flags[1], vec![false, true]);
        // Same target under a different ancestor is not a repeat.
        assert_eq!(flags[2], vec![false, false]);
    }

    #[test]
    fn same_input_reached_twice_is_not_repeated() {
        let chains = vec![
            chain(&[("TSHUAPA", "TSHUAPA")]),
            chain(&[("TSHUAPA", "TSHUAPA")]),
        ];
        assert_eq!(repeated_flags(&chains, 1), vec![vec![false], vec![false]]);
    }

    #[test]
    fn root_chain_holds_every_row() {
        let root = Chain::root(3, 2);
        assert!(root.links.is_empty());
        assert_eq!(root.reference_rows, vec![0, 1, 2]);
        assert_eq!(root.candidate_rows, vec![0, 1]);

        let extended = root.extend(link("KWILU", "KWILU"), vec![1], vec![0]);
        assert_eq!(extended.links.len(), 1);
        assert_eq!(extended.reference_rows, vec![1]);
    }

    #[test]
    fn report_sums_unmatched_rows() {
        let report = MatchReport {
            levels: vec![
                LevelReport {
                    level: "level_1".into(),
                    unmatched_reference: 2,
                    unmatched_candidate: 1,
                    ..LevelReport::default()
                },
                LevelReport {
                    level: "level_2".into(),
                    unmatched_reference: 3,
                    ..LevelReport::default()
                },
            ],
            ..MatchReport::default()
        };
        assert_eq!(report.unmatched(PyramidSide::Reference), 5);
        assert_eq!(report.unmatched(PyramidSide::Candidate), 1);
    }
}
