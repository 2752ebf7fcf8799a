//! Typed description of the levels shared by two pyramids.
//!
//! A [`PyramidSchema`] is computed once per run from the column names of the
//! reference and candidate tables, so the matching loop never has to re-derive
//! level columns from string conventions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::level::LevelId;

/// Which of the two input pyramids a row or column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PyramidSide {
    /// The authoritative hierarchy matched against.
    Reference,
    /// The hierarchy being aligned to the reference.
    Candidate,
}

impl PyramidSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Candidate => "candidate",
        }
    }
}

impl fmt::Display for PyramidSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns describing one level on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSchema {
    /// Level identifier (e.g. `level_2`).
    pub level: LevelId,
    /// Column holding the names matched at this level (e.g. `level_2_name`).
    pub name_column: String,
    /// Extra `level_2_*` columns of the reference pyramid, in table order.
    pub reference_attributes: Vec<String>,
    /// Extra `level_2_*` columns of the candidate pyramid, in table order.
    pub candidate_attributes: Vec<String>,
}

impl LevelSchema {
    /// Build the schema of `level` from both tables' column names.
    ///
    /// Attribute columns are every column starting with `<level>_` other than
    /// the name column.
    pub fn from_columns<R, C>(
        level: LevelId,
        suffix: &str,
        reference_columns: &[R],
        candidate_columns: &[C],
    ) -> Self
    where
        R: AsRef<str>,
        C: AsRef<str>,
    {
        let name_column = level.name_column(suffix);
        let prefix = level.column_prefix();
        let reference_attributes = attribute_columns(reference_columns, &prefix, &name_column);
        let candidate_attributes = attribute_columns(candidate_columns, &prefix, &name_column);
        Self {
            level,
            name_column,
            reference_attributes,
            candidate_attributes,
        }
    }

    pub fn attributes(&self, side: PyramidSide) -> &[String] {
        match side {
            PyramidSide::Reference => &self.reference_attributes,
            PyramidSide::Candidate => &self.candidate_attributes,
        }
    }

    /// Output column holding the match score (e.g. `score_level_2`).
    pub fn score_column(&self) -> String {
        format!("score_{}", self.level)
    }

    /// Output column flagging repeated matches (e.g. `repeated_matches_level_2`).
    pub fn repeated_column(&self) -> String {
        format!("repeated_matches_{}", self.level)
    }
}

fn attribute_columns<S: AsRef<str>>(columns: &[S], prefix: &str, name_column: &str) -> Vec<String> {
    columns
        .iter()
        .map(AsRef::as_ref)
        .filter(|column| column.starts_with(prefix) && *column != name_column)
        .map(str::to_string)
        .collect()
}

/// Ordered levels to match, shallowest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidSchema {
    /// Suffix identifying name columns (e.g. `_name`).
    pub suffix: String,
    /// Levels in ascending order.
    pub levels: Vec<LevelSchema>,
}

impl PyramidSchema {
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LevelSchema> {
        self.levels.iter()
    }

    pub fn level_ids(&self) -> Vec<&LevelId> {
        self.levels.iter().map(|level| &level.level).collect()
    }
}
