//! Configuration options for a pyramid matching run.

use serde::{Deserialize, Serialize};

/// Default suffix identifying name columns.
pub const DEFAULT_SUFFIX: &str = "_name";
/// Default prefix of candidate-side output columns.
pub const DEFAULT_INPUT_PREFIX: &str = "input_";
/// Default prefix of reference-side output columns.
pub const DEFAULT_TARGET_PREFIX: &str = "target_";
/// Default name of the column tagging unmatched rows with their level.
pub const DEFAULT_UNMATCHED_LEVEL_COLUMN: &str = "unmatched_level";

/// Options controlling how pyramids are read and how outputs are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Prefix for candidate (query) columns in the match tables.
    pub input_prefix: String,

    /// Prefix for reference (target) columns in the match tables.
    pub target_prefix: String,

    /// Suffix of the columns compared at each level.
    pub matching_column_suffix: String,

    /// Explicit levels to match. Detected from both tables when `None`.
    pub levels: Option<Vec<String>>,

    /// Column added to unmatched rows naming the level they failed at.
    pub unmatched_level_column: String,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            input_prefix: DEFAULT_INPUT_PREFIX.to_string(),
            target_prefix: DEFAULT_TARGET_PREFIX.to_string(),
            matching_column_suffix: DEFAULT_SUFFIX.to_string(),
            levels: None,
            unmatched_level_column: DEFAULT_UNMATCHED_LEVEL_COLUMN.to_string(),
        }
    }
}

impl MatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.levels = Some(levels.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.matching_column_suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn with_prefixes(mut self, input: impl Into<String>, target: impl Into<String>) -> Self {
        self.input_prefix = input.into();
        self.target_prefix = target.into();
        self
    }

    #[must_use]
    pub fn with_unmatched_level_column(mut self, column: impl Into<String>) -> Self {
        self.unmatched_level_column = column.into();
        self
    }

    /// Name of a candidate column in the match tables.
    pub fn input_column(&self, column: &str) -> String {
        format!("{}{column}", self.input_prefix)
    }

    /// Name of a reference column in the match tables.
    pub fn target_column(&self, column: &str) -> String {
        format!("{}{column}", self.target_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_conventions() {
        let options = MatchOptions::default();
        assert_eq!(options.input_column("level_1_name"), "input_level_1_name");
        assert_eq!(options.target_column("level_1_id"), "target_level_1_id");
        assert_eq!(options.matching_column_suffix, "_name");
        assert!(options.levels.is_none());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let options: MatchOptions =
            serde_json::from_str(r#"{"levels": ["level_2", "level_1"]}"#).expect("parse options");
        assert_eq!(
            options.levels,
            Some(vec!["level_2".to_string(), "level_1".to_string()])
        );
        assert_eq!(options.unmatched_level_column, "unmatched_level");
    }
}
