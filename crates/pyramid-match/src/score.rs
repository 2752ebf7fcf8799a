//! Scorers rank candidate names against a query.
//!
//! A scorer only ranks; accepting or rejecting the best candidate is the
//! matcher's job, so one scorer can serve several thresholds.

use std::fmt;
use std::str::FromStr;

use pyramid_model::{PyramidError, Result};
use serde::{Deserialize, Serialize};

use crate::fuzz;

/// A string similarity function on a 0-100 scale.
pub trait Scorer: fmt::Debug + fmt::Display + Send + Sync {
    /// Similarity between `query` and `choice`.
    fn similarity(&self, query: &str, choice: &str) -> f64;

    /// Highest-scoring choice and its score, `None` when there are no choices.
    ///
    /// Ties keep the earliest choice.
    fn best_match<'a>(&self, query: &str, choices: &[&'a str]) -> Option<(&'a str, f64)> {
        let mut best: Option<(&'a str, f64)> = None;
        for &choice in choices {
            let score = self.similarity(query, choice);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((choice, score));
            }
            if score >= 100.0 {
                break;
            }
        }
        best
    }
}

/// Available fuzzy similarity algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    /// Plain character-overlap ratio.
    Ratio,
    /// Best-matching substring.
    PartialRatio,
    /// Ratio of sorted tokens.
    TokenSortRatio,
    /// Overlap of token sets.
    TokenSetRatio,
    /// Weighted ensemble of the above.
    #[default]
    #[serde(rename = "wratio")]
    WRatio,
}

impl ScorerKind {
    pub const ALL: [ScorerKind; 5] = [
        ScorerKind::Ratio,
        ScorerKind::PartialRatio,
        ScorerKind::TokenSortRatio,
        ScorerKind::TokenSetRatio,
        ScorerKind::WRatio,
    ];

    /// Configuration name accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Ratio => "ratio",
            Self::PartialRatio => "partial_ratio",
            Self::TokenSortRatio => "token_sort_ratio",
            Self::TokenSetRatio => "token_set_ratio",
            Self::WRatio => "wratio",
        }
    }

    /// Display label, as used by the fuzzy matching library.
    pub fn label(self) -> &'static str {
        match self {
            Self::WRatio => "WRatio",
            other => other.name(),
        }
    }

    pub fn similarity(self, query: &str, choice: &str) -> f64 {
        match self {
            Self::Ratio => fuzz::ratio(query, choice),
            Self::PartialRatio => fuzz::partial_ratio(query, choice),
            Self::TokenSortRatio => fuzz::token_sort_ratio(query, choice),
            Self::TokenSetRatio => fuzz::token_set_ratio(query, choice),
            Self::WRatio => fuzz::wratio(query, choice),
        }
    }
}

impl FromStr for ScorerKind {
    type Err = PyramidError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ratio" => Ok(Self::Ratio),
            "partial_ratio" => Ok(Self::PartialRatio),
            "token_sort_ratio" => Ok(Self::TokenSortRatio),
            "token_set_ratio" => Ok(Self::TokenSetRatio),
            "wratio" | "weighted_ratio" => Ok(Self::WRatio),
            _ => Err(PyramidError::UnsupportedScorer(s.to_string())),
        }
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scorer backed by one of the [`ScorerKind`] algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FuzzyScorer {
    kind: ScorerKind,
}

impl FuzzyScorer {
    pub fn new(kind: ScorerKind) -> Self {
        Self { kind }
    }

    /// Build a scorer from its configuration name.
    ///
    /// Unknown names fail here rather than at match time.
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse().map(Self::new)
    }

    pub fn kind(&self) -> ScorerKind {
        self.kind
    }
}

impl Scorer for FuzzyScorer {
    fn similarity(&self, query: &str, choice: &str) -> f64 {
        self.kind.similarity(query, choice)
    }
}

impl fmt::Display for FuzzyScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scorer_names_case_insensitively() {
        assert_eq!("WRatio".parse::<ScorerKind>().unwrap(), ScorerKind::WRatio);
        assert_eq!(
            "Token_Set_Ratio".parse::<ScorerKind>().unwrap(),
            ScorerKind::TokenSetRatio
        );
        for kind in ScorerKind::ALL {
            assert_eq!(kind.name().parse::<ScorerKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_scorer_is_rejected() {
        let err = FuzzyScorer::from_name("levenshtein").unwrap_err();
        assert!(matches!(err, PyramidError::UnsupportedScorer(name) if name == "levenshtein"));
    }

    #[test]
    fn best_match_picks_highest_score() {
        let scorer = FuzzyScorer::default();
        let choices = ["KWILU", "TSHUAPA", "MANIEMA"];
        let (best, score) = scorer.best_match("TSHUAPAS", &choices).unwrap();
        assert_eq!(best, "TSHUAPA");
        assert!((score - 93.33).abs() < 0.01);
    }

    #[test]
    fn best_match_on_empty_choices_is_none() {
        let scorer = FuzzyScorer::new(ScorerKind::Ratio);
        assert!(scorer.best_match("TSHUAPA", &[]).is_none());
    }

    #[test]
    fn ties_keep_first_choice() {
        let scorer = FuzzyScorer::new(ScorerKind::Ratio);
        let choices = ["ABCX", "ABCY"];
        let (best, _) = scorer.best_match("ABC", &choices).unwrap();
        assert_eq!(best, "ABCX");
    }

    #[test]
    fn display_uses_library_label() {
        assert_eq!(FuzzyScorer::default().to_string(), "WRatio");
        assert_eq!(FuzzyScorer::new(ScorerKind::Ratio).to_string(), "ratio");
    }
}
