//! Matching strategies.
//!
//! The orchestrator only sees the [`Matcher`] trait. [`FuzzyMatcher`] is the
//! working strategy; [`GeometryMatcher`] and [`EmbeddingMatcher`] are
//! extension points that fail with [`PyramidError::NotImplemented`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use pyramid_model::{PyramidError, Result};

use crate::score::{FuzzyScorer, Scorer, ScorerKind};

/// Default acceptance threshold.
pub const DEFAULT_THRESHOLD: f64 = 80.0;

/// Attribute values attached to a name (e.g. its identifiers).
pub type Attributes = Vec<Option<String>>;

/// Candidate names mapped to their attributes.
pub type Candidates = BTreeMap<String, Attributes>;

/// Best accepted candidate for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// The query name.
    pub query: String,
    /// The accepted candidate name.
    pub matched: String,
    /// Attributes of the accepted candidate.
    pub attributes: Attributes,
    /// Similarity score (0-100).
    pub score: f64,
}

/// Strategy deciding whether a query has an acceptable candidate.
pub trait Matcher: fmt::Debug + fmt::Display + Send + Sync {
    /// Best acceptable candidate for `query`, `None` when nothing qualifies.
    fn get_similarity(&self, query: &str, candidates: &Candidates) -> Result<Option<MatchResult>>;
}

/// Fuzzy string matcher with an inclusive acceptance threshold.
#[derive(Debug)]
pub struct FuzzyMatcher {
    scorer: Box<dyn Scorer>,
    threshold: f64,
}

impl FuzzyMatcher {
    /// Build a matcher from a threshold and a scorer name.
    pub fn new(threshold: f64, scorer_name: &str) -> Result<Self> {
        let scorer = FuzzyScorer::from_name(scorer_name)?;
        Self::from_scorer(threshold, scorer)
    }

    /// Build a matcher around any scorer.
    pub fn from_scorer(threshold: f64, scorer: impl Scorer + 'static) -> Result<Self> {
        Ok(Self {
            scorer: Box::new(scorer),
            threshold: validate_threshold(threshold)?,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn scorer(&self) -> &dyn Scorer {
        self.scorer.as_ref()
    }

    /// Replace the acceptance threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self> {
        self.threshold = validate_threshold(threshold)?;
        Ok(self)
    }

    /// Replace the scorer by name.
    pub fn with_scorer(mut self, scorer_name: &str) -> Result<Self> {
        self.scorer = Box::new(FuzzyScorer::from_name(scorer_name)?);
        Ok(self)
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            scorer: Box::new(FuzzyScorer::new(ScorerKind::WRatio)),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Matcher for FuzzyMatcher {
    fn get_similarity(&self, query: &str, candidates: &Candidates) -> Result<Option<MatchResult>> {
        let choices: Vec<&str> = candidates.keys().map(String::as_str).collect();
        let Some((matched, score)) = self.scorer.best_match(query, &choices) else {
            return Ok(None);
        };
        if score < self.threshold {
            return Ok(None);
        }
        Ok(Some(MatchResult {
            query: query.to_string(),
            matched: matched.to_string(),
            attributes: candidates.get(matched).cloned().unwrap_or_default(),
            score,
        }))
    }
}

impl fmt::Display for FuzzyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FuzzyMatcher(scorer: {}, threshold: {})",
            self.scorer, self.threshold
        )
    }
}

fn validate_threshold(threshold: f64) -> Result<f64> {
    if (0.0..=100.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(PyramidError::InvalidThreshold(threshold))
    }
}

/// Spatial proximity and overlap matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryMatcher {
    /// Distance (meters) beyond which two shapes never match.
    pub max_distance: f64,
    /// Whether polygon overlap contributes to the score.
    pub use_overlap: bool,
    /// Weight of the overlap component.
    pub overlap_weight: f64,
}

impl Default for GeometryMatcher {
    fn default() -> Self {
        Self {
            max_distance: 10_000.0,
            use_overlap: true,
            overlap_weight: 0.3,
        }
    }
}

impl Matcher for GeometryMatcher {
    fn get_similarity(&self, _query: &str, _candidates: &Candidates) -> Result<Option<MatchResult>> {
        Err(PyramidError::NotImplemented("geometry matching"))
    }
}

impl fmt::Display for GeometryMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeometryMatcher(max_distance: {})", self.max_distance)
    }
}

/// Sentence-embedding cosine similarity matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingMatcher {
    /// Embedding model identifier.
    pub model: String,
}

impl Default for EmbeddingMatcher {
    fn default() -> Self {
        Self {
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
        }
    }
}

impl Matcher for EmbeddingMatcher {
    fn get_similarity(&self, _query: &str, _candidates: &Candidates) -> Result<Option<MatchResult>> {
        Err(PyramidError::NotImplemented("embedding matching"))
    }
}

impl fmt::Display for EmbeddingMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransformerMatcher(model: {})", self.model)
    }
}

/// Named matcher strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatcherKind {
    #[default]
    Fuzzy,
    Transformer,
    Geometry,
}

impl MatcherKind {
    pub const ALL: [MatcherKind; 3] = [
        MatcherKind::Fuzzy,
        MatcherKind::Transformer,
        MatcherKind::Geometry,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Fuzzy => "fuzzy",
            Self::Transformer => "transformer",
            Self::Geometry => "geometry",
        }
    }

    /// Names of every available strategy.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|kind| kind.name()).collect()
    }

    /// Build the strategy. `threshold` and `scorer_name` only apply to fuzzy
    /// matching.
    pub fn build(self, threshold: f64, scorer_name: &str) -> Result<Box<dyn Matcher>> {
        Ok(match self {
            Self::Fuzzy => Box::new(FuzzyMatcher::new(threshold, scorer_name)?),
            Self::Transformer => Box::new(EmbeddingMatcher::default()),
            Self::Geometry => Box::new(GeometryMatcher::default()),
        })
    }
}

impl FromStr for MatcherKind {
    type Err = PyramidError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fuzzy" => Ok(Self::Fuzzy),
            "transformer" | "embedding" => Ok(Self::Transformer),
            "geometry" => Ok(Self::Geometry),
            _ => Err(PyramidError::UnknownMatcher(s.to_string())),
        }
    }
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
