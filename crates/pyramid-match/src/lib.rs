#![deny(unsafe_code)]

pub mod engine;
pub mod frame;
pub mod fuzz;
pub mod levels;
pub mod matcher;
pub mod output;
pub mod score;

pub use engine::PyramidMatcher;
pub use levels::{check_levels, detect_levels, resolve_schema};
pub use matcher::{
    Attributes, Candidates, DEFAULT_THRESHOLD, EmbeddingMatcher, FuzzyMatcher, GeometryMatcher,
    MatchResult, Matcher, MatcherKind,
};
pub use output::{LevelReport, MatchOutput, MatchReport};
pub use score::{FuzzyScorer, Scorer, ScorerKind};
