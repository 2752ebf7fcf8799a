//! Error types for pyramid matching.

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::schema::PyramidSide;

/// Errors raised while configuring or running a pyramid match.
///
/// Everything except [`PyramidError::NotImplemented`] and
/// [`PyramidError::Frame`] is a configuration problem detected before any
/// level is matched.
#[derive(Debug, Error)]
pub enum PyramidError {
    // === Configuration Errors ===
    /// Scorer name not recognised.
    #[error(
        "unsupported scorer '{0}' (expected one of: ratio, partial_ratio, token_sort_ratio, token_set_ratio, wratio)"
    )]
    UnsupportedScorer(String),

    /// Matcher name not recognised.
    #[error("unknown matcher '{0}' (expected one of: fuzzy, transformer, geometry)")]
    UnknownMatcher(String),

    /// Acceptance threshold outside the score range.
    #[error("threshold {0} is outside the 0-100 score range")]
    InvalidThreshold(f64),

    /// Matching column suffix is empty.
    #[error("matching column suffix must not be empty")]
    EmptySuffix,

    /// Level identifier is empty or blank.
    #[error("invalid level identifier '{0}'")]
    InvalidLevel(String),

    /// No level is shared by both pyramids.
    #[error("no level columns ending in '{suffix}' are shared by both pyramids")]
    NoLevelsDetected { suffix: String },

    /// Requested level has no name column in one of the pyramids.
    #[error("level {level} not present in {side} pyramid (missing column '{column}')")]
    MissingLevelColumn {
        side: PyramidSide,
        level: String,
        column: String,
    },

    /// Pyramid has no `level_*` column at all.
    #[error("invalid {side} pyramid: no level columns found")]
    InvalidPyramid { side: PyramidSide },

    // === Runtime Errors ===
    /// Matcher strategy exists as an extension point only.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// Failed DataFrame operation.
    #[error("dataframe operation failed: {0}")]
    Frame(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, PyramidError>;
