//! Level detection and schema resolution.

use std::collections::BTreeSet;

use pyramid_model::{
    LevelId, LevelSchema, MatchOptions, PyramidError, PyramidSchema, PyramidSide, Result,
};

/// Levels whose name column (`<level><suffix>`) exists in both tables.
///
/// Returned in ascending level order.
pub fn detect_levels<R, C>(
    reference_columns: &[R],
    candidate_columns: &[C],
    suffix: &str,
) -> Result<Vec<LevelId>>
where
    R: AsRef<str>,
    C: AsRef<str>,
{
    if suffix.is_empty() {
        return Err(PyramidError::EmptySuffix);
    }
    let reference = strip_suffix(reference_columns, suffix);
    let candidate = strip_suffix(candidate_columns, suffix);

    let mut levels = reference
        .intersection(&candidate)
        .map(|level| LevelId::new(level.as_str()))
        .collect::<Result<Vec<_>>>()?;
    levels.sort();
    if levels.is_empty() {
        return Err(PyramidError::NoLevelsDetected {
            suffix: suffix.to_string(),
        });
    }
    Ok(levels)
}

fn strip_suffix<S: AsRef<str>>(columns: &[S], suffix: &str) -> BTreeSet<String> {
    columns
        .iter()
        .filter_map(|column| column.as_ref().strip_suffix(suffix))
        .filter(|level| !level.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate an explicit level list against both tables.
///
/// The result is sorted ascending and deduplicated.
pub fn check_levels<S, R, C>(
    levels: &[S],
    reference_columns: &[R],
    candidate_columns: &[C],
    suffix: &str,
) -> Result<Vec<LevelId>>
where
    S: AsRef<str>,
    R: AsRef<str>,
    C: AsRef<str>,
{
    if suffix.is_empty() {
        return Err(PyramidError::EmptySuffix);
    }
    let mut checked = Vec::with_capacity(levels.len());
    for level in levels {
        let level = LevelId::new(level.as_ref())?;
        let column = level.name_column(suffix);
        for (side, columns) in [
            (PyramidSide::Reference, names(reference_columns)),
            (PyramidSide::Candidate, names(candidate_columns)),
        ] {
            if !columns.contains(&column.as_str()) {
                return Err(PyramidError::MissingLevelColumn {
                    side,
                    level: level.to_string(),
                    column,
                });
            }
        }
        checked.push(level);
    }
    checked.sort();
    checked.dedup();
    if checked.is_empty() {
        return Err(PyramidError::NoLevelsDetected {
            suffix: suffix.to_string(),
        });
    }
    Ok(checked)
}

fn names<S: AsRef<str>>(columns: &[S]) -> Vec<&str> {
    columns.iter().map(AsRef::as_ref).collect()
}

/// Resolve the levels to match and their columns on both sides.
pub fn resolve_schema<R, C>(
    reference_columns: &[R],
    candidate_columns: &[C],
    options: &MatchOptions,
) -> Result<PyramidSchema>
where
    R: AsRef<str>,
    C: AsRef<str>,
{
    let suffix = options.matching_column_suffix.as_str();
    let levels = match &options.levels {
        Some(levels) => check_levels(levels, reference_columns, candidate_columns, suffix)?,
        None => detect_levels(reference_columns, candidate_columns, suffix)?,
    };
    let levels = levels
        .into_iter()
        .map(|level| LevelSchema::from_columns(level, suffix, reference_columns, candidate_columns))
        .collect();
    Ok(PyramidSchema {
        suffix: suffix.to_string(),
        levels,
    })
}
