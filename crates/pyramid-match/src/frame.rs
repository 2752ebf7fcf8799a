//! Small DataFrame helpers shared by the engine and output assembly.

use std::collections::BTreeSet;

use polars::prelude::{AnyValue, BooleanChunked, Column, DataFrame, NewChunkedArray};
use pyramid_model::{PyramidError, PyramidSide, Result};

/// Prefix every level column starts with.
pub const LEVEL_COLUMN_PREFIX: &str = "level_";

/// Text of a cell, `None` for nulls.
pub fn cell_text(value: AnyValue) -> Option<String> {
    match value {
        AnyValue::Null => None,
        AnyValue::String(value) => Some(value.to_string()),
        AnyValue::StringOwned(value) => Some(value.to_string()),
        other => Some(other.to_string()),
    }
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.as_str().to_string())
        .collect()
}

/// Values of `column` as optional strings, one per row.
pub fn column_strings(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let series = df.column(column)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(cell_text(series.get(idx)?));
    }
    Ok(values)
}

/// Reject a table without any `level_*` column.
pub fn require_level_columns(columns: &[String], side: PyramidSide) -> Result<()> {
    if columns
        .iter()
        .any(|column| column.starts_with(LEVEL_COLUMN_PREFIX))
    {
        Ok(())
    } else {
        Err(PyramidError::InvalidPyramid { side })
    }
}

/// Drop exact duplicate rows, keeping the first occurrence in order.
pub fn dedupe_rows(df: &DataFrame) -> Result<DataFrame> {
    if df.height() == 0 {
        return Ok(df.clone());
    }
    let columns = column_names(df)
        .iter()
        .map(|name| column_strings(df, name))
        .collect::<Result<Vec<_>>>()?;

    let mut seen = BTreeSet::new();
    let mut keep = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let row: Vec<Option<&str>> = columns
            .iter()
            .map(|values| values[idx].as_deref())
            .collect();
        keep.push(seen.insert(row));
    }
    if keep.iter().all(|kept| *kept) {
        return Ok(df.clone());
    }
    filter_rows(df, &keep)
}

/// Rows of `df` whose mask entry is `true`.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), keep);
    Ok(df.filter(&mask)?)
}

/// Add a constant string column, replacing any column of the same name.
pub fn tag_rows(mut df: DataFrame, column: &str, value: &str) -> Result<DataFrame> {
    let height = df.height();
    df.with_column(Column::new(column.into(), vec![value.to_string(); height]))?;
    Ok(df)
}

/// Stack frames sharing one schema.
///
/// With no frames, returns a zero-row frame with the columns of `template`
/// plus the `tag` column.
pub fn concat_frames(frames: Vec<DataFrame>, template: &DataFrame, tag: &str) -> Result<DataFrame> {
    let mut frames = frames.into_iter();
    let Some(mut stacked) = frames.next() else {
        return tag_rows(template.head(Some(0)), tag, "");
    };
    for frame in frames {
        stacked.vstack_mut(&frame)?;
    }
    Ok(stacked)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provinces() -> DataFrame {
        DataFrame::new(vec![
            Column::new(
                "level_1_name".into(),
                vec![Some("TSHUAPA"), Some("KWILU"), Some("TSHUAPA"), None],
            ),
            Column::new(
                "level_1_id".into(),
                vec![Some("ym2K6YcSNl9"), Some("BmKjwqc6BEw"), Some("ym2K6YcSNl9"), None],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn reads_cells_as_optional_text() {
        let df = provinces();
        let names = column_strings(&df, "level_1_name").unwrap();
        assert_eq!(names[0].as_deref(), Some("TSHUAPA"));
        assert_eq!(names[3], None);
        assert_eq!(cell_text(AnyValue::Int64(42)).as_deref(), Some("42"));
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let deduped = dedupe_rows(&provinces()).unwrap();
        assert_eq!(deduped.height(), 3);
        let names = column_strings(&deduped, "level_1_name").unwrap();
        assert_eq!(
            names,
            vec![Some("TSHUAPA".to_string()), Some("KWILU".to_string()), None]
        );
    }

    #[test]
    fn tags_and_stacks_rows() {
        let df = provinces();
        let first = filter_rows(&df, &[true, false, false, false]).unwrap();
        let first = tag_rows(first, "unmatched_level", "level_1").unwrap();
        let second = filter_rows(&df, &[false, true, false, false]).unwrap();
        let second = tag_rows(second, "unmatched_level", "level_2").unwrap();
        let stacked = concat_frames(vec![first, second], &df, "unmatched_level").unwrap();
        assert_eq!(stacked.height(), 2);
        let levels = column_strings(&stacked, "unmatched_level").unwrap();
        assert_eq!(
            levels,
            vec![Some("level_1".to_string()), Some("level_2".to_string())]
        );
    }

    #[test]
    fn empty_stack_keeps_columns() {
        let df = provinces();
        let stacked = concat_frames(Vec::new(), &df, "unmatched_level").unwrap();
        assert_eq!(stacked.height(), 0);
        assert_eq!(
            column_names(&stacked),
            vec!["level_1_name", "level_1_id", "unmatched_level"]
        );
    }

    #[test]
    fn table_without_levels_is_invalid() {
        let columns = vec!["province".to_string()];
        assert!(matches!(
            require_level_columns(&columns, PyramidSide::Candidate),
            Err(PyramidError::InvalidPyramid {
                side: PyramidSide::Candidate
            })
        ));
    }
}
