//! CSV writing of result tables.

use std::path::Path;

use polars::prelude::{AnyValue, DataFrame};

use crate::error::{IngestError, Result};

fn cell_text(value: AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(value) => value.to_string(),
        AnyValue::StringOwned(value) => value.to_string(),
        other => other.to_string(),
    }
}

/// Write `df` to `path` as CSV with a header row.
///
/// Parent directories are created as needed. Nulls are written as empty
/// cells, so a zero-row table still produces its header line.
pub fn write_frame_csv(df: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| IngestError::FileWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let csv_error = |source: csv::Error| IngestError::CsvWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .map_err(csv_error)?;
    let names: Vec<&str> = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str())
        .collect();
    writer.write_record(&names).map_err(csv_error)?;

    let columns = df.get_columns();
    for idx in 0..df.height() {
        let mut record = Vec::with_capacity(columns.len());
        for column in columns {
            record.push(cell_text(column.get(idx)?));
        }
        writer.write_record(&record).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| IngestError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), rows = df.height(), "wrote table");
    Ok(())
}
