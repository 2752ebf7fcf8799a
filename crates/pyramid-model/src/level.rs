use std::cmp::Ordering;
use std::fmt;

use crate::error::{PyramidError, Result};

/// Identifier of one hierarchy level, e.g. `level_2`.
///
/// Levels order by their trailing number so that `level_2` sorts before
/// `level_10`. Identifiers without a trailing number sort after numbered ones,
/// lexicographically among themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct LevelId(String);

impl LevelId {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PyramidError::InvalidLevel(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing level number, if the identifier ends in digits.
    pub fn depth(&self) -> Option<u32> {
        let digits = self
            .0
            .bytes()
            .rev()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits == 0 {
            return None;
        }
        self.0[self.0.len() - digits..].parse().ok()
    }

    /// Column holding this level's names, e.g. `level_2_name`.
    pub fn name_column(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.0)
    }

    /// Prefix shared by every column of this level, e.g. `level_2_`.
    pub fn column_prefix(&self) -> String {
        format!("{}_", self.0)
    }
}

impl Ord for LevelId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.depth(), other.depth()) {
            (Some(left), Some(right)) => left.cmp(&right).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for LevelId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(value: &str) -> LevelId {
        LevelId::new(value).unwrap()
    }

    #[test]
    fn orders_by_trailing_number() {
        let mut levels = vec![level("level_10"), level("level_2"), level("level_1")];
        levels.sort();
        let names: Vec<&str> = levels.iter().map(LevelId::as_str).collect();
        assert_eq!(names, vec!["level_1", "level_2", "level_10"]);
    }

    #[test]
    fn unnumbered_levels_sort_last() {
        let mut levels = vec![level("region"), level("level_3"), level("country")];
        levels.sort();
        let names: Vec<&str> = levels.iter().map(LevelId::as_str).collect();
        assert_eq!(names, vec!["level_3", "country", "region"]);
    }

    #[test]
    fn rejects_blank_identifier() {
        assert!(matches!(
            LevelId::new("   "),
            Err(PyramidError::InvalidLevel(_))
        ));
    }

    #[test]
    fn builds_column_names() {
        let id = level("level_4");
        assert_eq!(id.depth(), Some(4));
        assert_eq!(id.name_column("_name"), "level_4_name");
        assert_eq!(id.column_prefix(), "level_4_");
    }
}
