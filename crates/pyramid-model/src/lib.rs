#![deny(unsafe_code)]

pub mod error;
pub mod level;
pub mod options;
pub mod schema;

pub use error::{PyramidError, Result};
pub use level::LevelId;
pub use options::MatchOptions;
pub use schema::{LevelSchema, PyramidSchema, PyramidSide};
