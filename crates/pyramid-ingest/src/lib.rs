//! Pyramid table ingestion.
//!
//! Loads reference and candidate pyramids from CSV files into Polars
//! DataFrames and writes result tables back to CSV. The matching engine
//! itself never touches the file system.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use pyramid_ingest::{read_pyramid_csv, write_frame_csv};
//!
//! let reference = read_pyramid_csv(Path::new("data/reference.csv"))?;
//! write_frame_csv(&reference, Path::new("out/reference_copy.csv"))?;
//! ```

mod error;
mod reader;
mod writer;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use reader::{
    MAX_CSV_FILE_SIZE, check_file_size, read_pyramid_csv, validate_encoding, validate_frame_shape,
};

// === CSV Writing ===
pub use writer::write_frame_csv;
