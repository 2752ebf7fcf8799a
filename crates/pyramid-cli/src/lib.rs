//! CLI library components for pyramid matching.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
