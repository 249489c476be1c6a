//! Time windows and the sliding assemble of source windows

use std::io;
use std::path::PathBuf;

mod assemble;
mod time_window;

#[cfg(test)]
mod tests;

pub use assemble::WindowAssemble;
pub use time_window::TimeWindow;

/// Common error type for migration operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Satellite data {} not found", .0.display())]
    NotFound(PathBuf),
    #[error("Format error: {0}")]
    Format(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
