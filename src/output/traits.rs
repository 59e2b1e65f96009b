//! Result sink trait and output errors

use crate::crawler::PageResult;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Receives the ordered sequence of captured pages
///
/// Sinks are handed the whole sequence once, in dequeue order, whether the
/// run completed or was aborted.
pub trait ResultSink {
    /// Writes every page
    ///
    /// # Arguments
    ///
    /// * `pages` - Captured pages in the order they were visited
    fn write_results(&mut self, pages: &[PageResult]) -> OutputResult<()>;
}
