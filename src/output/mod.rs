//! Output of crawl results
//!
//! This module handles:
//! - Structured JSON serialization of every captured page
//! - Flattened Markdown documents, one section per page
//! - The end-of-run summary

mod json;
mod markdown;
pub mod stats;
mod traits;

pub use json::JsonSink;
pub use markdown::{format_page, format_pages, MarkdownSink, PAGE_DELIMITER};
pub use stats::CrawlSummary;
pub use traits::{OutputError, OutputResult, ResultSink};

use crate::config::OutputFormat;
use crate::crawler::PageResult;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Builds the sink for `format` over `writer`
pub fn sink_for<W: Write + 'static>(format: OutputFormat, writer: W) -> Box<dyn ResultSink> {
    match format {
        OutputFormat::Json => Box::new(JsonSink::new(writer)),
        OutputFormat::Markdown => Box::new(MarkdownSink::new(writer)),
    }
}

/// Writes `pages` in `format` to `path`, or to stdout when `path` is `None`
///
/// # Arguments
///
/// * `pages` - Captured pages in visit order
/// * `format` - Output serialization
/// * `path` - Destination file; created or truncated
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote all pages
/// * `Err(OutputError)` - Failed to create the file or serialize
pub fn write_output(pages: &[PageResult], format: OutputFormat, path: Option<&Path>) -> OutputResult<()> {
    match path {
        Some(path) => {
            let file = File::create(path)?;
            sink_for(format, BufWriter::new(file)).write_results(pages)?;
            info!("Wrote {} pages to {} as {}", pages.len(), path.display(), format);
        }
        None => {
            sink_for(format, io::stdout()).write_results(pages)?;
        }
    }
    Ok(())
}
