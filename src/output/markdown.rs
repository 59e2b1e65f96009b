//! Flattened Markdown output
//!
//! Each page becomes a heading, its source URL, and its Markdown body.
//! Pages are separated by a horizontal rule.

use crate::crawler::PageResult;
use crate::output::traits::{OutputResult, ResultSink};
use std::io::Write;

/// Line placed between consecutive pages
pub const PAGE_DELIMITER: &str = "---";

/// Writes pages as one Markdown document
pub struct MarkdownSink<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for MarkdownSink<W> {
    fn write_results(&mut self, pages: &[PageResult]) -> OutputResult<()> {
        self.writer.write_all(format_pages(pages).as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Formats one page as a Markdown section
///
/// Pages without a title are headed by their URL.
pub fn format_page(page: &PageResult) -> String {
    let heading = if page.title.is_empty() {
        page.url.as_str()
    } else {
        page.title.as_str()
    };

    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", heading));
    md.push_str(&format!("Source: {}\n\n", page.url));
    if !page.markdown.is_empty() {
        md.push_str(page.markdown.trim_end());
        md.push('\n');
    }
    md
}

/// Formats all pages, separated by [`PAGE_DELIMITER`]
pub fn format_pages(pages: &[PageResult]) -> String {
    pages
        .iter()
        .map(format_page)
        .collect::<Vec<_>>()
        .join(&format!("\n{}\n\n", PAGE_DELIMITER))
}
