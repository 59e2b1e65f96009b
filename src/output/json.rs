//! Structured JSON output

use crate::crawler::PageResult;
use crate::output::traits::{OutputResult, ResultSink};
use std::io::Write;

/// Writes pages as a pretty-printed JSON array with every field preserved
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for JsonSink<W> {
    fn write_results(&mut self, pages: &[PageResult]) -> OutputResult<()> {
        serde_json::to_writer_pretty(&mut self.writer, pages)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
