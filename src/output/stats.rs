//! Run summary reported at the end of a crawl

use crate::state::RunState;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Counters describing one finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    /// Seed URL as given
    pub seed: String,

    /// State the run ended in
    pub state: RunState,

    /// Pages rendered and extracted
    pub pages_captured: usize,

    /// Pages skipped after a render or extraction fault
    pub pages_failed: usize,

    /// Dequeued URLs skipped because they were already visited
    pub duplicates_skipped: usize,

    /// URLs still waiting when the run ended
    pub frontier_remaining: usize,

    /// Distinct URLs dequeued
    pub visited: usize,

    pub max_pages: usize,

    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl CrawlSummary {
    /// Pages per second over the whole run
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.pages_captured as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Crawl Summary ===")?;
        writeln!(f, "  Seed: {}", self.seed)?;
        writeln!(f, "  State: {}", self.state)?;
        writeln!(
            f,
            "  Pages captured: {} (budget {})",
            self.pages_captured, self.max_pages
        )?;
        writeln!(f, "  Pages failed: {}", self.pages_failed)?;
        if self.duplicates_skipped > 0 {
            writeln!(f, "  Duplicates skipped: {}", self.duplicates_skipped)?;
        }
        writeln!(f, "  Left in frontier: {}", self.frontier_remaining)?;
        write!(
            f,
            "  Elapsed: {:.2}s ({:.2} pages/sec)",
            self.elapsed.as_secs_f64(),
            self.rate()
        )
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}
