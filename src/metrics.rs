//! Counters for a single pipeline run
//!
//! Logged as a summary when the run finishes; never part of the response.

use crate::tplc::{LinkHarvest, SkipReason};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub results_pages: usize,
    pub links_harvested: usize,
    pub details_scraped: usize,
    pub skipped_unusable: usize,
    pub skipped_without_problems: usize,
    pub hit_page_cap: bool,
    pub elapsed_ms: u64,
}

#[derive(Debug)]
pub struct RunMetrics {
    started: Instant,
    summary: RunSummary,
}

impl RunMetrics {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            summary: RunSummary::default(),
        }
    }

    pub fn record_harvest(&mut self, harvest: &LinkHarvest) {
        self.summary.results_pages = harvest.pages_visited;
        self.summary.links_harvested = harvest.links.len();
        self.summary.hit_page_cap = harvest.hit_page_cap;
    }

    pub fn record_scraped(&mut self) {
        self.summary.details_scraped += 1;
    }

    pub fn record_skipped(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::Unusable { .. } => self.summary.skipped_unusable += 1,
            SkipReason::NoProblems => self.summary.skipped_without_problems += 1,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn finish(mut self) -> RunSummary {
        self.summary.elapsed_ms = u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.summary
    }
}

impl RunSummary {
    pub fn log(&self) {
        log::info!(
            "Run finished in {}ms: {} results pages, {} links, {} devices scraped, {} skipped (unusable: {}, no problems: {})",
            self.elapsed_ms,
            self.results_pages,
            self.links_harvested,
            self.details_scraped,
            self.skipped_unusable + self.skipped_without_problems,
            self.skipped_unusable,
            self.skipped_without_problems,
        );
        if self.hit_page_cap {
            log::warn!("Results walk stopped at the page cap; results may be incomplete");
        }
    }
}
