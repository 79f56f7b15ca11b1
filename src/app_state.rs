//! Application state for the Actix-web server
//!
//! `AppState` is wrapped in `web::Data` and shared by the request handlers.
//! It holds no browser: every scrape request launches its own session.

use crate::config::Config;
use crate::models::{ScrapeResult, SearchQuery};
use crate::tplc::{self, ScrapeError};
use std::sync::Arc;

/// Runs one pipeline invocation; called on the blocking thread pool
pub type ScrapeRunner = Arc<dyn Fn(SearchQuery) -> Result<ScrapeResult, ScrapeError> + Send + Sync>;

pub struct AppState {
    /// Application configuration
    pub config: Config,
    pub runner: ScrapeRunner,
}

impl AppState {
    /// State whose runner drives a headless Chrome per request
    pub fn with_chrome(config: Config) -> Self {
        let runner_config = config.clone();
        let runner: ScrapeRunner =
            Arc::new(move |query: SearchQuery| tplc::run_with_chrome(&query, &runner_config));
        Self { config, runner }
    }

    pub fn with_runner(config: Config, runner: ScrapeRunner) -> Self {
        Self { config, runner }
    }
}
