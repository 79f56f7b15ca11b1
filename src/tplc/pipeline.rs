use super::detail::{scrape_detail, DetailOutcome};
use super::search::{collect_detail_links, WalkOutcome};
use super::SEARCH_URL;
use crate::browser::{BrowserError, BrowserScraper, BrowserSession, SessionGuard};
use crate::config::{Config, ScrapeSettings};
use crate::metrics::RunMetrics;
use crate::models::{ScrapeResult, SearchQuery};

/// Failures that abort a whole run. Problems with a single detail page are
/// not errors; those pages are skipped.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Failed to start browser: {0}")]
    Launch(#[source] BrowserError),

    #[error("Failed to load search page: {0}")]
    Navigation(#[source] BrowserError),

    #[error("Search form unavailable: {source}")]
    SearchInputUnavailable {
        #[source]
        source: BrowserError,
        /// Truncated page content at the time of the failure
        page_state: String,
    },
}

fn validate(query: &SearchQuery) -> Result<(), ScrapeError> {
    if query.device_name.trim().is_empty() {
        return Err(ScrapeError::InvalidQuery(
            "device_name must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Run the full search -> results -> detail pipeline for `query`.
///
/// `acquire` opens the browser session; it is only called for a valid
/// query, and the session is closed again on every exit path.
pub fn run<S, F>(query: &SearchQuery, settings: &ScrapeSettings, acquire: F) -> Result<ScrapeResult, ScrapeError>
where
    S: BrowserSession,
    F: FnOnce() -> Result<S, BrowserError>,
{
    validate(query)?;

    log::info!("Starting scraper for device '{}'", query.device_name.trim());
    let session = acquire().map_err(ScrapeError::Launch)?;
    let mut session = SessionGuard::new(session);

    execute(&mut *session, query, settings)
}

/// [`run`] with a freshly launched headless Chrome per call
pub fn run_with_chrome(query: &SearchQuery, config: &Config) -> Result<ScrapeResult, ScrapeError> {
    let browser_config = config.browser.to_browser_config();
    run(query, &config.scrape, move || BrowserScraper::launch(browser_config))
}

fn execute<S>(session: &mut S, query: &SearchQuery, settings: &ScrapeSettings) -> Result<ScrapeResult, ScrapeError>
where
    S: BrowserSession + ?Sized,
{
    let mut metrics = RunMetrics::start();

    session
        .navigate(SEARCH_URL, settings.initial_load_timeout())
        .map_err(ScrapeError::Navigation)?;
    log::info!("Navigated to search page.");

    if let Err(e) = session.wait_for_idle(settings.quiet_period(), settings.idle_timeout()) {
        log::warn!("Search page did not settle: {}", e);
    }

    let harvest = match collect_detail_links(session, query, settings)? {
        WalkOutcome::NoResults => {
            metrics.finish().log();
            return Ok(ScrapeResult::no_results());
        }
        WalkOutcome::Links(harvest) => harvest,
    };
    metrics.record_harvest(&harvest);

    let total = harvest.links.len();
    log::info!("Found {} device links. Scraping each page...", total);

    let mut data = Vec::new();
    for (i, link) in harvest.links.iter().enumerate() {
        log::info!("Scraping page {}/{}: {}", i + 1, total, link);
        match scrape_detail(session, link, settings) {
            DetailOutcome::Record(record) => {
                metrics.record_scraped();
                data.push(record);
            }
            DetailOutcome::Skipped(reason) => metrics.record_skipped(&reason),
        }
    }

    metrics.finish().log();
    Ok(ScrapeResult::success(data))
}
