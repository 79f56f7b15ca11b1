use super::pipeline::ScrapeError;
use super::{selectors, RESULTS_BASE_URL};
use crate::browser::{BrowserError, BrowserSession, Locator};
use crate::config::ScrapeSettings;
use crate::helpers::{element_text, parse_result_count, resolve_link, truncate_for_log};
use crate::models::{SearchQuery, DEFAULT_MIN_REPORT_YEAR};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

static HEADER_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("valid selector"));
static DETAIL_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(selectors::DETAIL_LINK).expect("valid selector"));

/// Characters of page content kept in a search-form failure diagnostic
const PAGE_STATE_LIMIT: usize = 4000;

/// Detail-page links gathered across all results pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkHarvest {
    /// Absolute URLs, deduplicated, in the order first seen
    pub links: Vec<String>,
    pub pages_visited: usize,
    pub hit_page_cap: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkOutcome {
    /// The site reported zero matches for the query
    NoResults,
    Links(LinkHarvest),
}

/// Submit `query` on the search form, then walk every results page and
/// collect the detail-page links.
///
/// The session must already be on the search page.
pub fn collect_detail_links<S>(
    session: &mut S,
    query: &SearchQuery,
    settings: &ScrapeSettings,
) -> Result<WalkOutcome, ScrapeError>
where
    S: BrowserSession + ?Sized,
{
    submit_search(session, query, settings)?;

    log::info!("Waiting for search results...");
    if let Err(e) = session.wait_for_idle(settings.quiet_period(), settings.idle_timeout()) {
        log::warn!("Results page did not settle: {}", e);
    }

    if reports_no_results(session) {
        log::info!("No results found.");
        return Ok(WalkOutcome::NoResults);
    }

    Ok(WalkOutcome::Links(walk_results(session, settings)))
}

fn submit_search<S>(session: &mut S, query: &SearchQuery, settings: &ScrapeSettings) -> Result<(), ScrapeError>
where
    S: BrowserSession + ?Sized,
{
    log::info!("Searching for device...");

    let device_input = Locator::css(selectors::DEVICE_NAME_INPUT);
    if let Err(e) = session
        .wait_visible(&device_input, settings.element_timeout())
        .and_then(|_| session.fill(&device_input, query.device_name.trim()))
    {
        log::error!("Timeout while trying to fill the device name. The page might not have loaded correctly.");
        return Err(search_input_unavailable(session, e));
    }

    if let Some(code) = query.product_code() {
        session
            .fill(&Locator::css(selectors::PRODUCT_CODE_INPUT), code)
            .map_err(|e| search_input_unavailable(session, e))?;
    }

    if query.min_report_year != DEFAULT_MIN_REPORT_YEAR {
        session
            .select_option(
                &Locator::css(selectors::MIN_YEAR_SELECT),
                &query.min_report_year.to_string(),
            )
            .map_err(|e| search_input_unavailable(session, e))?;
    }

    session
        .click(&Locator::css(selectors::SEARCH_BUTTON))
        .map_err(|e| search_input_unavailable(session, e))
}

fn search_input_unavailable<S>(session: &S, source: BrowserError) -> ScrapeError
where
    S: BrowserSession + ?Sized,
{
    let page_state = match session.content() {
        Ok(html) => truncate_for_log(&html, PAGE_STATE_LIMIT),
        Err(e) => format!("<page content unavailable: {}>", e),
    };
    log::error!("Search form unusable ({}). Current page content:\n{}", source, page_state);
    ScrapeError::SearchInputUnavailable { source, page_state }
}

/// True only when the results-count indicator is present and reports zero
fn reports_no_results<S>(session: &S) -> bool
where
    S: BrowserSession + ?Sized,
{
    match session.read_text(&Locator::css(selectors::RESULTS_COUNT)) {
        Ok(Some(text)) => parse_result_count(&text) == Some(0),
        Ok(None) => false,
        Err(e) => {
            log::warn!("Could not read results count: {}", e);
            false
        }
    }
}

fn walk_results<S>(session: &mut S, settings: &ScrapeSettings) -> LinkHarvest
where
    S: BrowserSession + ?Sized,
{
    let mut harvest = LinkHarvest::default();
    let mut seen: HashSet<String> = HashSet::new();
    let next = Locator::css(selectors::NEXT_PAGE);

    log::info!("Collecting device links...");
    loop {
        harvest.pages_visited += 1;

        let page_links = match session.document() {
            Ok(document) => page_detail_links(&document),
            Err(e) => {
                log::warn!("Could not read results page {}: {}", harvest.pages_visited, e);
                None
            }
        };

        let page_links = page_links.unwrap_or_else(|| {
            log::warn!("Results table not found on page {}.", harvest.pages_visited);
            Vec::new()
        });

        let found = page_links.len();
        let mut added = 0;
        for link in page_links {
            if seen.insert(link.clone()) {
                harvest.links.push(link);
                added += 1;
            }
        }
        log::info!(
            "Results page {}: {} links ({} new)",
            harvest.pages_visited,
            found,
            added
        );

        match session.exists(&next) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                log::warn!("Could not look for a next page control: {}", e);
                break;
            }
        }

        // Only a walk with pages left to visit is cut short by the cap.
        if harvest.pages_visited >= settings.max_pages {
            log::warn!("Stopping after {} results pages (page cap reached)", settings.max_pages);
            harvest.hit_page_cap = true;
            break;
        }

        log::info!("Navigating to next page...");
        if let Err(e) = session.follow(&next, settings.initial_load_timeout()) {
            log::warn!("Next page did not load, stopping the walk: {}", e);
            break;
        }
        if let Err(e) = session.wait_for_idle(settings.quiet_period(), settings.idle_timeout()) {
            log::warn!("Results page did not settle: {}", e);
        }
    }

    harvest
}

/// Detail links in the results table of one page, resolved to absolute URLs
/// in row order. `None` when the page has no results table.
pub fn page_detail_links(document: &Html) -> Option<Vec<String>> {
    let header = document.select(&HEADER_CELL).find(|th| {
        element_text(th)
            .to_lowercase()
            .contains(selectors::RESULTS_HEADER_TEXT)
    })?;

    let table = header
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")?;

    Some(
        table
            .select(&DETAIL_LINK)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| resolve_link(RESULTS_BASE_URL, href))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_detail_links_in_row_order() {
        let html = Html::parse_document(
            r#"<table>
                 <tr><th>Device Name</th><th>Product Code</th></tr>
                 <tr><td><a href="tplc.cfm?id=3">Syringe B</a></td><td>FMF</td></tr>
                 <tr><td><a href="tplc.cfm?id=1">Syringe A</a></td><td>FMF</td></tr>
                 <tr><td><a href="/other/page.cfm">Help</a></td><td></td></tr>
               </table>"#,
        );
        let links = page_detail_links(&html).unwrap();
        assert_eq!(
            links,
            vec![
                format!("{}tplc.cfm?id=3", RESULTS_BASE_URL),
                format!("{}tplc.cfm?id=1", RESULTS_BASE_URL),
            ]
        );
    }

    #[test]
    fn test_links_outside_results_table_are_ignored() {
        let html = Html::parse_document(
            r#"<a href="tplc.cfm?id=99">Featured</a>
               <table>
                 <tr><th>Device Name</th></tr>
                 <tr><td><a href="tplc.cfm?id=5">Catheter</a></td></tr>
               </table>"#,
        );
        let links = page_detail_links(&html).unwrap();
        assert_eq!(links, vec![format!("{}tplc.cfm?id=5", RESULTS_BASE_URL)]);
    }

    #[test]
    fn test_missing_results_table() {
        let html = Html::parse_document("<p>Please wait...</p>");
        assert_eq!(page_detail_links(&html), None);
    }
}
