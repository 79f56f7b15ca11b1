use super::tables::extract_problems;
use super::{selectors, DEVICE_PROBLEMS_HEADER, PATIENT_PROBLEMS_HEADER, UNKNOWN_DEVICE_NAME};
use crate::browser::{BrowserError, BrowserSession, Locator};
use crate::config::ScrapeSettings;
use crate::helpers::element_text;
use crate::models::DeviceRecord;
use scraper::{ElementRef, Html};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The page never loaded or never showed its "Device" header
    Unusable { error: BrowserError, attempts: usize },
    /// Neither problem table had any rows
    NoProblems,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Record(DeviceRecord),
    Skipped(SkipReason),
}

fn identity_marker() -> Locator {
    Locator::exact_text("th", selectors::IDENTITY_HEADER_TEXT)
}

/// Load one device detail page and read its problem tables.
///
/// Load failures are retried per the settings' retry policy and then turned
/// into [`SkipReason::Unusable`]; they never abort the run.
pub fn scrape_detail<S>(session: &mut S, url: &str, settings: &ScrapeSettings) -> DetailOutcome
where
    S: BrowserSession + ?Sized,
{
    let policy = settings.retry_policy();
    let mut last_error = None;

    for attempt in 0..policy.attempts() {
        if attempt > 0 {
            let delay = policy.delay_for(attempt - 1);
            log::info!(
                "Retrying {} in {}ms (attempt {}/{})",
                url,
                delay.as_millis(),
                attempt + 1,
                policy.attempts()
            );
            std::thread::sleep(delay);
        }

        match open_detail_page(session, url, settings) {
            Ok(document) => return read_device(&document, url),
            Err(e) => {
                log::warn!("Detail page {} not usable: {}", url, e);
                last_error = Some(e);
            }
        }
    }

    let error = last_error.unwrap_or_else(|| BrowserError::NavigationError(url.to_string()));
    log::warn!("Skipping {} after {} attempt(s)", url, policy.attempts());
    DetailOutcome::Skipped(SkipReason::Unusable {
        error,
        attempts: policy.attempts(),
    })
}

fn open_detail_page<S>(session: &mut S, url: &str, settings: &ScrapeSettings) -> Result<Html, BrowserError>
where
    S: BrowserSession + ?Sized,
{
    session.navigate(url, settings.initial_load_timeout())?;
    session.wait_visible(&identity_marker(), settings.element_timeout())?;
    session.document()
}

/// Build the device record from a loaded detail page
pub fn read_device(document: &Html, url: &str) -> DetailOutcome {
    let device_name = device_name(document).unwrap_or_else(|| UNKNOWN_DEVICE_NAME.to_string());

    let record = DeviceRecord {
        device_problems: extract_problems(document, DEVICE_PROBLEMS_HEADER),
        patient_problems: extract_problems(document, PATIENT_PROBLEMS_HEADER),
        device_name,
    };

    if record.has_problems() {
        log::debug!(
            "{}: {} device problems, {} patient problems",
            record.device_name,
            record.device_problems.len(),
            record.patient_problems.len()
        );
        DetailOutcome::Record(record)
    } else {
        log::info!("No problems listed for {} ({}), skipping", record.device_name, url);
        DetailOutcome::Skipped(SkipReason::NoProblems)
    }
}

/// Text of the `td` right after the "Device" header cell
fn device_name(document: &Html) -> Option<String> {
    let header = identity_marker().find_in(document).ok()?.into_iter().next()?;
    let cell = header.next_siblings().find_map(ElementRef::wrap)?;
    if cell.value().name() != "td" {
        return None;
    }
    Some(element_text(&cell)).filter(|name| !name.is_empty())
}
