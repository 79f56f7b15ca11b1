//! FDA TPLC (Total Product Life Cycle) device search
//!
//! Search form -> paginated results -> per-device detail pages, each with
//! optional "Device Problems" and "Patient Problems" tables.

pub mod detail;
pub mod pipeline;
pub mod search;
pub mod tables;

pub use detail::{scrape_detail, DetailOutcome, SkipReason};
pub use pipeline::{run, run_with_chrome, ScrapeError};
pub use search::{collect_detail_links, LinkHarvest, WalkOutcome};
pub use tables::extract_problems;

/// Search entry point
pub const SEARCH_URL: &str = "https://www.accessdata.fda.gov/scripts/cdrh/cfdocs/cfTPLC/tplc.cfm";

/// Base that results-page hrefs are resolved against
pub const RESULTS_BASE_URL: &str = "https://www.accessdata.fda.gov/scripts/cdrh/cfdocs/cfTPLC/";

/// Base that `../` problem links are rewritten onto
pub const PROBLEM_LINK_BASE: &str = "https://www.accessdata.fda.gov/scripts/cdrh/cfdocs/";

pub const DEVICE_PROBLEMS_HEADER: &str = "Device Problems";
pub const PATIENT_PROBLEMS_HEADER: &str = "Patient Problems";

pub const UNKNOWN_DEVICE_NAME: &str = "Unknown Device Name";

/// Form and page selectors
pub mod selectors {
    pub const DEVICE_NAME_INPUT: &str = "input[name=devicename]";
    pub const PRODUCT_CODE_INPUT: &str = "input[name=productcode]";
    pub const MIN_YEAR_SELECT: &str = "select[name=min_report_year]";
    pub const SEARCH_BUTTON: &str = "input[name=search]";
    pub const RESULTS_COUNT: &str = "#eir-results-number";
    pub const NEXT_PAGE: &str = "a[title=Next]";
    pub const DETAIL_LINK: &str = "a[href*='tplc.cfm?id=']";
    pub const RESULTS_HEADER_TEXT: &str = "device name";
    pub const IDENTITY_HEADER_TEXT: &str = "Device";
}
