use serde::{Deserialize, Serialize};

/// Minimum report year the TPLC search form selects by default.
pub const DEFAULT_MIN_REPORT_YEAR: i32 = 2020;

/// One row of a device-problem or patient-problem table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProblemRecord {
    pub name: String,
    pub mdr_count: Option<u64>,
    pub event_count: Option<u64>,
    /// MAUDE link for the problem, absolute when the page used a `../` href
    pub external_link: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub device_name: String,
    pub device_problems: Vec<ProblemRecord>,
    pub patient_problems: Vec<ProblemRecord>,
}

impl DeviceRecord {
    pub fn has_problems(&self) -> bool {
        !self.device_problems.is_empty() || !self.patient_problems.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeStatus {
    Success,
}

/// Response envelope returned by a pipeline run
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScrapeResult {
    pub status: ScrapeStatus,
    pub message: Option<String>,
    pub data: Vec<DeviceRecord>,
}

impl ScrapeResult {
    pub const NO_RESULTS_MESSAGE: &'static str = "No results found for the given criteria.";

    pub fn success(data: Vec<DeviceRecord>) -> Self {
        Self {
            status: ScrapeStatus::Success,
            message: None,
            data,
        }
    }

    pub fn no_results() -> Self {
        Self {
            status: ScrapeStatus::Success,
            message: Some(Self::NO_RESULTS_MESSAGE.to_string()),
            data: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub device_name: String,
    pub product_code: Option<String>,
    #[serde(default = "default_min_report_year")]
    pub min_report_year: i32,
}

fn default_min_report_year() -> i32 {
    DEFAULT_MIN_REPORT_YEAR
}

impl SearchQuery {
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            product_code: None,
            min_report_year: DEFAULT_MIN_REPORT_YEAR,
        }
    }

    pub fn with_product_code(mut self, product_code: impl Into<String>) -> Self {
        self.product_code = Some(product_code.into());
        self
    }

    pub fn with_min_report_year(mut self, year: i32) -> Self {
        self.min_report_year = year;
        self
    }

    /// Product code with blank values treated as absent
    pub fn product_code(&self) -> Option<&str> {
        self.product_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}
