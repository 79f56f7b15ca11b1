// In-memory stand-in for a browser, serving canned pages by URL.
// The search button "submits" by switching to the configured results URL;
// links are followed by resolving their href against the current URL.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tplc_scraper::browser::{BrowserError, BrowserSession, Locator};
use tplc_scraper::tplc::{selectors, RESULTS_BASE_URL, SEARCH_URL};

/// Everything the fake browser was asked to do
#[derive(Debug, Default)]
pub struct Activity {
    pub visited: Vec<String>,
    pub filled: Vec<(String, String)>,
    pub selected: Vec<(String, String)>,
    pub close_calls: usize,
}

impl Activity {
    pub fn visits_to(&self, url: &str) -> usize {
        self.visited.iter().filter(|v| v.as_str() == url).count()
    }

    pub fn filled_value(&self, css: &str) -> Option<&str> {
        self.filled
            .iter()
            .find(|(sel, _)| sel == css)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone)]
pub struct FakeSite {
    pages: HashMap<String, String>,
    results_url: String,
    pub activity: Arc<Mutex<Activity>>,
}

impl FakeSite {
    /// A site whose search page has the full form and submits to `results_url`
    pub fn new(results_url: &str) -> Self {
        let mut site = Self {
            pages: HashMap::new(),
            results_url: results_url.to_string(),
            activity: Arc::new(Mutex::new(Activity::default())),
        };
        site.pages.insert(SEARCH_URL.to_string(), search_form_page());
        site
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn without_page(mut self, url: &str) -> Self {
        self.pages.remove(url);
        self
    }

    pub fn session(&self) -> FakeSession {
        FakeSession {
            site: self.clone(),
            current: None,
        }
    }

    pub fn activity(&self) -> std::sync::MutexGuard<'_, Activity> {
        self.activity.lock().unwrap()
    }
}

pub struct FakeSession {
    site: FakeSite,
    current: Option<String>,
}

impl FakeSession {
    fn load(&mut self, url: &str) -> Result<(), BrowserError> {
        if self.site.pages.contains_key(url) {
            self.current = Some(url.to_string());
            Ok(())
        } else {
            Err(BrowserError::NavigationError(format!("{}: 404", url)))
        }
    }

    fn require(&self, locator: &Locator) -> Result<(), BrowserError> {
        if self.exists(locator)? {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound(locator.to_string()))
        }
    }
}

impl BrowserSession for FakeSession {
    fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), BrowserError> {
        self.site.activity().visited.push(url.to_string());
        self.load(url)
    }

    fn current_url(&self) -> String {
        self.current.clone().unwrap_or_else(|| "about:blank".to_string())
    }

    fn wait_visible(&mut self, locator: &Locator, _timeout: Duration) -> Result<(), BrowserError> {
        self.require(locator)
            .map_err(|_| BrowserError::Timeout(format!("waiting for {}", locator)))
    }

    fn wait_for_idle(&mut self, _quiet: Duration, _timeout: Duration) -> Result<(), BrowserError> {
        Ok(())
    }

    fn fill(&mut self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        self.require(locator)?;
        self.site
            .activity()
            .filled
            .push((locator.css_selector().to_string(), value.to_string()));
        Ok(())
    }

    fn select_option(&mut self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        self.require(locator)?;
        self.site
            .activity()
            .selected
            .push((locator.css_selector().to_string(), value.to_string()));
        Ok(())
    }

    fn click(&mut self, locator: &Locator) -> Result<(), BrowserError> {
        self.require(locator)?;
        if locator.css_selector() == selectors::SEARCH_BUTTON {
            let results = self.site.results_url.clone();
            self.load(&results)?;
        }
        Ok(())
    }

    fn follow(&mut self, locator: &Locator, _timeout: Duration) -> Result<(), BrowserError> {
        let href = self
            .read_attributes(locator, "href")?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::ElementNotFound(locator.to_string()))?;
        let target = url::Url::parse(&self.current_url())
            .and_then(|base| base.join(&href))
            .map_err(|e| BrowserError::NavigationError(e.to_string()))?;
        self.site.activity().visited.push(target.to_string());
        self.load(target.as_str())
    }

    fn content(&self) -> Result<String, BrowserError> {
        self.current
            .as_ref()
            .and_then(|url| self.site.pages.get(url))
            .cloned()
            .ok_or_else(|| BrowserError::HtmlExtractionError("no page loaded".to_string()))
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        self.site.activity().close_calls += 1;
        Ok(())
    }
}

pub fn detail_url(id: u32) -> String {
    format!("{}tplc.cfm?id={}", RESULTS_BASE_URL, id)
}

pub fn results_url(page: u32) -> String {
    format!("{}results.cfm?page={}", RESULTS_BASE_URL, page)
}

pub fn search_form_page() -> String {
    r#"<html><body><form>
         <input name="devicename" type="text">
         <input name="productcode" type="text">
         <select name="min_report_year">
           <option value="2020">2020</option>
           <option value="2022">2022</option>
         </select>
         <input name="search" type="submit" value="Search">
       </form></body></html>"#
        .to_string()
}

/// A results page listing `ids`, with a Next link to `next_page` when given
pub fn results_page(ids: &[u32], next_page: Option<u32>) -> String {
    let rows: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<tr><td><a href="tplc.cfm?id={id}">Device {id}</a></td><td>FMF</td></tr>"#
            )
        })
        .collect();
    let next = next_page
        .map(|p| format!(r#"<a title="Next" href="results.cfm?page={p}">Next</a>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body>
             <span id="eir-results-number">{} results</span>
             <table><tr><th>Device Name</th><th>Product Code</th></tr>{}</table>
             {}
           </body></html>"#,
        ids.len(),
        rows,
        next
    )
}

pub fn no_results_page() -> String {
    r#"<html><body><span id="eir-results-number">0 results</span></body></html>"#.to_string()
}

/// A detail page; each problem is (name, mdr count, event count)
pub fn detail_page(name: &str, device: &[(&str, &str, &str)], patient: &[(&str, &str, &str)]) -> String {
    fn table(label: &str, rows: &[(&str, &str, &str)]) -> String {
        let body: String = rows
            .iter()
            .map(|(problem, mdrs, events)| {
                format!(
                    r#"<tr><td><a href="../maude/search.cfm?problem={problem}">{problem}</a></td><td>{mdrs}</td><td>{events}</td></tr>"#
                )
            })
            .collect();
        format!(
            r#"<table><tr><th>{label}</th><th>MDRs</th><th>Events</th></tr>{body}</table>"#
        )
    }

    format!(
        r#"<html><body>
             <table><tr><th>Device</th><td>{}</td></tr></table>
             {}
             {}
           </body></html>"#,
        name,
        table("Device Problems", device),
        table("Patient Problems", patient)
    )
}
