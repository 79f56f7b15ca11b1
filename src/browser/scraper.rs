use super::config::BrowserConfig;
use super::manager::{BrowserError, BrowserManager};
use super::session::{BrowserSession, Locator};
use headless_chrome::Tab;
use std::sync::Arc;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Marker set on a document before following a link; a page without it is
/// a freshly loaded one.
const STALE_MARKER: &str = "__tplcStale";

/// [`BrowserSession`] backed by a headless Chrome tab
pub struct BrowserScraper {
    // Declared before the manager so the tab handle drops first.
    tab: Arc<Tab>,
    // Owns the Chrome process for as long as the tab is in use.
    _manager: BrowserManager,
    closed: bool,
}

impl BrowserScraper {
    /// Launch Chrome and open the tab this session drives
    pub fn launch(config: BrowserConfig) -> Result<Self, BrowserError> {
        let manager = BrowserManager::new(&config)?;
        let tab = manager.new_tab()?;
        Ok(Self {
            tab,
            _manager: manager,
            closed: false,
        })
    }

    /// JavaScript expression evaluating to the first element matching `locator`, or null
    fn element_expr(locator: &Locator) -> Result<String, BrowserError> {
        let css = js_string(locator.css_selector())?;
        let text = match locator.text() {
            Some(t) => js_string(t)?,
            None => "null".to_string(),
        };
        Ok(format!(
            r#"(Array.from(document.querySelectorAll({css})).find(e => {text} === null || (e.innerText || e.textContent || '').replace(/\s+/g, ' ').trim() === {text}) || null)"#,
            css = css,
            text = text,
        ))
    }

    /// Run `body` against the located element (bound to `el`); the script
    /// must return a boolean. `false` maps to [`BrowserError::ElementNotFound`].
    fn with_element(&self, locator: &Locator, body: &str) -> Result<(), BrowserError> {
        let script = format!(
            "(() => {{ const el = {}; if (!el) return false; {} }})()",
            Self::element_expr(locator)?,
            body
        );
        if self.eval_bool(&script)? {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound(locator.to_string()))
        }
    }

    fn eval_bool(&self, script: &str) -> Result<bool, BrowserError> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;
        Ok(result.value.and_then(|v| v.as_bool()) == Some(true))
    }

    /// Poll `script` until it evaluates to true. Evaluation errors count as
    /// "not yet", since they are expected while a navigation is in flight.
    fn poll_until(&self, script: &str, what: &str, timeout: Duration) -> Result<(), BrowserError> {
        let start = Instant::now();
        loop {
            if let Ok(true) = self.eval_bool(script) {
                return Ok(());
            }
            if start.elapsed() > timeout {
                return Err(BrowserError::Timeout(what.to_string()));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

impl BrowserSession for BrowserScraper {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.tab.set_default_timeout(timeout);

        self.tab
            .navigate_to(url)
            .map_err(|e| BrowserError::NavigationError(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::NavigationError(format!("Navigation timeout for {}: {}", url, e)))?;

        Ok(())
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }

    fn wait_visible(&mut self, locator: &Locator, timeout: Duration) -> Result<(), BrowserError> {
        let script = format!(
            "(() => {{ const el = {}; return !!el && !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length); }})()",
            Self::element_expr(locator)?
        );
        self.poll_until(&script, &locator.to_string(), timeout)
    }

    fn wait_for_idle(&mut self, quiet: Duration, timeout: Duration) -> Result<(), BrowserError> {
        let start = Instant::now();
        let mut last_snapshot: Option<String> = None;
        let mut stable_since = Instant::now();

        loop {
            if start.elapsed() > timeout {
                return Err(BrowserError::Timeout("page quiescence".to_string()));
            }

            let ready = self
                .eval_bool("document.readyState === 'complete'")
                .unwrap_or(false);

            if ready {
                if let Ok(snapshot) = self.tab.get_content() {
                    if last_snapshot.as_deref() == Some(snapshot.as_str()) {
                        if stable_since.elapsed() >= quiet {
                            return Ok(());
                        }
                    } else {
                        last_snapshot = Some(snapshot);
                        stable_since = Instant::now();
                    }
                }
            } else {
                last_snapshot = None;
            }

            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn fill(&mut self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        let body = format!(
            "el.focus(); el.value = {}; el.dispatchEvent(new Event('input', {{ bubbles: true }})); el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true;",
            js_string(value)?
        );
        self.with_element(locator, &body)
    }

    fn select_option(&mut self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        let value = js_string(value)?;
        let body = format!(
            "el.value = {value}; el.dispatchEvent(new Event('change', {{ bubbles: true }})); return el.value === {value};",
            value = value
        );
        self.with_element(locator, &body)
    }

    fn click(&mut self, locator: &Locator) -> Result<(), BrowserError> {
        self.with_element(locator, "el.click(); return true;")
    }

    fn follow(&mut self, locator: &Locator, timeout: Duration) -> Result<(), BrowserError> {
        let body = format!("window.{} = true; el.click(); return true;", STALE_MARKER);
        self.with_element(locator, &body)?;

        let fresh = format!(
            "typeof window.{} === 'undefined' && document.readyState === 'complete'",
            STALE_MARKER
        );
        self.poll_until(&fresh, &format!("page transition after {}", locator), timeout)
    }

    fn content(&self) -> Result<String, BrowserError> {
        self.tab
            .get_content()
            .map_err(|e| BrowserError::HtmlExtractionError(e.to_string()))
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.tab
            .close(false)
            .map(|_| ())
            .map_err(|e| BrowserError::JavaScriptError(format!("Failed to close tab: {}", e)))
    }
}

/// Encode a Rust string as a JavaScript string literal
fn js_string(s: &str) -> Result<String, BrowserError> {
    serde_json::to_string(s).map_err(|e| BrowserError::JavaScriptError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes_quotes() {
        assert_eq!(js_string("a'b\"c").unwrap(), r#""a'b\"c""#);
    }

    #[test]
    fn test_element_expr_with_text() {
        let expr = BrowserScraper::element_expr(&Locator::exact_text("th", "Device")).unwrap();
        assert!(expr.contains(r#"querySelectorAll("th")"#));
        assert!(expr.contains(r#""Device" === null"#));
    }

    #[test]
    fn test_element_expr_without_text() {
        let expr = BrowserScraper::element_expr(&Locator::css("input[name=devicename]")).unwrap();
        assert!(expr.contains("null === null"));
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_basic_navigation() {
        let mut session = BrowserScraper::launch(BrowserConfig::default()).unwrap();
        assert!(session
            .navigate("https://example.com", Duration::from_secs(30))
            .is_ok());
        assert!(session.current_url().starts_with("https://example.com"));
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_wait_visible_and_read() {
        let mut session = BrowserScraper::launch(BrowserConfig::default()).unwrap();
        session
            .navigate("https://example.com", Duration::from_secs(30))
            .unwrap();
        session
            .wait_visible(&Locator::css("h1"), Duration::from_secs(10))
            .unwrap();
        let heading = session.read_text(&Locator::css("h1")).unwrap();
        assert_eq!(heading.as_deref(), Some("Example Domain"));
        session.close().unwrap();
    }
}
