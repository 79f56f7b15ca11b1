use super::manager::BrowserError;
use crate::helpers::element_text;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

/// Identifies elements on a page: a CSS selector, optionally narrowed to
/// elements whose whitespace-normalized text equals `text` exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    css: String,
    text: Option<String>,
}

impl Locator {
    pub fn css(css: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            text: None,
        }
    }

    pub fn exact_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            text: Some(text.into()),
        }
    }

    pub fn css_selector(&self) -> &str {
        &self.css
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// All matching elements of a parsed document, in document order
    pub fn find_in<'a>(&self, document: &'a Html) -> Result<Vec<ElementRef<'a>>, BrowserError> {
        let selector = Selector::parse(&self.css)
            .map_err(|e| BrowserError::InvalidSelector(format!("{}: {:?}", self.css, e)))?;

        Ok(document
            .select(&selector)
            .filter(|el| match &self.text {
                Some(text) => element_text(el) == *text,
                None => true,
            })
            .collect())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{} with text {:?}", self.css, text),
            None => f.write_str(&self.css),
        }
    }
}

/// The browser capabilities the scraping pipeline relies on.
///
/// Element lookups are expressed with [`Locator`]; reads go through the
/// rendered HTML so that extraction code only ever sees page content.
pub trait BrowserSession {
    /// Load `url` and wait for the navigation to commit
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    fn current_url(&self) -> String;

    /// Wait until an element matching `locator` is visible
    fn wait_visible(&mut self, locator: &Locator, timeout: Duration) -> Result<(), BrowserError>;

    /// Wait until the document is loaded and its content stops changing for `quiet`
    fn wait_for_idle(&mut self, quiet: Duration, timeout: Duration) -> Result<(), BrowserError>;

    fn fill(&mut self, locator: &Locator, value: &str) -> Result<(), BrowserError>;

    fn select_option(&mut self, locator: &Locator, value: &str) -> Result<(), BrowserError>;

    fn click(&mut self, locator: &Locator) -> Result<(), BrowserError>;

    /// Activate a control that replaces the current document, and wait until
    /// the old document is gone and the new one has loaded
    fn follow(&mut self, locator: &Locator, timeout: Duration) -> Result<(), BrowserError>;

    /// Rendered HTML of the current document
    fn content(&self) -> Result<String, BrowserError>;

    /// Release the underlying browser resources. Must be safe to call twice.
    fn close(&mut self) -> Result<(), BrowserError>;

    fn document(&self) -> Result<Html, BrowserError> {
        Ok(Html::parse_document(&self.content()?))
    }

    fn exists(&self, locator: &Locator) -> Result<bool, BrowserError> {
        let document = self.document()?;
        Ok(!locator.find_in(&document)?.is_empty())
    }

    /// Text of the first matching element
    fn read_text(&self, locator: &Locator) -> Result<Option<String>, BrowserError> {
        let document = self.document()?;
        Ok(locator.find_in(&document)?.first().map(element_text))
    }

    /// Attribute values of every matching element that carries `attr`
    fn read_attributes(&self, locator: &Locator, attr: &str) -> Result<Vec<String>, BrowserError> {
        let document = self.document()?;
        Ok(locator
            .find_in(&document)?
            .iter()
            .filter_map(|el| el.value().attr(attr).map(str::to_string))
            .collect())
    }
}

/// Closes the wrapped session when dropped, on every exit path
pub struct SessionGuard<S: BrowserSession> {
    session: S,
}

impl<S: BrowserSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: BrowserSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: BrowserSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: BrowserSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        log::info!("Closing browser.");
        if let Err(e) = self.session.close() {
            log::warn!("Failed to close browser session: {}", e);
        }
    }
}
