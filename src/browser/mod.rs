//! Browser automation for the TPLC site
//!
//! The scraping pipeline only talks to the [`BrowserSession`] trait. The
//! headless Chrome implementation is [`BrowserScraper`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tplc_scraper::browser::{BrowserConfig, BrowserScraper, BrowserSession, Locator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = BrowserScraper::launch(BrowserConfig::default())?;
//!
//! session.navigate("https://example.com", Duration::from_secs(30))?;
//! session.wait_visible(&Locator::css("h1"), Duration::from_secs(10))?;
//! let heading = session.read_text(&Locator::css("h1"))?;
//!
//! println!("Heading: {:?}", heading);
//! session.close()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod manager;
pub mod scraper;
pub mod session;

// Re-export main types for convenience
pub use config::BrowserConfig;
pub use manager::{BrowserError, BrowserManager};
pub use scraper::BrowserScraper;
pub use session::{BrowserSession, Locator, SessionGuard};
