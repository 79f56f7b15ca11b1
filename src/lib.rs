// Library interface for tplc_scraper
// The server binary and the integration tests both build on these modules.

pub mod app_state;
pub mod browser;
pub mod config;
pub mod helpers;
pub mod metrics;
pub mod models;
pub mod retry;
pub mod server;
pub mod tplc;
