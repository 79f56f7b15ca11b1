use actix_web::{web, App, HttpServer};
use log::{error, info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use tplc_scraper::app_state::AppState;
use tplc_scraper::config::Config;
use tplc_scraper::server;

const LOG_CONFIG_PATH: &str = "log4rs.yml";

/// Initialize log4rs from `log4rs.yml`, or log to the console at info level
fn init_logging() {
    let Err(file_err) = log4rs::init_file(LOG_CONFIG_PATH, Default::default()) else {
        return;
    };

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}",
        )))
        .build();

    let fallback = log4rs::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));

    match fallback.map(log4rs::init_config) {
        Ok(Ok(_)) => log::warn!("{} not loaded ({}); logging to console", LOG_CONFIG_PATH, file_err),
        Ok(Err(e)) => eprintln!("Failed to install logger: {}", e),
        Err(e) => eprintln!("Invalid fallback logging config: {}", e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let cfg = Config::load();

    info!("TPLC scraper starting:");
    info!("  Headless browser: {}", cfg.browser.headless);
    info!("  Initial load timeout: {}s", cfg.scrape.initial_load_timeout_secs);
    info!("  Element timeout: {}s", cfg.scrape.element_timeout_secs);
    info!("  Results page cap: {}", cfg.scrape.max_pages);

    let server_cfg = cfg.server.clone();
    let data = web::Data::new(AppState::with_chrome(cfg));

    // Try to bind to an available port starting at the configured one
    let first_port = server_cfg.port;
    let last_port = first_port.saturating_add(server_cfg.port_attempts.saturating_sub(1));
    let mut last_err: Option<std::io::Error> = None;
    for port in first_port..=last_port {
        let data_clone = data.clone();
        let addr = format!("{}:{}", server_cfg.host, port);
        match HttpServer::new(move || {
            App::new()
                .app_data(data_clone.clone())
                .configure(server::configure)
        })
        .bind(&addr)
        {
            Ok(server) => {
                info!("Listening on {}", addr);
                return server.run().await;
            }
            Err(e) => {
                error!("Could not bind {}: {}", addr, e);
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            format!("No available ports {}-{}", first_port, last_port),
        )
    }))
}
