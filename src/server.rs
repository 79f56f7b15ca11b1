use crate::app_state::AppState;
use crate::models::SearchQuery;
use crate::tplc::ScrapeError;
use actix_web::{get, web, HttpResponse, Responder};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;

/// Query string accepted by `GET /scrape`
#[derive(Debug, Deserialize)]
pub struct ScrapeParams {
    pub device_name: String,
    pub product_code: Option<String>,
    #[serde(alias = "min_report_year")]
    pub since: Option<i32>,
}

impl ScrapeParams {
    pub fn into_query(self) -> SearchQuery {
        let mut query = SearchQuery::new(self.device_name);
        query.product_code = self.product_code;
        if let Some(year) = self.since {
            query.min_report_year = year;
        }
        query
    }
}

#[get("/")]
async fn index(data: web::Data<AppState>) -> impl Responder {
    let limits = &data.config.scrape;
    HttpResponse::Ok().json(json!({
        "service": "tplc_scraper",
        "status": "ok",
        "headless": data.config.browser.headless,
        "max_pages": limits.max_pages,
        "detail_retries": limits.detail_retries,
    }))
}

#[get("/scrape")]
async fn scrape(data: web::Data<AppState>, params: web::Query<ScrapeParams>) -> impl Responder {
    let query = params.into_inner().into_query();
    info!(
        "Scrape request: device_name='{}' product_code={:?} since={}",
        query.device_name, query.product_code, query.min_report_year
    );

    let runner = data.runner.clone();
    match web::block(move || runner(query)).await {
        Ok(Ok(result)) => HttpResponse::Ok().json(result),
        Ok(Err(e)) => error_response(&e),
        Err(e) => {
            error!("Scrape task failed: {}", e);
            HttpResponse::InternalServerError()
                .json(json!({"status": "error", "message": "Scrape task failed"}))
        }
    }
}

fn error_response(e: &ScrapeError) -> HttpResponse {
    let body = json!({"status": "error", "message": e.to_string()});
    match e {
        ScrapeError::InvalidQuery(_) => {
            warn!("Rejected scrape request: {}", e);
            HttpResponse::BadRequest().json(body)
        }
        ScrapeError::Launch(_) => {
            error!("{}", e);
            HttpResponse::ServiceUnavailable().json(body)
        }
        ScrapeError::Navigation(_) | ScrapeError::SearchInputUnavailable { .. } => {
            error!("{}", e);
            HttpResponse::BadGateway().json(body)
        }
    }
}

/// Register the gateway routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index).service(scrape);
}
