use std::sync::Arc;

use senado_scraper::LawScraper;
use tracing::{info, instrument};

#[instrument(skip(scraper))]
pub async fn get_laws(scraper: Arc<LawScraper>) -> Result<impl warp::Reply, warp::Rejection> {
    let laws = scraper.scrape().await;
    info!("{} laws scraped from {}", laws.len(), scraper.source());
    Ok(warp::reply::json(&laws))
}
