pub mod law;

use std::sync::Arc;

use handle_errors::return_error;
use senado_scraper::LawScraper;
use warp::{http::Method, Filter, Rejection, Reply};

pub fn routes(
    scraper: Arc<LawScraper>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let scraper_filter = warp::any().map(move || scraper.clone());

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["Content-Type"])
        .allow_methods(vec![Method::GET]);

    let get_laws = warp::get()
        .and(warp::path("laws"))
        .and(warp::path::end())
        .and(scraper_filter)
        .and_then(law::get_laws)
        .with(warp::trace(|info| {
            tracing::info_span!(
                "get_laws request",
                method = %info.method(),
                path = %info.path(),
                id = %uuid::Uuid::new_v4(),
            )
        }));

    get_laws
        .with(warp::trace::request())
        .with(cors)
        .recover(return_error)
}
