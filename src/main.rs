mod routes;

use std::sync::Arc;

use config::{Config, ConfigError};
use senado_scraper::{LawScraper, SITE_ORIGIN};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Args {
    log_level: String,
    port: u16,
    source_url: Option<String>,
}

/// `setup.toml` is optional; `SENADO_*` environment variables override it.
fn load_args() -> Result<Args, ConfigError> {
    Config::builder()
        .set_default("log_level", "info")?
        .set_default("port", 8080)?
        .add_source(config::File::with_name("setup").required(false))
        .add_source(config::Environment::with_prefix("SENADO").try_parsing(true))
        .build()?
        .try_deserialize::<Args>()
}

#[tokio::main]
async fn main() -> Result<(), handle_errors::Error> {
    let config = load_args().map_err(handle_errors::Error::ConfigError)?;

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        format!(
            "handle_errors={},senado_scraper={},senado_law_web={},warp={}",
            config.log_level, config.log_level, config.log_level, config.log_level
        )
    });

    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let scraper = match config.source_url {
        Some(url) => LawScraper::with_source(url, SITE_ORIGIN),
        None => LawScraper::new(),
    };
    info!("serving laws from {} on port {}", scraper.source(), config.port);

    warp::serve(routes::routes(Arc::new(scraper)))
        .run(([0, 0, 0, 0], config.port))
        .await;

    Ok(())
}
