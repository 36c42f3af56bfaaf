use senado_scraper::scrape_laws;

#[tokio::main]
async fn main() -> Result<(), handle_errors::Error> {
    let log_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "senado_scraper=info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_writer(std::io::stderr)
        .init();

    let laws = scrape_laws().await;
    let json =
        serde_json::to_string_pretty(&laws).map_err(handle_errors::Error::SerializationError)?;
    println!("{}", json);

    Ok(())
}
