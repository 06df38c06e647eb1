mod collector;
mod config;
mod errors;
mod filter;
mod llm_client;
mod models;
mod queries;
mod resume;
mod retry;
mod scraper;
mod sheets;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::collector::collect;
use crate::config::Config;
use crate::filter::filter_senior;
use crate::llm_client::LlmClient;
use crate::queries::generate_queries;
use crate::scraper::HttpScraper;
use crate::sheets::formatting::{CosmeticFormatter, GridFormatter, NoFormatting};
use crate::sheets::writer::SheetWriter;
use crate::sheets::GoogleSheetsConnector;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job search agent v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(config.gemini_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let scraper = HttpScraper::new(config.scraper_url.clone());

    // 1. Search terms — AI-generated from the resume, or the fixed fallback.
    let search_queries = generate_queries(&config, &llm).await;
    info!("Search queries: {search_queries:?}");

    // 2–3. Scrape every query, then drop senior-level roles.
    let listings = collect(&scraper, &search_queries).await;
    let shortlisted = filter_senior(listings);

    // 4. Dedup-and-append into the job sheet.
    let formatter: Arc<dyn CosmeticFormatter> = if config.sheet_formatting {
        Arc::new(GridFormatter)
    } else {
        Arc::new(NoFormatting)
    };
    let connector = Arc::new(GoogleSheetsConnector::new(
        config.credentials_file.clone(),
        config.sheet_name.clone(),
    ));
    let writer = SheetWriter::new(connector, formatter);

    let outcome = writer.persist(&shortlisted).await;
    info!("Process completed: {outcome:?}");

    Ok(())
}
