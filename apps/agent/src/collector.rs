//! Listing Collector — serialized scrape loop with per-query failure isolation.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::models::JobListing;
use crate::queries::SearchQuery;
use crate::scraper::{JobScraper, ScrapeRequest};

/// Politeness delay between consecutive scrape calls.
const SCRAPE_DELAY: Duration = Duration::from_secs(2);

/// Scrapes every query in order and concatenates the results. A failing
/// query is logged and skipped — it never aborts the remaining queries.
/// All queries failing yields an empty set, which downstream treats as a
/// normal terminal state.
pub async fn collect(scraper: &dyn JobScraper, queries: &[SearchQuery]) -> Vec<JobListing> {
    let mut all = Vec::new();

    for (i, query) in queries.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(SCRAPE_DELAY).await;
        }
        info!("Scraping: {} in {}", query.role, query.location);

        let request = ScrapeRequest::for_query(query);
        match scraper.scrape(&request).await {
            Ok(raw) => {
                let found = raw.len();
                let mut listings: Vec<JobListing> =
                    raw.into_iter().filter_map(|r| r.normalize()).collect();
                if listings.len() < found {
                    debug!(
                        "Dropped {} listings without any apply link",
                        found - listings.len()
                    );
                }
                all.append(&mut listings);
            }
            Err(e) => {
                warn!("Failed to scrape '{} | {}': {e}", query.role, query.location);
            }
        }
    }

    if all.is_empty() {
        info!("No listings collected across {} queries.", queries.len());
    }
    all
}
