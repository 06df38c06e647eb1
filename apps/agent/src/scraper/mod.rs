//! Job-scraping collaborator.
//!
//! The boards themselves are never scraped here — that capability lives in an
//! external JobSpy-compatible HTTP service. This module owns the request
//! shape, the fixed scrape configuration, and the `JobScraper` seam the
//! collector is written against.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::RawListing;
use crate::queries::SearchQuery;

/// Boards queried on every run.
pub const SCRAPE_SITES: [&str; 2] = ["linkedin", "indeed"];
/// Result cap per query.
pub const RESULTS_WANTED: u32 = 5;
/// Recency window, in hours.
pub const HOURS_OLD: u32 = 72;
/// Country context for the Indeed board.
pub const INDEED_COUNTRY: &str = "India";

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Scraper API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// One scrape call's parameters, serialized as the scraping service expects.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeRequest {
    pub site_name: Vec<String>,
    pub search_term: String,
    pub location: String,
    pub results_wanted: u32,
    pub hours_old: u32,
    pub country_indeed: String,
}

impl ScrapeRequest {
    /// The standard request for one search query: both boards, capped
    /// results, 72-hour window.
    pub fn for_query(query: &SearchQuery) -> Self {
        Self {
            site_name: SCRAPE_SITES.iter().map(|s| s.to_string()).collect(),
            search_term: query.role.clone(),
            location: query.location.clone(),
            results_wanted: RESULTS_WANTED,
            hours_old: HOURS_OLD,
            country_indeed: INDEED_COUNTRY.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    jobs: Vec<RawListing>,
}

/// The scraping capability the collector depends on.
#[async_trait]
pub trait JobScraper: Send + Sync {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<RawListing>, ScrapeError>;
}

/// `JobScraper` backed by a JobSpy-compatible HTTP sidecar.
pub struct HttpScraper {
    client: reqwest::Client,
    base_url: String,
}

impl HttpScraper {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
        }
    }
}

#[async_trait]
impl JobScraper for HttpScraper {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<RawListing>, ScrapeError> {
        let url = format!("{}/api/v1/search_jobs", self.base_url.trim_end_matches('/'));
        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ScrapeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ScrapeResponse = response.json().await?;
        Ok(body.jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_query_uses_fixed_scrape_configuration() {
        let query = SearchQuery {
            role: "Data Scientist".to_string(),
            location: "India".to_string(),
        };
        let request = ScrapeRequest::for_query(&query);

        assert_eq!(request.site_name, vec!["linkedin", "indeed"]);
        assert_eq!(request.search_term, "Data Scientist");
        assert_eq!(request.location, "India");
        assert_eq!(request.results_wanted, RESULTS_WANTED);
        assert_eq!(request.hours_old, HOURS_OLD);
        assert_eq!(request.country_indeed, INDEED_COUNTRY);
    }

    #[test]
    fn test_scrape_response_tolerates_missing_jobs_field() {
        let body: ScrapeResponse = serde_json::from_str("{}").unwrap();
        assert!(body.jobs.is_empty());
    }

    #[test]
    fn test_scrape_request_serializes_expected_shape() {
        let query = SearchQuery {
            role: "ML Engineer".to_string(),
            location: "Remote".to_string(),
        };
        let value = serde_json::to_value(ScrapeRequest::for_query(&query)).unwrap();
        assert_eq!(value["site_name"][0], "linkedin");
        assert_eq!(value["results_wanted"], 5);
        assert_eq!(value["hours_old"], 72);
    }
}
