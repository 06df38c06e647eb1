//! Listing records and the job-table column layout.

use serde::Deserialize;

/// Column order of the job table. Row 0 of the sheet is exactly this header.
pub const SHEET_COLUMNS: [&str; 7] = [
    "site",
    "title",
    "company",
    "location",
    "date_posted",
    "apply_link",
    "Applied?",
];

/// Fixed ordinal of the `apply_link` column — the dedup key for the table's lifetime.
pub const APPLY_LINK_COL: usize = 5;

/// Fixed ordinal of the `Applied?` checkbox column.
pub const APPLIED_COL: usize = 6;

/// One scraped posting as the scraping collaborator returns it.
/// Every field is optional; boards differ in what they expose.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListing {
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date_posted: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub job_url_direct: Option<String>,
}

impl RawListing {
    /// Derives the canonical apply link: the direct-application URL when the
    /// board exposes one, else the board's own listing URL.
    /// A listing with neither is unusable (nothing to dedup or apply to) and
    /// is dropped here.
    pub fn normalize(self) -> Option<JobListing> {
        let apply_link = [&self.job_url_direct, &self.job_url]
            .into_iter()
            .flatten()
            .map(|url| url.trim())
            .find(|url| !url.is_empty())?
            .to_string();

        Some(JobListing {
            site: self.site,
            title: self.title,
            company: self.company,
            location: self.location,
            date_posted: self.date_posted,
            apply_link,
        })
    }
}

/// A normalized posting flowing through the pipeline.
#[derive(Debug, Clone)]
pub struct JobListing {
    pub site: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub date_posted: Option<String>,
    /// Never empty. See [`RawListing::normalize`].
    pub apply_link: String,
}

impl JobListing {
    /// Coerces the listing to text cells in sheet column order,
    /// without the trailing `Applied?` cell.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.site.clone().unwrap_or_default(),
            self.title.clone().unwrap_or_default(),
            self.company.clone().unwrap_or_default(),
            self.location.clone().unwrap_or_default(),
            self.date_posted.clone().unwrap_or_default(),
            self.apply_link.clone(),
        ]
    }
}
