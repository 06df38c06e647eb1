//! Experience Filter — rejects listings aimed at experienced/leadership roles.

use std::sync::OnceLock;

use regex::{RegexSet, RegexSetBuilder};
use tracing::info;

use crate::models::JobListing;

/// Title patterns that signal a senior/leadership role, matched
/// case-insensitively. Whole words only: "Team Leader" stays, "Lead Engineer"
/// goes. The last pattern catches explicit experience floors of 5+ years.
pub const SENIOR_PATTERNS: [&str; 9] = [
    r"\bsenior\b",
    r"\blead\b",
    r"\bmanager\b",
    r"\bprincipal\b",
    r"\barchitect\b",
    r"\bhead\b",
    r"\bdirector\b",
    r"\bvp\b",
    r"\b(?:[5-9]|\d{2,})\+\s*years",
];

fn senior_matcher() -> &'static RegexSet {
    static MATCHER: OnceLock<RegexSet> = OnceLock::new();
    MATCHER.get_or_init(|| {
        RegexSetBuilder::new(SENIOR_PATTERNS)
            .case_insensitive(true)
            .build()
            .expect("seniority patterns are valid regexes")
    })
}

/// Removes every listing whose title matches a seniority pattern. Pure and
/// order-preserving. A missing title says nothing about seniority, so those
/// listings are kept.
pub fn filter_senior(listings: Vec<JobListing>) -> Vec<JobListing> {
    if listings.is_empty() {
        return listings;
    }

    let initial = listings.len();
    let kept: Vec<JobListing> = listings
        .into_iter()
        .filter(|listing| match listing.title.as_deref() {
            Some(title) => !senior_matcher().is_match(title),
            None => true,
        })
        .collect();

    info!("Filtered {} senior-level roles.", initial - kept.len());
    kept
}
