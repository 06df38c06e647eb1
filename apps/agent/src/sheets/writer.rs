//! Sheet Writer — dedup-and-append of scraped listings into the job table.
//!
//! The only stateful, failure-sensitive piece of the pipeline: connect with
//! bounded retry, lazy header initialization, dedup by apply link, one bulk
//! append, cosmetic formatting that can never change the outcome.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use super::formatting::CosmeticFormatter;
use super::SheetConnector;
use crate::models::{JobListing, APPLY_LINK_COL, SHEET_COLUMNS};
use crate::retry::{with_retry, RetryPolicy};

/// Connect-and-locate is the one retried external call: 3 attempts, 5 s apart.
const CONNECT_ATTEMPTS: u32 = 3;
const CONNECT_DELAY: Duration = Duration::from_secs(5);

/// Where one `persist` call ended up. Failures are outcomes, not errors —
/// they are reported and the run moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Nothing to save; no network calls were made.
    Skipped,
    /// This many new rows were appended.
    Written(usize),
    /// Every incoming listing was already in the table.
    DeduplicatedAll,
    /// Connect-and-locate failed after exhausting retries.
    ConnectFailed,
    /// Existing rows could not be read.
    ReadFailed,
    /// The header or data append failed. Rows committed by earlier calls stand.
    WriteFailed,
}

pub struct SheetWriter {
    connector: Arc<dyn SheetConnector>,
    formatter: Arc<dyn CosmeticFormatter>,
    retry: RetryPolicy,
}

impl SheetWriter {
    pub fn new(connector: Arc<dyn SheetConnector>, formatter: Arc<dyn CosmeticFormatter>) -> Self {
        Self {
            connector,
            formatter,
            retry: RetryPolicy::new(CONNECT_ATTEMPTS, CONNECT_DELAY),
        }
    }

    #[cfg(test)]
    fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Appends the listings that are not yet in the table.
    pub async fn persist(&self, listings: &[JobListing]) -> PersistOutcome {
        if listings.is_empty() {
            info!("No jobs found to save.");
            return PersistOutcome::Skipped;
        }

        let store = match with_retry(&self.retry, "Sheet connect", || self.connector.connect()).await
        {
            Ok(store) => store,
            Err(e) => {
                error!(
                    "Sheet connection failed after {} attempts: {e}",
                    self.retry.max_attempts
                );
                return PersistOutcome::ConnectFailed;
            }
        };

        let rows = match store.read_all().await {
            Ok(rows) => rows,
            Err(e) => {
                error!("Error reading existing data: {e}");
                return PersistOutcome::ReadFailed;
            }
        };

        let mut rows_before = rows.len();
        let existing_links: HashSet<String> = if rows.is_empty() {
            // Uninitialized table: write the header before any data rows.
            let header: Vec<String> = SHEET_COLUMNS.iter().map(|c| c.to_string()).collect();
            if let Err(e) = store.append_rows(vec![header]).await {
                error!("Failed to write header row: {e}");
                return PersistOutcome::WriteFailed;
            }
            rows_before = 1;
            if let Err(e) = self
                .formatter
                .style_header(store.as_ref(), SHEET_COLUMNS.len())
                .await
            {
                warn!("Header formatting skipped: {e}");
            }
            HashSet::new()
        } else {
            rows.iter()
                .skip(1)
                .filter_map(|row| row.get(APPLY_LINK_COL))
                .filter(|link| !link.is_empty())
                .cloned()
                .collect()
        };

        let fresh: Vec<&JobListing> = listings
            .iter()
            .filter(|listing| !existing_links.contains(&listing.apply_link))
            .collect();

        if fresh.is_empty() {
            info!("All {} jobs already exist in the sheet.", listings.len());
            return PersistOutcome::DeduplicatedAll;
        }
        let duplicates = listings.len() - fresh.len();
        if duplicates > 0 {
            info!("Skipping {duplicates} already-saved jobs.");
        }

        let new_rows: Vec<Vec<String>> = fresh
            .iter()
            .map(|listing| {
                let mut row = listing.to_row();
                row.push("FALSE".to_string());
                row
            })
            .collect();
        let written = new_rows.len();

        if let Err(e) = store.append_rows(new_rows).await {
            error!("Failed to append data: {e}");
            return PersistOutcome::WriteFailed;
        }
        info!("Successfully appended {written} new jobs.");

        // The appended range, in 1-based sheet rows.
        let first_row = rows_before + 1;
        let last_row = rows_before + written;
        if let Err(e) = self
            .formatter
            .applied_checkboxes(store.as_ref(), first_row, last_row)
            .await
        {
            warn!("Checkbox formatting skipped: {e}");
        }

        PersistOutcome::Written(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::models::{RawListing, APPLIED_COL};
    use crate::sheets::formatting::{GridFormatter, NoFormatting};
    use crate::sheets::{SheetError, SheetStore};

    #[derive(Default)]
    struct FakeSheet {
        rows: Mutex<Vec<Vec<String>>>,
        fail_reads: AtomicBool,
        fail_appends: AtomicBool,
        fail_formatting: AtomicBool,
        format_calls: AtomicU32,
        checkbox_ranges: Mutex<Vec<(usize, usize, usize)>>,
    }

    impl FakeSheet {
        fn rows(&self) -> Vec<Vec<String>> {
            self.rows.lock().unwrap().clone()
        }

        fn seed_header_and(&self, links: &[&str]) {
            let mut rows = self.rows.lock().unwrap();
            rows.push(SHEET_COLUMNS.iter().map(|c| c.to_string()).collect());
            for link in links {
                let mut row = vec![String::new(); APPLY_LINK_COL];
                row.push(link.to_string());
                row.push("FALSE".to_string());
                rows.push(row);
            }
        }
    }

    fn api_err(what: &str) -> SheetError {
        SheetError::Api {
            status: 500,
            message: format!("{what} unavailable"),
        }
    }

    struct FakeStore(Arc<FakeSheet>);

    #[async_trait]
    impl SheetStore for FakeStore {
        async fn read_all(&self) -> Result<Vec<Vec<String>>, SheetError> {
            if self.0.fail_reads.load(Ordering::SeqCst) {
                return Err(api_err("read"));
            }
            Ok(self.0.rows())
        }

        async fn append_rows(&self, rows: Vec<Vec<String>>) -> Result<(), SheetError> {
            if self.0.fail_appends.load(Ordering::SeqCst) {
                return Err(api_err("append"));
            }
            self.0.rows.lock().unwrap().extend(rows);
            Ok(())
        }

        async fn bold_freeze_header(&self, _columns: usize) -> Result<(), SheetError> {
            self.0.format_calls.fetch_add(1, Ordering::SeqCst);
            if self.0.fail_formatting.load(Ordering::SeqCst) {
                return Err(api_err("format"));
            }
            Ok(())
        }

        async fn checkbox_validation(
            &self,
            column: usize,
            first_row: usize,
            last_row: usize,
        ) -> Result<(), SheetError> {
            self.0.format_calls.fetch_add(1, Ordering::SeqCst);
            if self.0.fail_formatting.load(Ordering::SeqCst) {
                return Err(api_err("format"));
            }
            self.0
                .checkbox_ranges
                .lock()
                .unwrap()
                .push((column, first_row, last_row));
            Ok(())
        }
    }

    struct FakeConnector {
        sheet: Arc<FakeSheet>,
        failures_before_success: AtomicU32,
        attempts: AtomicU32,
    }

    impl FakeConnector {
        fn new(sheet: Arc<FakeSheet>) -> Self {
            Self {
                sheet,
                failures_before_success: AtomicU32::new(0),
                attempts: AtomicU32::new(0),
            }
        }

        fn failing(sheet: Arc<FakeSheet>, failures: u32) -> Self {
            let connector = Self::new(sheet);
            connector.failures_before_success.store(failures, Ordering::SeqCst);
            connector
        }
    }

    #[async_trait]
    impl SheetConnector for FakeConnector {
        async fn connect(&self) -> Result<Box<dyn SheetStore>, SheetError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.failures_before_success.load(Ordering::SeqCst) > 0 {
                self.failures_before_success.fetch_sub(1, Ordering::SeqCst);
                return Err(api_err("connect"));
            }
            Ok(Box::new(FakeStore(self.sheet.clone())))
        }
    }

    fn listing(link: &str) -> JobListing {
        RawListing {
            title: Some("Data Scientist".to_string()),
            job_url: Some(link.to_string()),
            ..Default::default()
        }
        .normalize()
        .unwrap()
    }

    fn writer(connector: Arc<FakeConnector>) -> SheetWriter {
        SheetWriter::new(connector, Arc::new(GridFormatter))
            .with_retry_policy(RetryPolicy::new(CONNECT_ATTEMPTS, Duration::ZERO))
    }

    #[tokio::test]
    async fn test_empty_input_is_skipped_without_connecting() {
        let sheet = Arc::new(FakeSheet::default());
        let connector = Arc::new(FakeConnector::new(sheet));

        let outcome = writer(connector.clone()).persist(&[]).await;

        assert_eq!(outcome, PersistOutcome::Skipped);
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fresh_sheet_gets_header_then_rows() {
        let sheet = Arc::new(FakeSheet::default());
        let connector = Arc::new(FakeConnector::new(sheet.clone()));

        let outcome = writer(connector)
            .persist(&[listing("https://a"), listing("https://b")])
            .await;

        assert_eq!(outcome, PersistOutcome::Written(2));
        let rows = sheet.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], SHEET_COLUMNS.to_vec());
        assert_eq!(rows[1][APPLY_LINK_COL], "https://a");
        assert_eq!(rows[1][APPLIED_COL], "FALSE");
        assert_eq!(rows[2][APPLY_LINK_COL], "https://b");
    }

    #[tokio::test]
    async fn test_persist_is_idempotent() {
        let sheet = Arc::new(FakeSheet::default());
        let batch = [listing("https://a"), listing("https://b")];

        let first = writer(Arc::new(FakeConnector::new(sheet.clone())))
            .persist(&batch)
            .await;
        let rows_after_first = sheet.rows();
        let second = writer(Arc::new(FakeConnector::new(sheet.clone())))
            .persist(&batch)
            .await;

        assert_eq!(first, PersistOutcome::Written(2));
        assert_eq!(second, PersistOutcome::DeduplicatedAll);
        assert_eq!(sheet.rows(), rows_after_first);
    }

    #[tokio::test]
    async fn test_only_new_links_are_appended() {
        let sheet = Arc::new(FakeSheet::default());
        sheet.seed_header_and(&["https://a"]);
        let connector = Arc::new(FakeConnector::new(sheet.clone()));

        let outcome = writer(connector)
            .persist(&[listing("https://a"), listing("https://b")])
            .await;

        assert_eq!(outcome, PersistOutcome::Written(1));
        let rows = sheet.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][APPLY_LINK_COL], "https://b");
    }

    #[tokio::test]
    async fn test_header_only_sheet_is_not_reinitialized() {
        let sheet = Arc::new(FakeSheet::default());
        sheet.seed_header_and(&[]);
        let connector = Arc::new(FakeConnector::new(sheet.clone()));

        let outcome = writer(connector).persist(&[listing("https://a")]).await;

        assert_eq!(outcome, PersistOutcome::Written(1));
        let rows = sheet.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], SHEET_COLUMNS.to_vec());
    }

    #[tokio::test]
    async fn test_connect_recovers_within_allowed_attempts() {
        let sheet = Arc::new(FakeSheet::default());
        let connector = Arc::new(FakeConnector::failing(sheet.clone(), 2));

        let outcome = writer(connector.clone()).persist(&[listing("https://a")]).await;

        assert_eq!(outcome, PersistOutcome::Written(1));
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_connect_exhaustion_stops_the_run() {
        let sheet = Arc::new(FakeSheet::default());
        // Reads would fail loudly if reached; ConnectFailed proves they never are.
        sheet.fail_reads.store(true, Ordering::SeqCst);
        let connector = Arc::new(FakeConnector::failing(sheet.clone(), 3));

        let outcome = writer(connector.clone()).persist(&[listing("https://a")]).await;

        assert_eq!(outcome, PersistOutcome::ConnectFailed);
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 3);
        assert!(sheet.rows().is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_is_terminal() {
        let sheet = Arc::new(FakeSheet::default());
        sheet.fail_reads.store(true, Ordering::SeqCst);
        let connector = Arc::new(FakeConnector::new(sheet.clone()));

        let outcome = writer(connector).persist(&[listing("https://a")]).await;

        assert_eq!(outcome, PersistOutcome::ReadFailed);
        assert!(sheet.rows().is_empty());
    }

    #[tokio::test]
    async fn test_header_write_failure_is_write_failed() {
        let sheet = Arc::new(FakeSheet::default());
        sheet.fail_appends.store(true, Ordering::SeqCst);
        let connector = Arc::new(FakeConnector::new(sheet.clone()));

        let outcome = writer(connector).persist(&[listing("https://a")]).await;

        assert_eq!(outcome, PersistOutcome::WriteFailed);
        assert!(sheet.rows().is_empty());
    }

    #[tokio::test]
    async fn test_append_failure_leaves_existing_rows_intact() {
        let sheet = Arc::new(FakeSheet::default());
        sheet.seed_header_and(&["https://a"]);
        let before = sheet.rows();
        sheet.fail_appends.store(true, Ordering::SeqCst);
        let connector = Arc::new(FakeConnector::new(sheet.clone()));

        let outcome = writer(connector).persist(&[listing("https://b")]).await;

        assert_eq!(outcome, PersistOutcome::WriteFailed);
        assert_eq!(sheet.rows(), before);
    }

    #[tokio::test]
    async fn test_formatting_failure_never_changes_the_outcome() {
        let sheet = Arc::new(FakeSheet::default());
        sheet.fail_formatting.store(true, Ordering::SeqCst);
        let connector = Arc::new(FakeConnector::new(sheet.clone()));

        let outcome = writer(connector).persist(&[listing("https://a")]).await;

        assert_eq!(outcome, PersistOutcome::Written(1));
        assert_eq!(sheet.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_noop_formatter_makes_no_grid_calls() {
        let sheet = Arc::new(FakeSheet::default());
        let connector = Arc::new(FakeConnector::new(sheet.clone()));
        let writer = SheetWriter::new(connector, Arc::new(NoFormatting))
            .with_retry_policy(RetryPolicy::new(CONNECT_ATTEMPTS, Duration::ZERO));

        let outcome = writer.persist(&[listing("https://a")]).await;

        assert_eq!(outcome, PersistOutcome::Written(1));
        assert_eq!(sheet.format_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_checkbox_range_covers_exactly_the_new_rows() {
        let sheet = Arc::new(FakeSheet::default());
        sheet.seed_header_and(&["https://a", "https://b"]);
        let connector = Arc::new(FakeConnector::new(sheet.clone()));

        let outcome = writer(connector)
            .persist(&[listing("https://c"), listing("https://d")])
            .await;

        assert_eq!(outcome, PersistOutcome::Written(2));
        // 3 rows before the append, so the new rows are sheet rows 4..=5.
        let ranges = sheet.checkbox_ranges.lock().unwrap().clone();
        assert_eq!(ranges, vec![(APPLIED_COL, 4, 5)]);
    }

    #[tokio::test]
    async fn test_blank_link_cells_never_enter_the_dedup_set() {
        let sheet = Arc::new(FakeSheet::default());
        sheet.seed_header_and(&[""]);
        let connector = Arc::new(FakeConnector::new(sheet.clone()));

        let outcome = writer(connector).persist(&[listing("https://a")]).await;

        // The blank cell must not dedup anything away.
        assert_eq!(outcome, PersistOutcome::Written(1));
    }
}
