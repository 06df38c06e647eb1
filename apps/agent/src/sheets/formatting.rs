//! Cosmetic formatting capability.
//!
//! Presentation never affects write outcomes, so it sits behind a trait with
//! a no-op implementation instead of conditional branches in the writer.
//! Selected once at startup via config.

use async_trait::async_trait;

use super::{SheetError, SheetStore};
use crate::models::APPLIED_COL;

#[async_trait]
pub trait CosmeticFormatter: Send + Sync {
    /// Bold + freeze the header row.
    async fn style_header(&self, store: &dyn SheetStore, columns: usize) -> Result<(), SheetError>;

    /// Checkbox validation on the `Applied?` column for the given 1-based,
    /// inclusive row range.
    async fn applied_checkboxes(
        &self,
        store: &dyn SheetStore,
        first_row: usize,
        last_row: usize,
    ) -> Result<(), SheetError>;
}

/// Real formatting via the store's grid operations.
pub struct GridFormatter;

#[async_trait]
impl CosmeticFormatter for GridFormatter {
    async fn style_header(&self, store: &dyn SheetStore, columns: usize) -> Result<(), SheetError> {
        store.bold_freeze_header(columns).await
    }

    async fn applied_checkboxes(
        &self,
        store: &dyn SheetStore,
        first_row: usize,
        last_row: usize,
    ) -> Result<(), SheetError> {
        store.checkbox_validation(APPLIED_COL, first_row, last_row).await
    }
}

/// Formatting disabled: every operation succeeds without touching the sheet.
pub struct NoFormatting;

#[async_trait]
impl CosmeticFormatter for NoFormatting {
    async fn style_header(
        &self,
        _store: &dyn SheetStore,
        _columns: usize,
    ) -> Result<(), SheetError> {
        Ok(())
    }

    async fn applied_checkboxes(
        &self,
        _store: &dyn SheetStore,
        _first_row: usize,
        _last_row: usize,
    ) -> Result<(), SheetError> {
        Ok(())
    }
}
