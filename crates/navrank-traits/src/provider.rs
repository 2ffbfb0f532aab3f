//! Collaborator traits consumed by the scoring pipelines.
//!
//! The engine only ever talks to upstream data through these traits. HTTP
//! adapters live in `navrank-mfapi`; tests use in-memory implementations.
//! All traits are object safe so pipelines can hold `Arc<dyn ...>` handles
//! and share them across spawned tasks.

use async_trait::async_trait;

use crate::{
    Result,
    types::{DateRange, FundMetadata, PriceHistory, SchemeCode, SchemeRef},
};

/// Paginated listing of the scheme universe.
///
/// Callers request pages of `limit` entries starting at `offset` and stop at
/// the first page shorter than `limit`.
#[async_trait]
pub trait SchemeDirectory: Send + Sync {
    /// Returns one page of schemes.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be reached. Pipelines treat
    /// this as fatal for the whole run.
    async fn list_schemes(&self, offset: usize, limit: usize) -> Result<Vec<SchemeRef>>;
}

/// Source of raw NAV histories.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Fetches the history for `code`, optionally narrowed to `range`.
    ///
    /// `Ok(None)` means the instrument has no data (unlisted, delisted, empty
    /// payload); it is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or decoding failures.
    async fn get_history(
        &self,
        code: &SchemeCode,
        range: Option<DateRange>,
    ) -> Result<Option<PriceHistory>>;
}

/// Best-effort source of expense ratio, AUM and similar fund facts.
#[async_trait]
pub trait SupplementaryMetadataProvider: Send + Sync {
    /// Looks up metadata by ISIN. Missing fields stay `None`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures; pipelines fall back to
    /// [`FundMetadata::default`].
    async fn get_metadata(&self, isin: &str) -> Result<FundMetadata>;
}

/// A metadata provider that knows nothing. Every lookup yields defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSupplementaryMetadata;

#[async_trait]
impl SupplementaryMetadataProvider for NoSupplementaryMetadata {
    async fn get_metadata(&self, _isin: &str) -> Result<FundMetadata> {
        Ok(FundMetadata::default())
    }
}
