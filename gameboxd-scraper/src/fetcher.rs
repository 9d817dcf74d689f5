//! The seam between importers and a metadata provider.

use gameboxd_catalog::types::RawRecord;

use crate::error::ScrapeError;

/// A paginated source of game metadata.
///
/// Implemented by [`RawgClient`](crate::RawgClient); importers are generic
/// over it so tests can substitute canned pages.
#[allow(async_fn_in_trait)]
pub trait MetadataFetcher {
    /// Label recorded as the provenance of imported records.
    fn source_label(&self) -> &str;

    /// Fetch one page of summaries. Pages are 1-based.
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Vec<RawRecord>, ScrapeError>;

    /// Fetch the full record for one provider id.
    async fn fetch_by_id(&self, external_id: i64) -> Result<RawRecord, ScrapeError>;
}
