//! Import pasted, uploaded, and provider-fetched game records into the catalog.
//!
//! This crate owns the reconciliation logic: validating untrusted records,
//! deriving slugs, merging incoming fields into existing rows, and reporting
//! per-item failures without aborting a batch.

pub mod batch;
pub mod merge;
pub mod progress;
pub mod provider_import;

pub use batch::{import_batch, import_json_str, import_json_value, ImportError};
pub use merge::{build_insert, merge_into, overlay, prune_blank, validate, Validated};
pub use progress::{ImportProgress, LogProgress, SilentProgress};
pub use provider_import::{
    import_provider_pages, ProviderImportReport, ProviderImportRequest, DETAIL_CONCURRENCY,
    ITEM_TIMEOUT,
};
