//! Game catalog data model types, slug derivation, and JSON batch loading.
//!
//! This crate defines the persistent data model for the catalog without any
//! storage dependencies. Consumers can use these types directly for
//! serialization, display, or passing to `gameboxd-db` for persistence.

pub mod json;
pub mod slug;
pub mod types;

pub use json::{BatchError, batch_from_value, load_batch_file, parse_batch};
pub use slug::{is_valid_slug, normalize};
pub use types::*;
