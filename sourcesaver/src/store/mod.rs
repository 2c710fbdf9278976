//! Persistent aggregate of extracted searches.
//!
//! The extractor is stateless; this store is where repeated extractions of
//! the same query accumulate, using the aggregator's merge rule.

mod search_store;

pub use search_store::{SearchStore, StoredSearch};
