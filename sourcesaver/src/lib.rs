//! # Sourcesaver
//!
//! Fault-tolerant extraction of "search query → source links" records from
//! batched-RPC web responses.
//!
//! Responses carry an anti-hijacking prefix, interleaved length-framing
//! lines and JSON documents embedded as escaped strings. Sourcesaver pulls
//! the meaningful records out of that mess with a four-stage pipeline:
//!
//! - **Framing normalizer**: strips the prefix and isolates JSON fragments
//! - **Recursive decoder**: re-parses embedded documents, with bounded work
//! - **Pattern matcher**: finds query signatures and the link lists near them
//! - **Aggregator**: drops UI labels and deduplicates per query
//!
//! Extraction never fails; bad input yields fewer blocks. Results from
//! repeated calls accumulate in a [`store::SearchStore`].
//!
//! ## Quick Start
//!
//! ```rust
//! use sourcesaver::prelude::*;
//!
//! let raw = sourcesaver::testing::SAMPLE_RESPONSE;
//! let blocks = Extractor::default().extract(raw);
//! assert_eq!(blocks.len(), 1);
//!
//! let store = SearchStore::new();
//! store.record(&blocks);
//! assert_eq!(store.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod export;
pub mod observability;
pub mod pipeline;
pub mod stages;
pub mod store;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ExtractionConfig, DEFAULT_BLACKLIST};
    pub use crate::core::{Block, JsonNode, LinkEntry, StageKind};
    pub use crate::errors::{ConfigError, ParseError, SourceSaverError};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::export::{replay_queue, summary_message, ExportFormat};
    pub use crate::observability::init_tracing;
    pub use crate::pipeline::{ExtractionReport, Extractor};
    pub use crate::stages::{merge, ExtractionStats, Stage};
    pub use crate::store::{SearchStore, StoredSearch};
}

/// Extracts blocks from `raw` with the default configuration.
#[must_use]
pub fn extract(raw: &str) -> Vec<crate::core::Block> {
    crate::pipeline::Extractor::default().extract(raw)
}

#[cfg(test)]
mod tests {
    use crate::pipeline::Extractor;
    use crate::testing::SAMPLE_RESPONSE;

    #[test]
    fn test_extract_shortcut_matches_extractor() {
        assert_eq!(
            crate::extract(SAMPLE_RESPONSE),
            Extractor::default().extract(SAMPLE_RESPONSE)
        );
        assert!(crate::extract("not a response").is_empty());
    }
}
