//! Testing utilities for extraction.
//!
//! This module provides:
//! - Captured and synthetic batched-RPC responses
//! - Assertions over extracted blocks

mod assertions;
mod fixtures;

pub use assertions::{
    assert_block_urls, assert_has_query, assert_http_links_only, assert_no_query,
    assert_unique_links,
};
pub use fixtures::{
    blacklist_response, search_payload, ResponseBuilder, SAMPLE_QUERY, SAMPLE_RESPONSE,
    SAMPLE_URLS,
};
