//! Pipeline building and execution.
//!
//! This module provides:
//! - The [`Extractor`] that chains the four stages
//! - The per-call [`ExtractionReport`]

mod extractor;
#[cfg(test)]
mod extractor_tests;

pub use extractor::{ExtractionReport, Extractor};
