//! Stage trait and the four extraction stages.
//!
//! Stages are the fundamental units of work in the extractor. Each one
//! consumes only the output of the stage before it:
//!
//! ```text
//! raw text -> FramingNormalizer -> RecursiveDecoder -> PatternMatcher -> Aggregator -> blocks
//! ```

mod aggregator;
mod context;
mod decoder;
mod matcher;
mod normalizer;

pub use aggregator::{merge, merge_links, Aggregator};
pub use context::{ExtractionStats, StageContext};
pub use decoder::RecursiveDecoder;
pub use matcher::{is_http_url, PatternMatcher};
pub use normalizer::{
    parse_json_prefix, parse_or_scan, strip_prefix, Fragment, FragmentOrigin, FramingNormalizer,
    ANTI_HIJACK_PREFIX,
};

use crate::core::StageKind;
use std::fmt::Debug;

/// Trait for extraction stages.
///
/// A stage is a pure transformation from its input to its output. It never
/// fails: anything it cannot handle is dropped and reported through the
/// [`StageContext`].
pub trait Stage<I>: Debug {
    /// What the stage produces.
    type Output;

    /// Returns which stage this is.
    fn kind(&self) -> StageKind;

    /// Executes the stage.
    ///
    /// # Arguments
    ///
    /// * `input` - The previous stage's output
    /// * `ctx` - The per-call context collecting stats and events
    fn execute(&self, input: I, ctx: &mut StageContext) -> Self::Output;
}
