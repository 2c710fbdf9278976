//! Event sink system for observability.
//!
//! Stages report what they dropped or skipped through an [`EventSink`]
//! instead of failing, so callers can see why a response yielded fewer
//! blocks than expected.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Emitted once per extraction call before the first stage runs.
pub const EXTRACT_STARTED: &str = "extract.started";
/// A candidate fragment failed both parse strategies.
pub const FRAGMENT_DROPPED: &str = "extract.fragment_dropped";
/// A JSON-looking string leaf could not be re-parsed.
pub const EMBEDDED_REJECTED: &str = "extract.embedded_rejected";
/// The expansion depth or count ceiling stopped a branch.
pub const BUDGET_EXHAUSTED: &str = "extract.budget_exhausted";
/// A block was dropped because its query is a UI label.
pub const BLOCK_BLACKLISTED: &str = "extract.block_blacklisted";
/// One stage finished; carries its flattened span attributes.
pub const STAGE_COMPLETED: &str = "extract.stage_completed";
/// Emitted once per extraction call after the last stage.
pub const EXTRACT_COMPLETED: &str = "extract.completed";
