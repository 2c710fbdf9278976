//! Per-call state shared by the stages of one extraction.

use crate::events::{EventSink, NoOpEventSink};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Counters describing what one extraction call accepted and dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Whether the whole-text attempt produced the only fragment.
    pub whole_text: bool,
    /// Fragments handed to the decoder.
    pub fragments_accepted: usize,
    /// JSON-looking lines that failed both parse strategies.
    pub fragments_dropped: usize,
    /// String leaves replaced by their parsed document.
    pub expansions: usize,
    /// JSON-looking string leaves left as plain strings.
    pub embedded_rejected: usize,
    /// Branches cut short by the depth or count ceiling.
    pub budget_exhausted: usize,
    /// Blocks found by the matcher before filtering.
    pub candidates: usize,
    /// Blocks dropped because their query is a UI label.
    pub blacklisted: usize,
    /// Blocks folded into an earlier block with the same query.
    pub duplicates_removed: usize,
    /// Blocks emitted.
    pub blocks: usize,
}

/// Execution context handed to every [`Stage`](super::Stage).
///
/// Owned by a single extraction call; nothing in it is shared between calls
/// except the event sink, which only receives notifications.
pub struct StageContext {
    sink: Arc<dyn EventSink>,
    stats: ExtractionStats,
}

impl StageContext {
    /// Creates a context that reports to `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            stats: ExtractionStats::default(),
        }
    }

    /// Emits an event on the configured sink.
    pub fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.sink.emit(event_type, data);
    }

    /// Counters collected so far.
    #[must_use]
    pub const fn stats(&self) -> &ExtractionStats {
        &self.stats
    }

    /// Mutable access to the counters.
    pub fn stats_mut(&mut self) -> &mut ExtractionStats {
        &mut self.stats
    }

    /// Consumes the context, returning the counters.
    #[must_use]
    pub fn into_stats(self) -> ExtractionStats {
        self.stats
    }
}

impl Default for StageContext {
    fn default() -> Self {
        Self::new(Arc::new(NoOpEventSink))
    }
}

impl fmt::Debug for StageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageContext")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;

    #[test]
    fn test_context_forwards_events_to_sink() {
        let sink = Arc::new(CollectingEventSink::new());
        let ctx = StageContext::new(sink.clone());

        ctx.emit("extract.started", None);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_context_collects_stats() {
        let mut ctx = StageContext::default();
        ctx.stats_mut().expansions += 2;
        ctx.stats_mut().blocks = 1;

        let stats = ctx.into_stats();
        assert_eq!(stats.expansions, 2);
        assert_eq!(stats.blocks, 1);
    }
}
