//! Stage kind enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four extraction stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Strips framing and isolates JSON fragments.
    Normalize,
    /// Re-parses embedded JSON documents held in string leaves.
    Decode,
    /// Finds query signatures and link lists.
    Match,
    /// Filters, deduplicates and merges blocks.
    Aggregate,
}

impl StageKind {
    /// All stages in pipeline order.
    pub const ALL: [Self; 4] = [Self::Normalize, Self::Decode, Self::Match, Self::Aggregate];

    /// Stable lowercase name used in logs and events.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normalize => "normalize",
            Self::Decode => "decode",
            Self::Match => "match",
            Self::Aggregate => "aggregate",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
