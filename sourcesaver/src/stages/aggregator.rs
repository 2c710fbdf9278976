//! Aggregator: blacklist filtering, per-call dedup and cross-call merging.

use super::{Stage, StageContext};
use crate::config::ExtractionConfig;
use crate::core::{Block, LinkEntry, StageKind};
use crate::events;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Fourth stage: turns candidate blocks into the final output.
#[derive(Debug, Clone)]
pub struct Aggregator {
    blacklist: HashSet<String>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl Aggregator {
    /// Creates an aggregator with the fixed labels plus any extras from `config`.
    #[must_use]
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            blacklist: config.blacklist().map(str::to_string).collect(),
        }
    }

    /// True when `query` is a UI action label rather than a search.
    #[must_use]
    pub fn is_blacklisted(&self, query: &str) -> bool {
        self.blacklist.contains(query)
    }

    /// Drops blacklisted queries and keeps one block per query.
    ///
    /// When a query repeats, the block with more links survives (the earlier
    /// one on a tie) and takes the position of the first occurrence.
    pub fn aggregate(&self, candidates: Vec<Block>, ctx: &mut StageContext) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::with_capacity(candidates.len());
        let mut positions: HashMap<String, usize> = HashMap::new();

        for candidate in candidates {
            if self.is_blacklisted(&candidate.query) {
                debug!(query = %candidate.query, "Dropping blacklisted query");
                ctx.stats_mut().blacklisted += 1;
                ctx.emit(
                    events::BLOCK_BLACKLISTED,
                    Some(serde_json::json!({"query": candidate.query})),
                );
                continue;
            }

            match positions.get(&candidate.query) {
                Some(&index) => {
                    ctx.stats_mut().duplicates_removed += 1;
                    if candidate.len() > blocks[index].len() {
                        blocks[index] = candidate;
                    }
                }
                None => {
                    positions.insert(candidate.query.clone(), blocks.len());
                    blocks.push(candidate);
                }
            }
        }

        ctx.stats_mut().blocks = blocks.len();
        blocks
    }
}

impl Stage<Vec<Block>> for Aggregator {
    type Output = Vec<Block>;

    fn kind(&self) -> StageKind {
        StageKind::Aggregate
    }

    fn execute(&self, input: Vec<Block>, ctx: &mut StageContext) -> Self::Output {
        self.aggregate(input, ctx)
    }
}

/// Unions two link sequences by URL.
///
/// Existing links keep their order and metadata; unseen incoming links are
/// appended in their own order. Links with an empty URL are skipped.
#[must_use]
pub fn merge_links(existing: &[LinkEntry], incoming: &[LinkEntry]) -> Vec<LinkEntry> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(existing.len() + incoming.len());
    existing
        .iter()
        .chain(incoming)
        .filter(|link| !link.url.is_empty() && seen.insert(link.url.as_str()))
        .cloned()
        .collect()
}

/// Merges a newly extracted block into a stored one with the same query.
#[must_use]
pub fn merge(existing: &Block, incoming: &Block) -> Block {
    Block {
        query: existing.query.clone(),
        links: merge_links(&existing.links, &incoming.links),
    }
}
