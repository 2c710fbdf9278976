//! Accumulated searches keyed by query.

use crate::core::{Block, LinkEntry};
use crate::errors::SourceSaverError;
use crate::stages::merge_links;
use crate::utils::{format_iso8601, now_utc, Timestamp};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// One stored query with every link ever seen for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSearch {
    /// The search query.
    pub query: String,
    /// Links in first-seen order, one per URL.
    #[serde(default)]
    pub links: Vec<LinkEntry>,
    /// When the query last re-surfaced, as epoch milliseconds on the wire.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: Timestamp,
}

impl StoredSearch {
    /// Views the record as a block.
    #[must_use]
    pub fn to_block(&self) -> Block {
        Block {
            query: self.query.clone(),
            links: self.links.clone(),
        }
    }
}

/// Concurrent map from query to [`StoredSearch`].
///
/// Updates to one query are serialised by the map's per-key entry lock, so
/// concurrent `record` calls racing on the same query never lose links.
#[derive(Debug, Default)]
pub struct SearchStore {
    searches: DashMap<String, StoredSearch>,
}

impl SearchStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `blocks` into the store, stamping them with the current time.
    ///
    /// Returns how many blocks were recorded.
    pub fn record(&self, blocks: &[Block]) -> usize {
        self.record_at(blocks, now_utc())
    }

    /// Like [`SearchStore::record`] with an explicit timestamp.
    pub fn record_at(&self, blocks: &[Block], now: Timestamp) -> usize {
        let mut recorded = 0;
        for block in blocks.iter().filter(|block| !block.is_empty()) {
            self.searches
                .entry(block.query.clone())
                .and_modify(|stored| {
                    stored.links = merge_links(&stored.links, &block.links);
                    stored.updated_at = now;
                })
                .or_insert_with(|| StoredSearch {
                    query: block.query.clone(),
                    links: merge_links(&[], &block.links),
                    updated_at: now,
                });
            recorded += 1;
        }
        debug!(
            recorded,
            total = self.searches.len(),
            at = %format_iso8601(&now),
            "Recorded searches"
        );
        recorded
    }

    /// Returns a copy of the stored search for `query`.
    #[must_use]
    pub fn get(&self, query: &str) -> Option<StoredSearch> {
        self.searches.get(query).map(|entry| entry.value().clone())
    }

    /// Deletes one query.
    pub fn remove(&self, query: &str) -> Option<StoredSearch> {
        self.searches.remove(query).map(|(_, search)| search)
    }

    /// Deletes everything.
    pub fn clear(&self) {
        self.searches.clear();
    }

    /// Number of stored queries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.searches.len()
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.searches.is_empty()
    }

    /// All searches, most recently updated first; ties ordered by query.
    #[must_use]
    pub fn recent(&self) -> Vec<StoredSearch> {
        let mut searches: Vec<StoredSearch> =
            self.searches.iter().map(|entry| entry.value().clone()).collect();
        searches.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.query.cmp(&b.query))
        });
        searches
    }

    /// Serialises the store as a JSON object keyed by query.
    pub fn to_json(&self) -> Result<String, SourceSaverError> {
        let snapshot: BTreeMap<String, StoredSearch> = self
            .searches
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Restores a store from [`SearchStore::to_json`] output.
    pub fn from_json(text: &str) -> Result<Self, SourceSaverError> {
        let snapshot: BTreeMap<String, StoredSearch> = serde_json::from_str(text)?;
        Ok(Self {
            searches: snapshot.into_iter().collect(),
        })
    }

    /// Writes the snapshot to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SourceSaverError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), searches = self.len(), "Saved search store");
        Ok(())
    }

    /// Reads a snapshot written by [`SearchStore::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceSaverError> {
        let path = path.as_ref();
        let store = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!(path = %path.display(), searches = store.len(), "Loaded search store");
        Ok(store)
    }
}
