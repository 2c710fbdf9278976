//! Extraction output records.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single source link attached to a search query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkEntry {
    /// Absolute HTTP(S) URL.
    pub url: String,
    /// Source title.
    #[serde(default)]
    pub title: String,
    /// Short description; empty when the wire format carries none.
    #[serde(default)]
    pub description: String,
}

impl LinkEntry {
    /// Creates a link with an empty description.
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: String::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// The unit the extractor emits: one search query and its source links.
///
/// `links` holds at most one entry per URL; the first occurrence wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// The user-issued search query, whitespace-trimmed.
    pub query: String,
    /// Links in first-seen order.
    #[serde(default)]
    pub links: Vec<LinkEntry>,
}

impl Block {
    /// Creates a block, dropping repeated URLs.
    #[must_use]
    pub fn new(query: impl Into<String>, links: Vec<LinkEntry>) -> Self {
        Self {
            query: query.into(),
            links: dedup_links(links),
        }
    }

    /// Number of links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// True when the block carries no links.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Iterates over the link URLs in order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(|link| link.url.as_str())
    }
}

/// Removes repeated URLs, keeping the first occurrence and the original order.
#[must_use]
pub fn dedup_links(links: Vec<LinkEntry>) -> Vec<LinkEntry> {
    let mut seen = HashSet::with_capacity(links.len());
    links
        .into_iter()
        .filter(|link| seen.insert(link.url.clone()))
        .collect()
}
