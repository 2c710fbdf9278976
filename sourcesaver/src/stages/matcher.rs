//! Pattern matcher: finds query signatures and the link lists near them.
//!
//! The decoded tree has no schema, so blocks are recognised by shape alone:
//!
//! - a *query signature* is an array `[text, 1, ...]` with non-blank text;
//! - a *link list* is a non-empty array whose every element looks like
//!   `[http(s) url, title, description?]`.
//!
//! Every array in the tree that contains a signature and has a link list
//! within a few levels of itself becomes a candidate block. The link scan
//! never enters a child that carries a signature of its own, so sibling
//! searches cannot lend each other their links.

use super::{Stage, StageContext};
use crate::config::ExtractionConfig;
use crate::core::{Block, JsonNode, LinkEntry, StageKind};
use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    PATTERN.get_or_init(|| Regex::new(r"^https?://").expect("valid URL regex"))
}

/// True when `text` starts with `http://` or `https://`.
#[must_use]
pub fn is_http_url(text: &str) -> bool {
    url_pattern().is_match(text)
}

/// Converts one link-list element, if it has the link shape.
fn link_entry(node: &JsonNode) -> Option<LinkEntry> {
    let [url, title, rest @ ..] = node.as_array()? else {
        return None;
    };
    let url = url.as_str().filter(|url| is_http_url(url))?;
    let title = title.as_str().filter(|title| !title.trim().is_empty())?;
    let description = rest.first().and_then(JsonNode::as_str).unwrap_or_default();
    Some(LinkEntry::new(url, title).with_description(description))
}

/// Converts a whole array into links when every element qualifies.
fn link_list(node: &JsonNode) -> Option<Vec<LinkEntry>> {
    let items = node.as_array().filter(|items| !items.is_empty())?;
    items.iter().map(link_entry).collect()
}

/// Third stage: turns decoded trees into candidate blocks.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    signature_depth_limit: usize,
    link_scan_depth: usize,
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl PatternMatcher {
    /// Creates a matcher using the search bounds from `config`.
    #[must_use]
    pub const fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            signature_depth_limit: config.signature_depth_limit,
            link_scan_depth: config.link_scan_depth,
        }
    }

    /// Returns the trimmed text of the first query signature under `node`.
    ///
    /// Depth-first, children in order, never deeper than the configured limit.
    #[must_use]
    pub fn find_query_signature(&self, node: &JsonNode) -> Option<String> {
        self.signature_at(node, 0)
    }

    fn signature_at(&self, node: &JsonNode, depth: usize) -> Option<String> {
        if depth > self.signature_depth_limit {
            return None;
        }
        if let Some([JsonNode::String(text), marker, ..]) = node.as_array() {
            let query = text.trim();
            if marker.is_one() && !query.is_empty() {
                return Some(query.to_string());
            }
        }
        node.children()
            .find_map(|child| self.signature_at(child, depth + 1))
    }

    /// Collects every qualifying link list within the scan window of `node`.
    ///
    /// Lists are returned in pre-order. The window covers `node` itself and
    /// the configured number of levels below it, skipping any descendant that
    /// contains a query signature.
    #[must_use]
    pub fn find_link_lists(&self, node: &JsonNode) -> Vec<Vec<LinkEntry>> {
        let mut lists = Vec::new();
        self.collect_link_lists(node, 0, &mut lists);
        lists
    }

    fn collect_link_lists(&self, node: &JsonNode, depth: usize, lists: &mut Vec<Vec<LinkEntry>>) {
        if let Some(links) = link_list(node) {
            lists.push(links);
        }
        if depth == self.link_scan_depth {
            return;
        }
        for child in node.children() {
            if child.is_composite() && self.find_query_signature(child).is_none() {
                self.collect_link_lists(child, depth + 1, lists);
            }
        }
    }

    /// Walks every array in `root` and returns candidate blocks in pre-order.
    ///
    /// Candidates are neither blacklist-filtered nor deduplicated.
    #[must_use]
    pub fn find_blocks(&self, root: &JsonNode) -> Vec<Block> {
        let mut blocks = Vec::new();
        self.scan(root, &mut blocks);
        blocks
    }

    fn scan(&self, node: &JsonNode, blocks: &mut Vec<Block>) {
        if node.as_array().is_some() {
            if let Some(block) = self.block_at(node) {
                trace!(query = %block.query, links = block.len(), "Matched block candidate");
                blocks.push(block);
            }
        }
        for child in node.children() {
            if child.is_composite() {
                self.scan(child, blocks);
            }
        }
    }

    fn block_at(&self, node: &JsonNode) -> Option<Block> {
        // Link lists are cheap to rule out; check them before the signature search.
        let lists = self.find_link_lists(node);
        let best = lists
            .into_iter()
            .reduce(|best, list| if list.len() > best.len() { list } else { best })?;
        let query = self.find_query_signature(node)?;
        Some(Block::new(query, best))
    }

    /// Runs [`PatternMatcher::find_blocks`] over every decoded tree.
    pub fn match_all(&self, roots: &[JsonNode], ctx: &mut StageContext) -> Vec<Block> {
        let blocks: Vec<Block> = roots.iter().flat_map(|root| self.find_blocks(root)).collect();
        ctx.stats_mut().candidates += blocks.len();
        blocks
    }
}

impl Stage<Vec<JsonNode>> for PatternMatcher {
    type Output = Vec<Block>;

    fn kind(&self) -> StageKind {
        StageKind::Match
    }

    fn execute(&self, input: Vec<JsonNode>, ctx: &mut StageContext) -> Self::Output {
        self.match_all(&input, ctx)
    }
}
