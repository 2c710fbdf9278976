//! Recursive decoder: expands JSON documents hidden inside string leaves.
//!
//! Batched-RPC payloads carry their real content as an escaped JSON string
//! inside the outer array, sometimes several layers deep. Every string leaf
//! that looks like a bracketed document is re-parsed and replaced in place.
//!
//! Trees are owned values, so reference cycles cannot occur. Termination is
//! guaranteed by a nesting-depth ceiling and a per-call expansion budget;
//! hitting either stops expansion of the affected branch only.

use super::normalizer::{is_bracketed, parse_or_scan, Fragment};
use super::{Stage, StageContext};
use crate::config::ExtractionConfig;
use crate::core::{JsonNode, StageKind};
use crate::errors::ParseError;
use crate::events;
use tracing::{debug, warn};

/// Remaining work allowed for one extraction call.
#[derive(Debug)]
struct ExpansionBudget {
    remaining: usize,
    depth_reported: bool,
    count_reported: bool,
}

/// Second stage: re-parses embedded documents to arbitrary depth.
#[derive(Debug, Clone)]
pub struct RecursiveDecoder {
    max_embedded_len: usize,
    max_expand_depth: usize,
    max_expansions: usize,
}

impl Default for RecursiveDecoder {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl RecursiveDecoder {
    /// Creates a decoder using the ceilings from `config`.
    #[must_use]
    pub const fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            max_embedded_len: config.max_embedded_len,
            max_expand_depth: config.max_expand_depth,
            max_expansions: config.max_expansions,
        }
    }

    /// Expands every fragment and returns the decoded trees.
    pub fn decode(&self, fragments: Vec<Fragment>, ctx: &mut StageContext) -> Vec<JsonNode> {
        let mut budget = ExpansionBudget {
            remaining: self.max_expansions,
            depth_reported: false,
            count_reported: false,
        };
        fragments
            .into_iter()
            .map(|fragment| {
                let mut node = fragment.node;
                self.expand_node(&mut node, 0, &mut budget, ctx);
                node
            })
            .collect()
    }

    /// Expands a single tree in place with a fresh budget.
    pub fn expand(&self, node: &mut JsonNode, ctx: &mut StageContext) {
        let mut budget = ExpansionBudget {
            remaining: self.max_expansions,
            depth_reported: false,
            count_reported: false,
        };
        if let JsonNode::String(_) = node {
            if let Some(parsed) = self.try_embedded(node, &mut budget, ctx) {
                *node = parsed;
            }
        }
        self.expand_node(node, 0, &mut budget, ctx);
    }

    /// Returns the trimmed text when `text` qualifies as an embedded document.
    fn embedded_candidate<'t>(&self, text: &'t str) -> Option<Result<&'t str, ParseError>> {
        let trimmed = text.trim();
        if trimmed.len() < 2 || !is_bracketed(trimmed) {
            return None;
        }
        if trimmed.len() > self.max_embedded_len {
            return Some(Err(ParseError::TooLarge {
                len: trimmed.len(),
                limit: self.max_embedded_len,
            }));
        }
        Some(Ok(trimmed))
    }

    fn try_embedded(
        &self,
        node: &JsonNode,
        budget: &mut ExpansionBudget,
        ctx: &mut StageContext,
    ) -> Option<JsonNode> {
        let text = node.as_str()?;
        let candidate = self.embedded_candidate(text)?;

        if budget.remaining == 0 {
            ctx.stats_mut().budget_exhausted += 1;
            if !budget.count_reported {
                budget.count_reported = true;
                warn!(limit = self.max_expansions, "Embedded expansion budget exhausted");
                ctx.emit(
                    events::BUDGET_EXHAUSTED,
                    Some(serde_json::json!({"limit": "max_expansions", "value": self.max_expansions})),
                );
            }
            return None;
        }
        budget.remaining -= 1;

        match candidate.and_then(parse_or_scan) {
            Ok(parsed) => {
                ctx.stats_mut().expansions += 1;
                Some(parsed)
            }
            Err(err) => {
                debug!(reason = err.kind(), len = text.len(), "Leaving embedded string unparsed");
                ctx.stats_mut().embedded_rejected += 1;
                ctx.emit(
                    events::EMBEDDED_REJECTED,
                    Some(serde_json::json!({"reason": err.kind(), "len": text.len()})),
                );
                None
            }
        }
    }

    fn expand_node(
        &self,
        node: &mut JsonNode,
        depth: usize,
        budget: &mut ExpansionBudget,
        ctx: &mut StageContext,
    ) {
        if depth >= self.max_expand_depth {
            ctx.stats_mut().budget_exhausted += 1;
            if !budget.depth_reported {
                budget.depth_reported = true;
                warn!(limit = self.max_expand_depth, "Embedded expansion depth limit reached");
                ctx.emit(
                    events::BUDGET_EXHAUSTED,
                    Some(serde_json::json!({"limit": "max_expand_depth", "value": self.max_expand_depth})),
                );
            }
            return;
        }

        for child in node.children_mut() {
            if let Some(parsed) = self.try_embedded(child, budget, ctx) {
                *child = parsed;
            }
            if child.is_composite() {
                self.expand_node(child, depth + 1, budget, ctx);
            }
        }
    }
}

impl Stage<Vec<Fragment>> for RecursiveDecoder {
    type Output = Vec<JsonNode>;

    fn kind(&self) -> StageKind {
        StageKind::Decode
    }

    fn execute(&self, input: Vec<Fragment>, ctx: &mut StageContext) -> Self::Output {
        self.decode(input, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use crate::stages::FragmentOrigin;
    use serde_json::json;
    use std::sync::Arc;

    fn node(value: serde_json::Value) -> JsonNode {
        JsonNode::from(value)
    }

    fn fragment(value: serde_json::Value) -> Fragment {
        Fragment {
            origin: FragmentOrigin::WholeText,
            node: node(value),
        }
    }

    #[test]
    fn test_decode_expands_embedded_document() {
        let mut ctx = StageContext::default();
        let inner = json!([["q", 1], [["https://a", "A"]]]).to_string();
        let decoded = RecursiveDecoder::default().decode(vec![fragment(json!(["wrb.fr", inner]))], &mut ctx);

        assert_eq!(decoded, vec![node(json!(["wrb.fr", [["q", 1], [["https://a", "A"]]]]))]);
        assert_eq!(ctx.stats().expansions, 1);
    }

    #[test]
    fn test_decode_expands_nested_layers() {
        let mut ctx = StageContext::default();
        let innermost = json!({"deep": [1, 2]}).to_string();
        let middle = json!(["layer", innermost]).to_string();
        let decoded = RecursiveDecoder::default().decode(vec![fragment(json!([middle]))], &mut ctx);

        assert_eq!(decoded, vec![node(json!([["layer", {"deep": [1, 2]}]]))]);
        assert_eq!(ctx.stats().expansions, 2);
    }

    #[test]
    fn test_decode_expands_strings_inside_objects() {
        let mut ctx = StageContext::default();
        let decoded = RecursiveDecoder::default()
            .decode(vec![fragment(json!({"payload": " [1, 2] "}))], &mut ctx);
        assert_eq!(decoded, vec![node(json!({"payload": [1, 2]}))]);
    }

    #[test]
    fn test_decode_leaves_malformed_strings() {
        let sink = Arc::new(CollectingEventSink::new());
        let mut ctx = StageContext::new(sink.clone());
        let decoded = RecursiveDecoder::default()
            .decode(vec![fragment(json!(["[not json]", "plain", "[1] tail"]))], &mut ctx);

        assert_eq!(decoded, vec![node(json!(["[not json]", "plain", "[1] tail"]))]);
        assert_eq!(ctx.stats().embedded_rejected, 1);
        assert_eq!(sink.events_of_type(events::EMBEDDED_REJECTED).len(), 1);
    }

    #[test]
    fn test_decode_respects_length_ceiling() {
        let config = ExtractionConfig::default().with_max_embedded_len(4);
        let mut ctx = StageContext::default();
        let decoded = RecursiveDecoder::from_config(&config)
            .decode(vec![fragment(json!(["[1]", "[1, 2]"]))], &mut ctx);

        assert_eq!(decoded, vec![node(json!([[1], "[1, 2]"]))]);
        assert_eq!(ctx.stats().embedded_rejected, 1);
    }

    #[test]
    fn test_decode_stops_at_expansion_budget() {
        let config = ExtractionConfig::default().with_max_expansions(1);
        let sink = Arc::new(CollectingEventSink::new());
        let mut ctx = StageContext::new(sink.clone());
        let decoded = RecursiveDecoder::from_config(&config)
            .decode(vec![fragment(json!(["[1]", "[2]", "[3]"]))], &mut ctx);

        assert_eq!(decoded, vec![node(json!([[1], "[2]", "[3]"]))]);
        assert_eq!(ctx.stats().budget_exhausted, 2);
        assert_eq!(sink.events_of_type(events::BUDGET_EXHAUSTED).len(), 1);
    }

    #[test]
    fn test_decode_stops_at_depth_limit_without_failing() {
        let config = ExtractionConfig::default().with_max_expand_depth(2);
        let mut ctx = StageContext::default();
        let decoded = RecursiveDecoder::from_config(&config)
            .decode(vec![fragment(json!(["[1]", [["[2]"]]]))], &mut ctx);

        // Depth 0 and 1 are expanded, the string at depth 2 is left alone.
        assert_eq!(decoded, vec![node(json!([[1], [["[2]"]]]))]);
        assert_eq!(ctx.stats().expansions, 1);
        assert!(ctx.stats().budget_exhausted >= 1);
    }

    #[test]
    fn test_expand_parses_root_string() {
        let mut ctx = StageContext::default();
        let mut root = JsonNode::String(json!([["q", 1]]).to_string());
        RecursiveDecoder::default().expand(&mut root, &mut ctx);
        assert_eq!(root, node(json!([["q", 1]])));
    }

    #[test]
    fn test_decode_self_replicating_strings_terminate() {
        // Each layer re-encodes the next one; the budget bounds the work.
        let mut text = json!([1]).to_string();
        for _ in 0..50 {
            text = json!([text]).to_string();
        }
        let config = ExtractionConfig::default().with_max_expansions(10);
        let mut ctx = StageContext::default();
        let decoded = RecursiveDecoder::from_config(&config).decode(vec![fragment(json!([text]))], &mut ctx);

        assert_eq!(decoded.len(), 1);
        assert_eq!(ctx.stats().expansions, 10);
    }
}
