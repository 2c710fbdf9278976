//! Framing normalizer: turns a raw response body into parsed JSON fragments.
//!
//! Responses start with an anti-hijacking prefix and interleave JSON chunks
//! with decimal length lines. Two strategies are tried: the whole remaining
//! text as one document, then every bracketed line on its own.

use super::{Stage, StageContext};
use crate::core::{JsonNode, StageKind};
use crate::errors::ParseError;
use crate::events;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Literal prefix that guards batched-RPC responses against JSON hijacking.
pub const ANTI_HIJACK_PREFIX: &str = ")]}'";

/// Where a fragment was found in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "line")]
pub enum FragmentOrigin {
    /// The whole prefix-stripped text (or its leading balanced value).
    WholeText,
    /// A single line, numbered from 1.
    Line(usize),
}

/// A candidate JSON fragment, already materialized as a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Where the fragment came from.
    pub origin: FragmentOrigin,
    /// The parsed value. Always an array or an object.
    pub node: JsonNode,
}

/// Removes the anti-hijacking prefix and the newlines right after it.
///
/// Leading whitespace is trimmed whether or not the prefix is present.
#[must_use]
pub fn strip_prefix(raw: &str) -> &str {
    let trimmed = raw.trim_start();
    trimmed.strip_prefix(ANTI_HIJACK_PREFIX).map_or(trimmed, |rest| {
        rest.trim_start_matches(['\r', '\n'])
    })
}

/// True when `text` opens and closes with a matching bracket pair.
pub(crate) fn is_bracketed(text: &str) -> bool {
    (text.starts_with('[') && text.ends_with(']')) || (text.starts_with('{') && text.ends_with('}'))
}

/// Parses the shortest balanced-bracket value starting at the first `[` or `{`.
///
/// Brackets inside string literals are ignored and a backslash inside a
/// string escapes the next character. Anything after the balanced value is
/// ignored.
pub fn parse_json_prefix(text: &str) -> Result<JsonNode, ParseError> {
    let start = text.find(['[', '{']).ok_or(ParseError::NoOpeningBracket)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in text.as_bytes().iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(JsonNode::parse(&text[start..=offset])?);
                }
            }
            _ => {}
        }
    }

    Err(ParseError::Unbalanced { open: depth })
}

/// Parses `text` directly, falling back to [`parse_json_prefix`].
pub fn parse_or_scan(text: &str) -> Result<JsonNode, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    match JsonNode::parse(trimmed) {
        Ok(node) => Ok(node),
        Err(direct) => parse_json_prefix(trimmed).map_err(|scan| match scan {
            ParseError::NoOpeningBracket => ParseError::Json(direct),
            other => other,
        }),
    }
}

/// First stage: isolates JSON fragments from the framed response.
#[derive(Debug, Clone, Copy, Default)]
pub struct FramingNormalizer;

impl FramingNormalizer {
    /// Creates a new normalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns every fragment that parses, never failing.
    ///
    /// A successful whole-text attempt wins outright; otherwise each
    /// bracketed line is tried independently and failures are dropped.
    pub fn normalize(&self, raw: &str, ctx: &mut StageContext) -> Vec<Fragment> {
        let cleaned = strip_prefix(raw);

        match parse_or_scan(cleaned) {
            Ok(node) if node.is_composite() => {
                let stats = ctx.stats_mut();
                stats.whole_text = true;
                stats.fragments_accepted += 1;
                return vec![Fragment {
                    origin: FragmentOrigin::WholeText,
                    node,
                }];
            }
            Ok(_) => debug!("Whole text is a scalar; trying per-line framing"),
            Err(err) => debug!(reason = err.kind(), "Whole-text parse failed; trying per-line framing"),
        }

        let mut fragments = Vec::new();
        for (index, line) in cleaned.lines().enumerate() {
            let trimmed = line.trim();
            if !is_bracketed(trimmed) {
                continue;
            }
            let line_number = index + 1;
            match parse_or_scan(trimmed) {
                Ok(node) => fragments.push(Fragment {
                    origin: FragmentOrigin::Line(line_number),
                    node,
                }),
                Err(err) => {
                    debug!(line = line_number, reason = err.kind(), "Dropping malformed fragment");
                    ctx.stats_mut().fragments_dropped += 1;
                    ctx.emit(
                        events::FRAGMENT_DROPPED,
                        Some(serde_json::json!({
                            "line": line_number,
                            "reason": err.kind(),
                            "error": err.to_string(),
                        })),
                    );
                }
            }
        }

        ctx.stats_mut().fragments_accepted += fragments.len();
        fragments
    }
}

impl<'a> Stage<&'a str> for FramingNormalizer {
    type Output = Vec<Fragment>;

    fn kind(&self) -> StageKind {
        StageKind::Normalize
    }

    fn execute(&self, input: &'a str, ctx: &mut StageContext) -> Self::Output {
        self.normalize(input, ctx)
    }
}
