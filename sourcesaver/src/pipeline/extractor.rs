//! The extraction pipeline.
//!
//! Runs the four stages in order over one response body. Every stage is
//! timed and its span attributes are logged; nothing in here can fail once
//! the extractor has been built from a valid configuration.

use crate::config::ExtractionConfig;
use crate::core::Block;
use crate::errors::SourceSaverError;
use crate::events::{self, EventSink, NoOpEventSink};
use crate::observability::{SpanTimer, StageSpanAttributes};
use crate::stages::{
    Aggregator, ExtractionStats, FramingNormalizer, PatternMatcher, RecursiveDecoder, Stage,
    StageContext,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Everything one extraction call produced.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Final blocks, blacklist-filtered and deduplicated.
    pub blocks: Vec<Block>,
    /// What was accepted and dropped along the way.
    pub stats: ExtractionStats,
    /// Per-stage counts and timings, in execution order.
    pub stages: Vec<StageSpanAttributes>,
    /// Total wall time in milliseconds.
    pub duration_ms: f64,
}

/// Extracts search blocks from raw batched-RPC responses.
///
/// Holds no per-call state, so a single extractor can be shared across
/// threads and called concurrently.
pub struct Extractor {
    config: ExtractionConfig,
    normalizer: FramingNormalizer,
    decoder: RecursiveDecoder,
    matcher: PatternMatcher,
    aggregator: Aggregator,
    sink: Arc<dyn EventSink>,
}

impl Extractor {
    /// Creates an extractor after validating `config`.
    pub fn new(config: ExtractionConfig) -> Result<Self, SourceSaverError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ExtractionConfig) -> Self {
        Self {
            normalizer: FramingNormalizer::new(),
            decoder: RecursiveDecoder::from_config(&config),
            matcher: PatternMatcher::from_config(&config),
            aggregator: Aggregator::from_config(&config),
            sink: Arc::new(NoOpEventSink),
            config,
        }
    }

    /// Reports stage events to `sink`.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Returns the blocks found in `raw`.
    ///
    /// Never fails: malformed or hostile input yields fewer blocks, possibly none.
    #[must_use]
    pub fn extract(&self, raw: &str) -> Vec<Block> {
        self.extract_with_report(raw).blocks
    }

    /// Like [`Extractor::extract`], also returning stats and stage timings.
    #[must_use]
    pub fn extract_with_report(&self, raw: &str) -> ExtractionReport {
        let timer = SpanTimer::start("extract");
        let mut ctx = StageContext::new(Arc::clone(&self.sink));
        let mut stages = Vec::with_capacity(4);

        ctx.emit(
            events::EXTRACT_STARTED,
            Some(serde_json::json!({"input_len": raw.len()})),
        );

        let fragments = run_stage(&self.normalizer, raw, 1, &mut ctx, &mut stages);
        let count = fragments.len();
        let trees = run_stage(&self.decoder, fragments, count, &mut ctx, &mut stages);
        let count = trees.len();
        let candidates = run_stage(&self.matcher, trees, count, &mut ctx, &mut stages);
        let count = candidates.len();
        let blocks = run_stage(&self.aggregator, candidates, count, &mut ctx, &mut stages);

        let duration_ms = timer.finish();
        ctx.emit(
            events::EXTRACT_COMPLETED,
            Some(serde_json::json!({
                "blocks": blocks.len(),
                "duration_ms": duration_ms,
            })),
        );
        debug!(blocks = blocks.len(), duration_ms, "Extraction completed");

        ExtractionReport {
            blocks,
            stats: ctx.into_stats(),
            stages,
            duration_ms,
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::from_valid_config(ExtractionConfig::default())
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn run_stage<I, O, S>(
    stage: &S,
    input: I,
    input_count: usize,
    ctx: &mut StageContext,
    spans: &mut Vec<StageSpanAttributes>,
) -> Vec<O>
where
    S: Stage<I, Output = Vec<O>>,
{
    let timer = SpanTimer::start(stage.kind().as_str());
    let output = stage.execute(input, ctx);
    let attrs = StageSpanAttributes::new(stage.kind())
        .with_counts(input_count, output.len())
        .with_duration_ms(timer.finish());
    attrs.record();
    let payload: serde_json::Map<String, serde_json::Value> = attrs
        .to_attributes()
        .into_iter()
        .map(|(key, value)| (key, serde_json::Value::String(value)))
        .collect();
    ctx.emit(events::STAGE_COMPLETED, Some(serde_json::Value::Object(payload)));
    spans.push(attrs);
    output
}
