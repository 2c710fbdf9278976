//! Stage timing and span attributes.

use crate::core::StageKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Span attributes for one stage run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageSpanAttributes {
    /// Stage kind.
    pub stage: StageKind,
    /// Items the stage received.
    pub input_count: usize,
    /// Items the stage produced.
    pub output_count: usize,
    /// Duration in milliseconds.
    pub duration_ms: Option<f64>,
}

impl StageSpanAttributes {
    /// Creates new stage span attributes.
    #[must_use]
    pub const fn new(stage: StageKind) -> Self {
        Self {
            stage,
            input_count: 0,
            output_count: 0,
            duration_ms: None,
        }
    }

    /// Sets the input and output item counts.
    #[must_use]
    pub const fn with_counts(mut self, input_count: usize, output_count: usize) -> Self {
        self.input_count = input_count;
        self.output_count = output_count;
        self
    }

    /// Sets the duration.
    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Flattens into dotted attribute keys.
    #[must_use]
    pub fn to_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();

        attrs.insert("stage.name".to_string(), self.stage.to_string());
        attrs.insert("stage.input_count".to_string(), self.input_count.to_string());
        attrs.insert("stage.output_count".to_string(), self.output_count.to_string());
        if let Some(v) = self.duration_ms {
            attrs.insert("stage.duration_ms".to_string(), v.to_string());
        }

        attrs
    }

    /// Logs the attributes at debug level.
    pub fn record(&self) {
        tracing::debug!(
            stage = %self.stage,
            input_count = self.input_count,
            output_count = self.output_count,
            duration_ms = self.duration_ms.unwrap_or_default(),
            "Stage finished"
        );
    }
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span and returns the duration.
    #[must_use]
    pub fn finish(self) -> f64 {
        let duration_ms = self.elapsed_ms();
        tracing::trace!(timer = self.name(), duration_ms, "Span finished");
        duration_ms
    }
}
