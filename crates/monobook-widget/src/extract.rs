//! Recursive payload extraction.
//!
//! Tries unwrap strategies in priority order (`structuredContent`, wrapper
//! keys, serialized `content[].text` blocks, the record itself, its direct
//! children) and returns the first record the schema recognizes. The first
//! structurally trusted match wins, not the best one.

use std::borrow::Cow;

use serde_json::Value;

use crate::coerce::{coerce_record, Record};
use crate::schema::PayloadSchema;

/// Envelope keys searched, in order, for a nested payload.
pub const WRAPPER_KEYS: [&str; 9] = [
    "result",
    "output",
    "data",
    "response",
    "toolResult",
    "tool_result",
    "toolOutput",
    "tool_output",
    "value",
];

pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Locates a domain payload inside a candidate value of unknown shape.
///
/// Extraction is pure: the same input always yields the same output and the
/// input is never modified. Malformed input is never an error, only "no
/// payload".
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    schema: PayloadSchema,
    max_depth: usize,
}

impl Extractor {
    #[must_use]
    pub fn new(schema: PayloadSchema) -> Self {
        Self {
            schema,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Caps how many wrapper levels the search descends. Branches nested
    /// deeper than `max_depth` are treated as containing no payload.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn schema(&self) -> PayloadSchema {
        self.schema
    }

    /// Returns the first record in `candidate` that this extractor's schema
    /// recognizes, or `None`.
    #[must_use]
    pub fn extract(&self, candidate: &Value) -> Option<Record> {
        self.extract_at(candidate, 0)
    }

    fn extract_at(&self, candidate: &Value, depth: usize) -> Option<Record> {
        if depth > self.max_depth {
            tracing::debug!(
                depth,
                max_depth = self.max_depth,
                "extraction depth cap reached; abandoning branch"
            );
            return None;
        }

        let record = coerce_record(candidate)?;

        // Strategy 1: structuredContent
        if let Some(structured) = record.get("structuredContent").and_then(coerce_record) {
            if self.schema.trusts_structured_content() || self.schema.recognizes(&structured) {
                tracing::debug!(schema = %self.schema, depth, "payload found in structuredContent");
                return Some(structured.into_owned());
            }
        }

        // Strategy 2: tool-call envelope keys
        for key in WRAPPER_KEYS {
            if let Some(inner) = record.get(key) {
                if let Some(found) = self.extract_at(inner, depth + 1) {
                    return Some(found);
                }
            }
        }

        // Strategy 3: content blocks carrying serialized JSON text
        if let Some(Value::Array(blocks)) = record.get("content") {
            for block in blocks {
                let Some(text) = block
                    .as_object()
                    .and_then(|b| b.get("text"))
                    .and_then(Value::as_str)
                else {
                    continue;
                };
                let Ok(parsed) = serde_json::from_str::<Value>(text) else {
                    continue;
                };
                if let Some(found) = self.extract_at(&parsed, depth + 1) {
                    return Some(found);
                }
            }
        }

        // Strategy 4: the record itself
        if self.schema.recognizes(&record) {
            tracing::debug!(schema = %self.schema, depth, "payload matched at record level");
            return Some(record.into_owned());
        }

        // Strategy 5: any direct child that coerces to a recognized record
        let nested = record
            .values()
            .filter_map(coerce_record)
            .find(|child| self.schema.recognizes(child))
            .map(Cow::into_owned);
        if nested.is_some() {
            tracing::debug!(schema = %self.schema, depth, "payload matched in direct child");
        }
        nested
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
