//! Single poll tick against the host bridge.

use std::time::Duration;

use crate::bridge::{collect_candidates, BridgeSlot};
use crate::coerce::Record;
use crate::extract::Extractor;

/// Looks for a payload among everything the bridge currently exposes.
#[derive(Debug, Clone)]
pub struct BridgePoller {
    extractor: Extractor,
    slot: BridgeSlot,
    call_timeout: Option<Duration>,
}

impl BridgePoller {
    #[must_use]
    pub fn new(extractor: Extractor, slot: BridgeSlot, call_timeout: Option<Duration>) -> Self {
        Self {
            extractor,
            slot,
            call_timeout,
        }
    }

    /// Run one tick. A missing bridge or a bridge with nothing recognizable
    /// both yield `None`; neither is an error.
    pub async fn poll_once(&self) -> Option<Record> {
        let Some(bridge) = self.slot.current() else {
            tracing::debug!("no host bridge installed yet");
            return None;
        };

        let candidates = collect_candidates(bridge.as_ref(), self.call_timeout).await;
        let found = candidates.iter().find_map(|c| self.extractor.extract(c));
        tracing::debug!(
            candidates = candidates.len(),
            matched = found.is_some(),
            "polled host bridge"
        );
        found
    }
}
