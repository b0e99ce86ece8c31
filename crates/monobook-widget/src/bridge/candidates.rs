//! Harvesting candidate values from one poll of the bridge.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::HostBridge;
use crate::error::BridgeError;

/// Static properties read first, in this order.
pub const STATIC_KEYS: [&str; 10] = [
    "toolOutput",
    "output",
    "data",
    "result",
    "response",
    "toolResult",
    "tool_output",
    "tool_result",
    "state",
    "value",
];

/// Zero-argument accessors awaited after the static properties, in this order.
pub const ACCESSOR_METHODS: [&str; 4] = [
    "getInitialState",
    "getState",
    "getContext",
    "getToolOutput",
];

/// Ordered candidates from one bridge poll, deduplicated by identity.
///
/// Two structurally equal values held in different allocations are both
/// kept; only the same `Arc` seen twice is dropped.
#[derive(Debug, Default, Clone)]
pub struct CandidateSet {
    items: Vec<Arc<Value>>,
}

impl CandidateSet {
    /// Appends `candidate` unless it is `null` or already present.
    /// Returns `true` if it was added.
    pub fn push(&mut self, candidate: Arc<Value>) -> bool {
        if candidate.is_null() || self.items.iter().any(|seen| Arc::ptr_eq(seen, &candidate)) {
            return false;
        }
        self.items.push(candidate);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter().map(AsRef::as_ref)
    }
}

/// Collect every candidate the bridge currently exposes.
///
/// Order: static keys, then accessor results, then the remaining enumerable
/// properties whose keys are not static keys. Accessors are awaited one at a
/// time; a missing, failing, or timed-out accessor only loses its own
/// candidate.
pub async fn collect_candidates(
    bridge: &dyn HostBridge,
    call_timeout: Option<Duration>,
) -> CandidateSet {
    let mut set = CandidateSet::default();

    for key in STATIC_KEYS {
        if let Some(value) = bridge.property(key) {
            set.push(value);
        }
    }

    for method in ACCESSOR_METHODS {
        let Some(call) = bridge.accessor(method) else {
            continue;
        };
        let outcome = match call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| {
                    Err(BridgeError::TimedOut {
                        method: method.to_string(),
                        timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    })
                }),
            None => call.await,
        };
        match outcome {
            Ok(Some(value)) => {
                set.push(value);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::debug!(method, %error, "bridge accessor failed; skipping candidate");
            }
        }
    }

    for (key, value) in bridge.own_properties() {
        if STATIC_KEYS.contains(&key.as_str()) {
            continue;
        }
        set.push(value);
    }

    set
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use futures::FutureExt;
    use serde_json::json;

    use super::*;
    use crate::bridge::AccessorFuture;

    /// Bridge whose members are all supplied by the test.
    #[derive(Default)]
    struct TestBridge {
        properties: HashMap<String, Arc<Value>>,
        enumerable: Vec<(String, Arc<Value>)>,
        accessors: HashMap<String, Result<Option<Arc<Value>>, BridgeError>>,
        hanging: Vec<String>,
    }

    impl HostBridge for TestBridge {
        fn property(&self, key: &str) -> Option<Arc<Value>> {
            self.properties.get(key).cloned()
        }

        fn own_properties(&self) -> Vec<(String, Arc<Value>)> {
            self.enumerable.clone()
        }

        fn accessor(&self, name: &str) -> Option<AccessorFuture<'_>> {
            if self.hanging.iter().any(|m| m == name) {
                return Some(futures::future::pending().boxed());
            }
            let outcome = self.accessors.get(name)?.clone();
            Some(async move { outcome }.boxed())
        }
    }

    fn values(set: &CandidateSet) -> Vec<Value> {
        set.iter().cloned().collect()
    }

    #[tokio::test]
    async fn empty_bridge_yields_no_candidates() {
        let set = collect_candidates(&TestBridge::default(), None).await;
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn candidates_follow_priority_order() {
        let mut bridge = TestBridge::default();
        bridge
            .properties
            .insert("value".into(), Arc::new(json!("static-value")));
        bridge
            .properties
            .insert("toolOutput".into(), Arc::new(json!("static-toolOutput")));
        bridge
            .accessors
            .insert("getToolOutput".into(), Ok(Some(Arc::new(json!("accessor-last")))));
        bridge
            .accessors
            .insert("getInitialState".into(), Ok(Some(Arc::new(json!("accessor-first")))));
        bridge
            .enumerable
            .push(("widgetState".into(), Arc::new(json!("enumerable"))));

        let set = collect_candidates(&bridge, None).await;
        assert_eq!(
            values(&set),
            vec![
                json!("static-toolOutput"),
                json!("static-value"),
                json!("accessor-first"),
                json!("accessor-last"),
                json!("enumerable"),
            ]
        );
    }

    #[tokio::test]
    async fn failing_accessor_is_isolated() {
        let mut bridge = TestBridge::default();
        bridge.accessors.insert(
            "getInitialState".into(),
            Err(BridgeError::Rejected {
                method: "getInitialState".into(),
                reason: "not ready".into(),
            }),
        );
        bridge
            .accessors
            .insert("getState".into(), Ok(Some(Arc::new(json!({"rooms": []})))));
        bridge.accessors.insert("getContext".into(), Ok(None));

        let set = collect_candidates(&bridge, None).await;
        assert_eq!(values(&set), vec![json!({"rooms": []})]);
    }

    #[tokio::test]
    async fn same_allocation_is_kept_once() {
        let shared = Arc::new(json!({"rooms": []}));
        let mut bridge = TestBridge::default();
        bridge.properties.insert("toolOutput".into(), Arc::clone(&shared));
        bridge.properties.insert("output".into(), Arc::clone(&shared));
        bridge
            .accessors
            .insert("getToolOutput".into(), Ok(Some(Arc::clone(&shared))));
        bridge.enumerable.push(("extra".into(), Arc::clone(&shared)));

        let set = collect_candidates(&bridge, None).await;
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn equal_values_in_distinct_allocations_are_both_kept() {
        let mut bridge = TestBridge::default();
        bridge
            .properties
            .insert("toolOutput".into(), Arc::new(json!({"rooms": []})));
        bridge
            .properties
            .insert("output".into(), Arc::new(json!({"rooms": []})));

        let set = collect_candidates(&bridge, None).await;
        assert_eq!(set.len(), 2);
    }

    #[tokio::test]
    async fn enumerable_static_keys_and_nulls_are_skipped() {
        let mut bridge = TestBridge::default();
        bridge
            .enumerable
            .push(("toolOutput".into(), Arc::new(json!("covered"))));
        bridge.enumerable.push(("empty".into(), Arc::new(Value::Null)));
        bridge
            .enumerable
            .push(("custom".into(), Arc::new(json!("kept"))));

        let set = collect_candidates(&bridge, None).await;
        assert_eq!(values(&set), vec![json!("kept")]);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_accessor_is_abandoned_after_timeout() {
        let mut bridge = TestBridge::default();
        bridge.hanging.push("getState".into());
        bridge
            .accessors
            .insert("getContext".into(), Ok(Some(Arc::new(json!("after")))));

        let set = collect_candidates(&bridge, Some(Duration::from_millis(100))).await;
        assert_eq!(values(&set), vec![json!("after")]);
    }
}
