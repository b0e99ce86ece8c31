//! A scripted bridge built from a YAML description.
//!
//! Used by the CLI's `replay` command to reproduce a host's payload delivery
//! without a browser. Example:
//!
//! ```yaml
//! properties:
//!   toolOutput: null
//! accessors:
//!   getState:
//!     reject: not ready
//!   getToolOutput:
//!     delay_ms: 150
//!     value: { result: { rooms: [] } }
//! tools:
//!   confirm_booking: { ok: true }
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{AccessorFuture, HostBridge, ToolFuture};
use crate::error::{BridgeError, WidgetError};

/// Declarative form of a bridge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgeFixture {
    /// Static and enumerable properties, in enumeration order.
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub accessors: BTreeMap<String, AccessorFixture>,
    /// Canned `callTool` results by tool name. Tools not listed reject.
    #[serde(default)]
    pub tools: BTreeMap<String, Value>,
}

/// Scripted behavior of one accessor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessorFixture {
    /// Resolved value; absent means the accessor resolves to `undefined`.
    #[serde(default)]
    pub value: Option<Value>,
    /// When set, the accessor rejects with this reason instead.
    #[serde(default)]
    pub reject: Option<String>,
    #[serde(default)]
    pub delay_ms: u64,
}

impl BridgeFixture {
    /// Parse a fixture from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Fixture`] if the text is not a valid fixture.
    pub fn from_yaml(text: &str) -> Result<Self, WidgetError> {
        serde_yaml::from_str(text).map_err(|source| WidgetError::Fixture {
            context: "bridge fixture".to_string(),
            source,
        })
    }
}

/// [`HostBridge`] implementation driven by a [`BridgeFixture`].
///
/// Each property value is allocated once, so repeated reads return the same
/// `Arc` just as a host object returns the same reference.
#[derive(Debug)]
pub struct FixtureBridge {
    properties: Vec<(String, Arc<Value>)>,
    accessors: BTreeMap<String, AccessorFixture>,
    tools: BTreeMap<String, Value>,
    tool_calls: Mutex<Vec<(String, Value)>>,
}

impl FixtureBridge {
    #[must_use]
    pub fn new(fixture: BridgeFixture) -> Self {
        Self {
            properties: fixture
                .properties
                .into_iter()
                .map(|(key, value)| (key, Arc::new(value)))
                .collect(),
            accessors: fixture.accessors,
            tools: fixture.tools,
            tool_calls: Mutex::new(Vec::new()),
        }
    }

    /// Every `callTool` invocation received so far, oldest first.
    #[must_use]
    pub fn tool_calls(&self) -> Vec<(String, Value)> {
        self.tool_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HostBridge for FixtureBridge {
    fn property(&self, key: &str) -> Option<Arc<Value>> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| Arc::clone(v))
    }

    fn own_properties(&self) -> Vec<(String, Arc<Value>)> {
        self.properties.clone()
    }

    fn accessor(&self, name: &str) -> Option<AccessorFuture<'_>> {
        let script = self.accessors.get(name)?.clone();
        let method = name.to_string();
        Some(
            async move {
                if script.delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(script.delay_ms)).await;
                }
                match script.reject {
                    Some(reason) => Err(BridgeError::Rejected { method, reason }),
                    None => Ok(script.value.map(Arc::new)),
                }
            }
            .boxed(),
        )
    }

    fn call_tool(&self, name: &str, args: Value) -> Option<ToolFuture<'_>> {
        self.tool_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), args));
        let outcome = self.tools.get(name).cloned().ok_or_else(|| BridgeError::Rejected {
            method: format!("callTool({name})"),
            reason: "unknown tool".to_string(),
        });
        Some(async move { outcome }.boxed())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::bridge::collect_candidates;

    const YAML: &str = r"
properties:
  toolOutput:
    rooms: []
  custom: hello
accessors:
  getState:
    reject: not ready
  getContext: {}
  getToolOutput:
    delay_ms: 20
    value:
      booking_id: BK-1
tools:
  confirm_booking:
    ok: true
";

    #[test]
    fn parses_yaml_fixture() {
        let fixture = BridgeFixture::from_yaml(YAML).unwrap();
        assert_eq!(fixture.properties.len(), 2);
        assert_eq!(fixture.accessors["getState"].reject.as_deref(), Some("not ready"));
        assert!(fixture.accessors["getContext"].value.is_none());
        assert_eq!(fixture.tools["confirm_booking"], json!({"ok": true}));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let result = BridgeFixture::from_yaml("properties: [unclosed");
        assert!(matches!(result, Err(WidgetError::Fixture { .. })));
    }

    #[test]
    fn property_reads_return_the_same_allocation() {
        let bridge = FixtureBridge::new(BridgeFixture::from_yaml(YAML).unwrap());
        let a = bridge.property("toolOutput").unwrap();
        let b = bridge.own_properties().remove(0).1;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test(start_paused = true)]
    async fn fixture_bridge_feeds_candidate_collection() {
        let bridge = FixtureBridge::new(BridgeFixture::from_yaml(YAML).unwrap());
        let set = collect_candidates(&bridge, None).await;
        let values: Vec<Value> = set.iter().cloned().collect();
        assert_eq!(
            values,
            vec![json!({"rooms": []}), json!({"booking_id": "BK-1"}), json!("hello")]
        );
    }

    #[tokio::test]
    async fn call_tool_records_invocations() {
        let bridge = FixtureBridge::new(BridgeFixture::from_yaml(YAML).unwrap());
        let ok = bridge
            .call_tool("confirm_booking", json!({"booking_id": "BK-1"}))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(ok, json!({"ok": true}));

        let missing = bridge.call_tool("cancel_booking", json!({})).unwrap().await;
        assert!(matches!(missing, Err(BridgeError::Rejected { .. })));

        let calls = bridge.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "confirm_booking");
    }
}
