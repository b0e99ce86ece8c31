//! The host bridge: a duck-typed object with no fixed interface.
//!
//! [`HostBridge`] exposes only the operations the widget probes. Every method
//! has an "absent" default, so an implementation provides exactly the
//! members its host actually has.

mod candidates;
pub mod fixture;

use std::sync::{Arc, PoisonError, RwLock};

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::BridgeError;

pub use candidates::{collect_candidates, CandidateSet, ACCESSOR_METHODS, STATIC_KEYS};
pub use fixture::{AccessorFixture, BridgeFixture, FixtureBridge};

/// Result of awaiting a zero-argument bridge accessor. `Ok(None)` is an
/// accessor that resolved to `undefined`.
pub type AccessorFuture<'a> = BoxFuture<'a, Result<Option<Arc<Value>>, BridgeError>>;

pub type ToolFuture<'a> = BoxFuture<'a, Result<Value, BridgeError>>;

pub trait HostBridge: Send + Sync {
    /// Value of a static property, if the bridge has it.
    fn property(&self, _key: &str) -> Option<Arc<Value>> {
        None
    }

    /// Enumerable own properties that are not functions, in enumeration order.
    fn own_properties(&self) -> Vec<(String, Arc<Value>)> {
        Vec::new()
    }

    /// Invoke a zero-argument accessor. `None` means the bridge has no such
    /// method.
    fn accessor(&self, _name: &str) -> Option<AccessorFuture<'_>> {
        None
    }

    /// Invoke a host tool. `None` means the bridge cannot call tools.
    fn call_tool(&self, _name: &str, _args: Value) -> Option<ToolFuture<'_>> {
        None
    }
}

/// Shared, late-bound reference to the host bridge.
///
/// Hosts may install the bridge after the widget mounts, so pollers look it
/// up on every tick instead of capturing it once.
#[derive(Clone, Default)]
pub struct BridgeSlot {
    inner: Arc<RwLock<Option<Arc<dyn HostBridge>>>>,
}

impl BridgeSlot {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bridge(bridge: Arc<dyn HostBridge>) -> Self {
        let slot = Self::default();
        slot.install(bridge);
        slot
    }

    pub fn install(&self, bridge: Arc<dyn HostBridge>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(bridge);
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn current(&self) -> Option<Arc<dyn HostBridge>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for BridgeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeSlot")
            .field("installed", &self.current().is_some())
            .finish()
    }
}
