//! Widget mount lifecycle: bootstrap, then bridge polling raced against
//! host messages.
//!
//! ```text
//! Idle ──(bootstrap hit)──────────────────────────────▶ Resolved
//! Polling ──(tick hit | message hit)──────────────────▶ Resolved
//! Polling ──(budget spent)──▶ Exhausted ──(message hit)▶ Resolved
//! ```
//!
//! The first resolution wins and is never replaced. Every transition goes
//! through [`Shared::settle`], which refuses to act once the widget is
//! unmounted.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use monobook_core::{AppConfig, PollSchedule};
use serde_json::Value;
use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;

use crate::bootstrap::BootstrapSources;
use crate::bridge::BridgeSlot;
use crate::coerce::Record;
use crate::extract::Extractor;
use crate::poll::BridgePoller;
use crate::schema::PayloadSchema;

/// Where a resolved payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    Bootstrap,
    Bridge,
    Message,
}

impl std::fmt::Display for PayloadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadSource::Bootstrap => write!(f, "bootstrap"),
            PayloadSource::Bridge => write!(f, "bridge"),
            PayloadSource::Message => write!(f, "message"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Resolved {
        payload: Arc<Record>,
        source: PayloadSource,
    },
    /// Every poll attempt failed. A later host message may still resolve.
    Exhausted,
}

impl LoadState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    #[must_use]
    pub fn payload(&self) -> Option<&Record> {
        match self {
            LoadState::Resolved { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

/// Per-widget settings derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub schema: PayloadSchema,
    pub schedule: PollSchedule,
    pub max_extract_depth: usize,
    pub call_timeout: Option<std::time::Duration>,
}

impl WidgetConfig {
    #[must_use]
    pub fn from_app_config(schema: PayloadSchema, config: &AppConfig) -> Self {
        Self {
            schema,
            schedule: config.poll_schedule,
            max_extract_depth: config.max_extract_depth,
            call_timeout: config.bridge_call_timeout,
        }
    }

    fn extractor(&self) -> Extractor {
        Extractor::new(self.schema).with_max_depth(self.max_extract_depth)
    }
}

/// Everything the widget reads from its host, injected at mount.
#[derive(Debug)]
pub struct MountSources {
    pub bootstrap: BootstrapSources,
    pub bridge: BridgeSlot,
    /// Inbound cross-frame messages (the `data` of each `message` event).
    pub messages: mpsc::UnboundedReceiver<Value>,
}

struct Shared {
    state: watch::Sender<LoadState>,
    cancelled: AtomicBool,
    attempts: AtomicU32,
    stop: Notify,
}

impl Shared {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn is_resolved(&self) -> bool {
        matches!(*self.state.borrow(), LoadState::Resolved { .. })
    }

    /// Apply `next` if the widget is still mounted and the transition is
    /// legal. Returns `true` if the state changed.
    fn settle(&self, next: LoadState) -> bool {
        self.state.send_if_modified(|current| {
            if self.is_cancelled() {
                return false;
            }
            let allowed = match (&*current, &next) {
                (LoadState::Loading, _) => !next.is_loading(),
                (LoadState::Exhausted, LoadState::Resolved { .. }) => true,
                _ => false,
            };
            if allowed {
                *current = next;
            }
            allowed
        })
    }

    fn cancel(&self) {
        // Flip the flag under the state lock so no settle can straddle it.
        self.state.send_if_modified(|_| {
            self.cancelled.store(true, Ordering::Release);
            false
        });
        self.stop.notify_one();
    }
}

/// Mount a widget.
///
/// Bootstrap sources are read synchronously before this returns; if they
/// yield a payload the widget starts out resolved and nothing is spawned.
/// Otherwise a poller task and a message listener task are spawned on the
/// current tokio runtime.
///
/// # Panics
///
/// Panics if called outside a tokio runtime and the bootstrap sources do not
/// resolve.
#[must_use]
pub fn mount(config: &WidgetConfig, sources: MountSources) -> WidgetHandle {
    let extractor = config.extractor();

    if let Some(payload) = sources.bootstrap.read(&extractor) {
        let (tx, rx) = watch::channel(LoadState::Resolved {
            payload: Arc::new(payload),
            source: PayloadSource::Bootstrap,
        });
        return WidgetHandle {
            state: rx,
            shared: Arc::new(Shared {
                state: tx,
                cancelled: AtomicBool::new(false),
                attempts: AtomicU32::new(0),
                stop: Notify::new(),
            }),
            listener: None,
        };
    }

    let (tx, rx) = watch::channel(LoadState::Loading);
    let shared = Arc::new(Shared {
        state: tx,
        cancelled: AtomicBool::new(false),
        attempts: AtomicU32::new(0),
        stop: Notify::new(),
    });

    tracing::info!(schema = %config.schema, total_attempts = config.schedule.total_attempts(), "widget mounted; polling host bridge");

    let poller = BridgePoller::new(extractor, sources.bridge, config.call_timeout);
    // The poller is detached: unmount stops it at its next resumption point
    // rather than dropping an in-flight bridge call.
    tokio::spawn(run_poller(Arc::clone(&shared), poller, config.schedule));
    let listener = tokio::spawn(run_listener(
        Arc::clone(&shared),
        extractor,
        sources.messages,
    ));

    WidgetHandle {
        state: rx,
        shared,
        listener: Some(listener),
    }
}

async fn run_poller(shared: Arc<Shared>, poller: BridgePoller, schedule: PollSchedule) {
    loop {
        if shared.is_cancelled() || !shared.state.borrow().is_loading() {
            return;
        }

        let found = poller.poll_once().await;
        let attempt = shared.attempts.fetch_add(1, Ordering::AcqRel) + 1;

        // Results landing after unmount or after another source won are
        // discarded here.
        if shared.is_cancelled() || !shared.state.borrow().is_loading() {
            return;
        }

        if let Some(payload) = found {
            if shared.settle(LoadState::Resolved {
                payload: Arc::new(payload),
                source: PayloadSource::Bridge,
            }) {
                tracing::info!(attempt, source = "bridge", "payload resolved");
            }
            return;
        }

        let Some(delay) = schedule.delay_after(attempt) else {
            if shared.settle(LoadState::Exhausted) {
                tracing::warn!(attempts = attempt, "poll budget exhausted without a payload");
            }
            return;
        };

        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = shared.stop.notified() => return,
        }
    }
}

async fn run_listener(
    shared: Arc<Shared>,
    extractor: Extractor,
    mut messages: mpsc::UnboundedReceiver<Value>,
) {
    while let Some(message) = messages.recv().await {
        if shared.is_cancelled() {
            return;
        }
        if shared.is_resolved() {
            continue;
        }
        let Some(payload) = extractor.extract(&message) else {
            tracing::debug!("host message carried no recognizable payload");
            continue;
        };
        if shared.settle(LoadState::Resolved {
            payload: Arc::new(payload),
            source: PayloadSource::Message,
        }) {
            tracing::info!(source = "message", "payload resolved");
        }
    }
}

/// Owner of a mounted widget. Dropping it unmounts the widget.
pub struct WidgetHandle {
    state: watch::Receiver<LoadState>,
    shared: Arc<Shared>,
    listener: Option<JoinHandle<()>>,
}

impl WidgetHandle {
    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Number of completed poll ticks so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.shared.attempts.load(Ordering::Acquire)
    }

    /// A receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.clone()
    }

    /// Wait until loading ends (resolved or exhausted) and return that state.
    pub async fn settled(&mut self) -> LoadState {
        let settled = self
            .state
            .wait_for(|s| !s.is_loading())
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.state())
    }

    /// Cancel the retry timer and detach the message listener. In-flight
    /// bridge calls are left to finish; their results are discarded.
    /// Calling this more than once is harmless.
    pub fn unmount(&mut self) {
        if self.shared.is_cancelled() {
            return;
        }
        self.shared.cancel();
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        tracing::debug!("widget unmounted");
    }

    #[must_use]
    pub fn is_unmounted(&self) -> bool {
        self.shared.is_cancelled()
    }
}

impl Drop for WidgetHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for WidgetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetHandle")
            .field("state", &*self.state.borrow())
            .field("attempts", &self.attempts())
            .field("unmounted", &self.is_unmounted())
            .finish()
    }
}
