//! `replay`: mount a widget against a scripted host.
//!
//! A replay fixture describes everything the host would do:
//!
//! ```yaml
//! bootstrap:
//!   query: "?lang=en"
//! bridge_after_ms: 400
//! bridge:
//!   accessors:
//!     getToolOutput:
//!       delay_ms: 150
//!       value: { result: { rooms: [{ id: r-1, name: Deluxe }] } }
//! messages:
//!   - at_ms: 2000
//!     data: { structuredContent: { rooms: [] } }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use monobook_core::AppConfig;
use monobook_widget::relay::ActionRelay;
use monobook_widget::{
    mount, normalize, render, ActionSink, BootstrapSources, BridgeFixture, BridgeSlot,
    DisplayPayload, FixtureBridge, LoadState, MountSources, PayloadSchema, RelayError,
    WidgetConfig,
};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// How long to keep listening for late messages after the poller gives up.
const LATE_MESSAGE_GRACE: Duration = Duration::from_millis(100);

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReplayFixture {
    #[serde(default)]
    pub bootstrap: BootstrapFixture,
    /// The host's bridge; absent means the host never installs one.
    #[serde(default)]
    pub bridge: Option<BridgeFixture>,
    /// Delay before the bridge is installed.
    #[serde(default)]
    pub bridge_after_ms: u64,
    #[serde(default)]
    pub messages: Vec<ScheduledMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BootstrapFixture {
    /// Text of the bootstrap script element.
    pub element: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduledMessage {
    #[serde(default)]
    pub at_ms: u64,
    pub data: Value,
}

impl ReplayFixture {
    pub(crate) fn from_yaml(text: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(text).context("invalid replay fixture")
    }
}

/// User actions to perform once the widget settles.
#[derive(Debug, Default)]
pub(crate) struct ReplayActions {
    pub select_room: Option<String>,
    pub confirm: bool,
}

/// Prints outbound actions to stdout.
struct StdoutSink;

impl ActionSink for StdoutSink {
    fn dispatch_event(&self, name: &str, detail: &Value) -> Result<(), RelayError> {
        println!("event {name} {detail}");
        Ok(())
    }

    fn post_to_parent(&self, message: &Value) -> Result<(), RelayError> {
        println!("post {message}");
        Ok(())
    }
}

/// Mount a widget against the fixture at `path`, print its settled view,
/// then perform `actions`. Returns the state the widget settled on.
///
/// # Errors
///
/// Returns an error if the fixture cannot be read or parsed, or if an
/// action names something the payload does not contain.
pub(crate) async fn run_replay(
    config: &AppConfig,
    path: &Path,
    schema: PayloadSchema,
    actions: ReplayActions,
) -> anyhow::Result<LoadState> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let fixture = ReplayFixture::from_yaml(&text)?;

    let slot = BridgeSlot::empty();
    let bridge = fixture.bridge.map(|b| Arc::new(FixtureBridge::new(b)));
    if let Some(bridge) = &bridge {
        let slot = slot.clone();
        let bridge = Arc::clone(bridge);
        let after_ms = fixture.bridge_after_ms;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(after_ms)).await;
            tracing::info!(after_ms, "host bridge installed");
            slot.install(bridge);
        });
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let start = Instant::now();
    let mut messages = fixture.messages;
    messages.sort_by_key(|m| m.at_ms);
    let feeder = tokio::spawn(async move {
        for message in messages {
            tokio::time::sleep_until(start + Duration::from_millis(message.at_ms)).await;
            if tx.send(message.data).is_err() {
                return;
            }
        }
    });

    let widget_config = WidgetConfig::from_app_config(schema, config);
    let mut handle = mount(
        &widget_config,
        MountSources {
            bootstrap: BootstrapSources {
                element_text: fixture.bootstrap.element,
                query: fixture.bootstrap.query,
            },
            bridge: slot.clone(),
            messages: rx,
        },
    );

    let mut state = handle.settled().await;
    if state == LoadState::Exhausted {
        // Scheduled messages may still arrive after the poll budget runs out.
        feeder.await.context("message feeder panicked")?;
        let mut updates = handle.subscribe();
        let late = tokio::time::timeout(
            LATE_MESSAGE_GRACE,
            updates.wait_for(|s| matches!(s, LoadState::Resolved { .. })),
        )
        .await
        .ok()
        .and_then(Result::ok)
        .map(|resolved| resolved.clone());
        if let Some(resolved) = late {
            state = resolved;
        }
    }

    let source = match &state {
        LoadState::Resolved { source, .. } => source.to_string(),
        _ => "none".to_string(),
    };
    println!(
        "settled after {} poll attempt(s) in {}ms (source: {source})",
        handle.attempts(),
        start.elapsed().as_millis()
    );
    print!("{}", render(&state, schema, &config.default_currency));

    if let Some(payload) = state.payload() {
        let relay = ActionRelay::new(Arc::new(StdoutSink), slot);
        perform_actions(&relay, &normalize(schema, payload), &actions).await?;
    }
    handle.unmount();

    if let Some(bridge) = bridge {
        for (tool, args) in bridge.tool_calls() {
            println!("callTool {tool} {args}");
        }
    }
    Ok(state)
}

async fn perform_actions(
    relay: &ActionRelay,
    payload: &DisplayPayload,
    actions: &ReplayActions,
) -> anyhow::Result<()> {
    match payload {
        DisplayPayload::Rooms(result) => {
            if let Some(room_id) = &actions.select_room {
                let room = result
                    .find_room(room_id)
                    .with_context(|| format!("no room with id {room_id} in payload"))?;
                relay.select_room(result, room);
            }
        }
        DisplayPayload::Booking(booking) => {
            if actions.confirm {
                relay.confirm_booking(booking).await;
            }
        }
    }
    Ok(())
}
