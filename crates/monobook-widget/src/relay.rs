//! Outbound user actions.
//!
//! Each action goes out twice with the same detail: as a custom event on the
//! widget's own document and as a `{ type, detail }` message to the parent
//! frame. Delivery failures are logged and never reach the caller.

use std::sync::Arc;

use monobook_core::actions::{
    BOOKING_CONFIRM_EVENT, BOOKING_CONFIRM_MESSAGE, ROOM_SELECT_EVENT, ROOM_SELECT_MESSAGE,
};
use monobook_core::{
    BookingConfirmation, BookingRecord, OutboundMessage, Room, RoomSearchResult, RoomSelection,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::bridge::BridgeSlot;
use crate::error::{RelayError, WidgetError};

pub const CONFIRM_BOOKING_TOOL: &str = "confirm_booking";

/// Where outbound actions are delivered.
pub trait ActionSink: Send + Sync {
    /// Dispatch a custom event on the widget's own document.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Dispatch`] if the event could not be dispatched.
    fn dispatch_event(&self, name: &str, detail: &Value) -> Result<(), RelayError>;

    /// Post a message to the parent frame, with no origin restriction.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ParentUnreachable`] if there is no parent to
    /// receive it.
    fn post_to_parent(&self, message: &Value) -> Result<(), RelayError>;
}

#[derive(Clone)]
pub struct ActionRelay {
    sink: Arc<dyn ActionSink>,
    bridge: BridgeSlot,
}

impl ActionRelay {
    #[must_use]
    pub fn new(sink: Arc<dyn ActionSink>, bridge: BridgeSlot) -> Self {
        Self { sink, bridge }
    }

    /// Announce that `room` was picked from `result`.
    pub fn select_room(&self, result: &RoomSearchResult, room: &Room) -> RoomSelection {
        let selection = RoomSelection {
            room_id: room.id.clone(),
            room_name: room.name.clone(),
            property_id: result.property_id_for(room),
        };
        self.announce(ROOM_SELECT_EVENT, ROOM_SELECT_MESSAGE, &selection);
        selection
    }

    /// Announce a booking confirmation and ask the host to confirm it, if
    /// the bridge can call tools.
    pub async fn confirm_booking(&self, booking: &BookingRecord) -> BookingConfirmation {
        let confirmation = BookingConfirmation {
            booking_id: booking.booking_id.clone(),
            status: booking.status.clone(),
            property_id: booking.property_id.clone(),
        };
        self.announce(BOOKING_CONFIRM_EVENT, BOOKING_CONFIRM_MESSAGE, &confirmation);

        if let Some(booking_id) = &booking.booking_id {
            self.call_confirm_tool(booking_id).await;
        }
        confirmation
    }

    async fn call_confirm_tool(&self, booking_id: &str) {
        let Some(bridge) = self.bridge.current() else {
            tracing::debug!(booking_id, "no host bridge; skipping confirm tool call");
            return;
        };
        let Some(call) = bridge.call_tool(CONFIRM_BOOKING_TOOL, json!({ "booking_id": booking_id }))
        else {
            tracing::debug!(booking_id, "host bridge cannot call tools");
            return;
        };
        match call.await {
            Ok(result) => {
                tracing::info!(booking_id, tool = CONFIRM_BOOKING_TOOL, %result, "host tool completed");
            }
            Err(error) => {
                tracing::warn!(booking_id, tool = CONFIRM_BOOKING_TOOL, %error, "host tool failed");
            }
        }
    }

    fn announce<D: Serialize>(&self, event: &str, message_type: &str, detail: &D) {
        let (detail, envelope) = match envelope(message_type, detail) {
            Ok(pair) => pair,
            Err(error) => {
                tracing::warn!(event, %error, "could not serialize action detail");
                return;
            }
        };

        if let Err(error) = self.sink.dispatch_event(event, &detail) {
            tracing::warn!(event, %error, "custom event dispatch failed");
        }
        if let Err(error) = self.sink.post_to_parent(&envelope) {
            tracing::warn!(message_type, %error, "cross-frame message not delivered");
        }
    }
}

/// The detail record and the `{ type, detail }` envelope carrying it.
fn envelope<D: Serialize>(message_type: &str, detail: &D) -> Result<(Value, Value), WidgetError> {
    let detail = serde_json::to_value(detail)?;
    let envelope = serde_json::to_value(OutboundMessage {
        kind: message_type.to_string(),
        detail: &detail,
    })?;
    Ok((detail, envelope))
}

impl std::fmt::Debug for ActionRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRelay")
            .field("bridge", &self.bridge)
            .finish_non_exhaustive()
    }
}
