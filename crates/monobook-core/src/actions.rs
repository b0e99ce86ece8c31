//! Outbound user actions and their wire shapes.
//!
//! Each action is announced twice: as a same-document custom event and as a
//! `{ "type", "detail" }` message to the parent frame. Both carry the same
//! detail record.

use serde::{Deserialize, Serialize};

pub const ROOM_SELECT_EVENT: &str = "monobook:room-select";
pub const ROOM_SELECT_MESSAGE: &str = "monobook.room_select";
pub const BOOKING_CONFIRM_EVENT: &str = "monobook:booking-confirm";
pub const BOOKING_CONFIRM_MESSAGE: &str = "monobook.booking_confirm";

/// Detail emitted when the user picks a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSelection {
    pub room_id: String,
    pub room_name: String,
    pub property_id: Option<String>,
}

/// Detail emitted when the user confirms a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_id: Option<String>,
    pub status: Option<String>,
    pub property_id: Option<String>,
}

/// Cross-frame envelope posted to the parent frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage<D> {
    #[serde(rename = "type")]
    pub kind: String,
    pub detail: D,
}
