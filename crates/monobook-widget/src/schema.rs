//! Recognizing domain payloads by their keys.
//!
//! The host's payload shape is not contractually fixed. One recognized key
//! is enough: a false positive renders with defaults, a false negative
//! renders nothing.

use crate::coerce::Record;

/// Keys whose presence marks a room search (or hotel list) payload.
pub const ROOM_SEARCH_KEYS: [&str; 5] = ["rooms", "hotels", "count", "property_name", "error"];

/// Keys that must all be present for a booking payload lacking `booking_id`.
pub const BOOKING_CO_KEYS: [&str; 3] = ["status", "total", "check_in"];

/// The domain schema a widget variant expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSchema {
    RoomSearch,
    Booking,
}

impl PayloadSchema {
    /// Returns `true` if `record` looks like this schema's payload.
    #[must_use]
    pub fn recognizes(self, record: &Record) -> bool {
        match self {
            PayloadSchema::RoomSearch => ROOM_SEARCH_KEYS.iter().any(|k| record.contains_key(*k)),
            PayloadSchema::Booking => {
                record.contains_key("booking_id")
                    || BOOKING_CO_KEYS.iter().all(|k| record.contains_key(*k))
            }
        }
    }

    /// Whether a coercible `structuredContent` field is accepted without
    /// passing [`PayloadSchema::recognizes`].
    #[must_use]
    pub fn trusts_structured_content(self) -> bool {
        matches!(self, PayloadSchema::RoomSearch)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PayloadSchema::RoomSearch => "room_search",
            PayloadSchema::Booking => "booking",
        }
    }
}

impl std::fmt::Display for PayloadSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
