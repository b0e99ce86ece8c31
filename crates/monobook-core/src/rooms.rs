use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A room search result, normalized from whatever shape the host delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomSearchResult {
    /// Payload-level property id, used as a fallback when a room has none.
    pub property_id: Option<String>,
    pub property_name: Option<String>,
    pub rooms: Vec<Room>,
    pub hotels: Vec<Hotel>,
    /// Result count as reported by the tool, or the item count when absent.
    pub count: usize,
    /// Informational text from the tool (e.g. "No rooms for those dates").
    pub message: Option<String>,
    /// Tool-reported failure; when set the widget shows it instead of cards.
    pub error: Option<String>,
}

impl RoomSearchResult {
    /// Returns `true` when there is nothing to render as a card.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty() && self.hotels.is_empty()
    }

    /// Property id of the first hotel in the list, if any.
    #[must_use]
    pub fn first_hotel_property_id(&self) -> Option<&str> {
        self.hotels.first().and_then(|h| h.property_id.as_deref())
    }

    /// Resolve the property id to report when `room` is selected.
    ///
    /// Order: the room's own id, the payload-level id, the first hotel's id.
    #[must_use]
    pub fn property_id_for(&self, room: &Room) -> Option<String> {
        room.property_id
            .as_deref()
            .or(self.property_id.as_deref())
            .or_else(|| self.first_hotel_property_id())
            .map(str::to_string)
    }

    #[must_use]
    pub fn find_room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == room_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub property_id: Option<String>,
    pub description: Option<String>,
    pub price_per_night: Option<Decimal>,
    /// ISO 4217 code; `None` means the configured default applies.
    pub currency: Option<String>,
    pub max_guests: Option<u32>,
    pub bed_type: Option<String>,
    pub amenities: Vec<String>,
    /// Rooms are assumed bookable unless the payload says otherwise.
    pub available: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub property_id: Option<String>,
    pub name: String,
    pub city: Option<String>,
    pub rating: Option<Decimal>,
    pub rooms_available: Option<u32>,
}
