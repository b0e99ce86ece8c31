//! Normalization from extracted records to [`monobook_core`] display types.
//!
//! Hosts name the same field many ways (`room_id` / `roomId` / `id`, prices
//! as numbers or `"$189.00"` strings, nested `room.name` objects). Each field
//! is looked up through a fixed alias list; whatever is missing is left
//! empty and the card defaults it.

use std::str::FromStr;

use chrono::NaiveDate;
use monobook_core::{BookingRecord, Hotel, PricingBreakdown, Room, RoomSearchResult};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::coerce::{coerce_record, Record};
use crate::schema::PayloadSchema;

/// A normalized payload ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayPayload {
    Rooms(RoomSearchResult),
    Booking(BookingRecord),
}

/// Normalize `record` according to the widget's schema.
#[must_use]
pub fn normalize(schema: PayloadSchema, record: &Record) -> DisplayPayload {
    match schema {
        PayloadSchema::RoomSearch => DisplayPayload::Rooms(normalize_room_search(record)),
        PayloadSchema::Booking => DisplayPayload::Booking(normalize_booking(record)),
    }
}

#[must_use]
pub fn normalize_room_search(record: &Record) -> RoomSearchResult {
    let rooms: Vec<Room> = list_field(record, &["rooms", "available_rooms"])
        .iter()
        .enumerate()
        .filter_map(|(idx, raw)| normalize_room(raw, idx))
        .collect();
    let hotels: Vec<Hotel> = list_field(record, &["hotels", "properties"])
        .iter()
        .filter_map(normalize_hotel)
        .collect();

    let count = u32_field(record, &["count", "total_count", "total_results"])
        .and_then(|c| usize::try_from(c).ok())
        .unwrap_or(if rooms.is_empty() {
            hotels.len()
        } else {
            rooms.len()
        });

    RoomSearchResult {
        property_id: string_field(record, &["property_id", "propertyId", "hotel_id"]),
        property_name: string_field(record, &["property_name", "propertyName", "hotel_name"]),
        rooms,
        hotels,
        count,
        message: string_field(record, &["message", "summary"]),
        error: error_field(record),
    }
}

fn normalize_room(raw: &Value, idx: usize) -> Option<Room> {
    let room = coerce_record(raw)?;
    let price = lookup(&room, &["price_per_night", "nightly_rate", "rate", "price"]);

    Some(Room {
        id: string_field(&room, &["id", "room_id", "roomId", "code"])
            .unwrap_or_else(|| format!("room-{}", idx + 1)),
        name: string_field(
            &room,
            &["name", "room_name", "roomName", "title", "room_type", "type"],
        )
        .unwrap_or_else(|| "Room".to_string()),
        property_id: string_field(&room, &["property_id", "propertyId", "hotel_id", "hotelId"]),
        description: string_field(&room, &["description", "summary"]),
        // Prices sometimes arrive as `{ "amount": 189, "currency": "EUR" }`.
        price_per_night: price.and_then(|p| value_as_decimal(p.get("amount").unwrap_or(p))),
        currency: string_field(&room, &["currency", "currency_code"])
            .or_else(|| price.and_then(|p| p.get("currency")).and_then(value_as_string)),
        max_guests: u32_field(&room, &["max_guests", "maxGuests", "capacity", "occupancy"]),
        bed_type: string_field(&room, &["bed_type", "bedType", "beds"]),
        amenities: string_list_field(&room, &["amenities", "features"]),
        available: bool_field(&room, &["available", "is_available"]).unwrap_or(true),
    })
}

fn normalize_hotel(raw: &Value) -> Option<Hotel> {
    let hotel = coerce_record(raw)?;
    Some(Hotel {
        property_id: string_field(&hotel, &["property_id", "propertyId", "hotel_id", "id"]),
        name: string_field(&hotel, &["name", "property_name", "hotel_name", "title"])
            .unwrap_or_else(|| "Hotel".to_string()),
        city: string_field(&hotel, &["city", "location.city", "address.city"]),
        rating: lookup(&hotel, &["rating", "stars"]).and_then(value_as_decimal),
        rooms_available: u32_field(&hotel, &["rooms_available", "available_rooms", "room_count"]),
    })
}

#[must_use]
pub fn normalize_booking(record: &Record) -> BookingRecord {
    // Pricing may be nested under its own object or spread at top level.
    let pricing_obj = lookup(record, &["pricing", "price_breakdown", "priceBreakdown"])
        .and_then(coerce_record);
    let pricing_src: &Record = pricing_obj.as_deref().unwrap_or(record);

    let pricing = PricingBreakdown {
        nightly_rate: decimal_field(pricing_src, &["nightly_rate", "rate", "price_per_night"]),
        subtotal: decimal_field(pricing_src, &["subtotal", "sub_total"]),
        taxes: decimal_field(pricing_src, &["taxes", "tax"]),
        fees: decimal_field(pricing_src, &["fees", "fee", "service_fee"]),
        total: decimal_field(pricing_src, &["total", "total_price", "amount"])
            .or_else(|| decimal_field(record, &["total", "total_price"])),
        currency: string_field(pricing_src, &["currency", "currency_code"])
            .or_else(|| string_field(record, &["currency", "currency_code"])),
    };

    BookingRecord {
        booking_id: string_field(
            record,
            &["booking_id", "bookingId", "confirmation_number", "id"],
        ),
        status: string_field(record, &["status", "booking_status"]).map(|s| s.to_lowercase()),
        check_in: date_field(record, &["check_in", "checkIn", "arrival"]),
        check_out: date_field(record, &["check_out", "checkOut", "departure"]),
        nights: u32_field(record, &["nights", "num_nights"]),
        guests: u32_field(record, &["guests", "guest_count", "adults"]),
        guest_name: string_field(record, &["guest_name", "guestName", "guest.name"]),
        room_name: string_field(record, &["room_name", "roomName", "room.name", "room_type"]),
        property_id: string_field(
            record,
            &["property_id", "propertyId", "hotel_id", "property.id"],
        ),
        property_name: string_field(
            record,
            &["property_name", "propertyName", "hotel_name", "property.name"],
        ),
        pricing,
        error: error_field(record),
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// First present, non-null value among `aliases`. An alias containing `.`
/// is a path into nested objects.
fn lookup<'a>(record: &'a Record, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| {
        let mut parts = alias.split('.');
        let first = record.get(parts.next()?)?;
        parts
            .try_fold(first, |node, key| node.get(key))
            .filter(|v| !v.is_null())
    })
}

fn string_field(record: &Record, aliases: &[&str]) -> Option<String> {
    lookup(record, aliases).and_then(value_as_string)
}

fn decimal_field(record: &Record, aliases: &[&str]) -> Option<Decimal> {
    lookup(record, aliases).and_then(value_as_decimal)
}

fn u32_field(record: &Record, aliases: &[&str]) -> Option<u32> {
    lookup(record, aliases).and_then(|v| {
        v.as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<u32>().ok()))
    })
}

fn bool_field(record: &Record, aliases: &[&str]) -> Option<bool> {
    lookup(record, aliases).and_then(|v| {
        v.as_bool()
            .or_else(|| match v.as_str()?.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            })
    })
}

fn date_field(record: &Record, aliases: &[&str]) -> Option<NaiveDate> {
    let raw = lookup(record, aliases)?.as_str()?.trim();
    // Accept date-times by keeping the `YYYY-MM-DD` prefix.
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn list_field<'a>(record: &'a Record, aliases: &[&str]) -> &'a [Value] {
    lookup(record, aliases)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Strings from an array of strings (or `{ "name": ... }` objects), or from
/// a comma-separated string.
fn string_list_field(record: &Record, aliases: &[&str]) -> Vec<String> {
    match lookup(record, aliases) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                value_as_string(item).or_else(|| item.get("name").and_then(value_as_string))
            })
            .collect(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Tool errors arrive as a string or as `{ "message": ... }`.
fn error_field(record: &Record) -> Option<String> {
    const GENERIC: &str = "Something went wrong.";
    let error = lookup(record, &["error"])?;
    match error {
        Value::Bool(false) => None,
        Value::String(_) => value_as_string(error),
        Value::Object(obj) => obj
            .get("message")
            .and_then(value_as_string)
            .or_else(|| Some(GENERIC.to_string())),
        _ => Some(GENERIC.to_string()),
    }
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numbers, or strings such as `"189.00"`, `"$1,249.50"`, `"EUR 90"`.
fn value_as_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
            .collect(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
