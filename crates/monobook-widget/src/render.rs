//! Turning a load state into something a user sees.
//!
//! Every state maps to exactly one [`View`]: loading, an error message, an
//! empty state, or populated cards.

use std::fmt;

use chrono::NaiveDate;
use monobook_core::{BookingRecord, Hotel, Room, RoomSearchResult};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::normalize::{normalize, DisplayPayload};
use crate::schema::PayloadSchema;
use crate::session::LoadState;

const EMPTY_TEXT: &str = "No results found.";

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Loading,
    ErrorMessage(String),
    Empty { message: Option<String> },
    RoomCards {
        heading: Option<String>,
        count: usize,
        cards: Vec<Card>,
    },
    HotelCards { count: usize, cards: Vec<Card> },
    BookingCard(Card),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub subtitle: Option<String>,
    pub lines: Vec<String>,
    pub action: Option<CardAction>,
}

/// The button a card offers, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    SelectRoom { room_id: String },
    ConfirmBooking { booking_id: String },
}

/// Render the widget's current state.
#[must_use]
pub fn render(state: &LoadState, schema: PayloadSchema, default_currency: &str) -> View {
    match state {
        LoadState::Loading => View::Loading,
        LoadState::Exhausted => View::Empty { message: None },
        LoadState::Resolved { payload, .. } => {
            render_payload(&normalize(schema, payload), default_currency)
        }
    }
}

#[must_use]
pub fn render_payload(payload: &DisplayPayload, default_currency: &str) -> View {
    match payload {
        DisplayPayload::Rooms(result) => render_rooms(result, default_currency),
        DisplayPayload::Booking(booking) => render_booking(booking, default_currency),
    }
}

fn render_rooms(result: &RoomSearchResult, default_currency: &str) -> View {
    if let Some(error) = &result.error {
        return View::ErrorMessage(error.clone());
    }
    if !result.rooms.is_empty() {
        return View::RoomCards {
            heading: result
                .property_name
                .clone()
                .or_else(|| result.message.clone()),
            count: result.count,
            cards: result
                .rooms
                .iter()
                .map(|room| room_card(room, default_currency))
                .collect(),
        };
    }
    if !result.hotels.is_empty() {
        return View::HotelCards {
            count: result.count,
            cards: result.hotels.iter().map(hotel_card).collect(),
        };
    }
    View::Empty {
        message: result.message.clone(),
    }
}

fn room_card(room: &Room, default_currency: &str) -> Card {
    let mut lines = Vec::new();
    if let Some(description) = &room.description {
        lines.push(description.clone());
    }

    let facts: Vec<String> = [
        room.max_guests.map(|n| format!("Sleeps {n}")),
        room.bed_type.as_ref().map(|b| format!("{b} bed")),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !facts.is_empty() {
        lines.push(facts.join(" | "));
    }
    if !room.amenities.is_empty() {
        lines.push(room.amenities.join(", "));
    }
    if let Some(price) = room.price_per_night {
        let currency = room.currency.as_deref().unwrap_or(default_currency);
        lines.push(format!("{} / night", format_money(price, currency)));
    }

    Card {
        title: room.name.clone(),
        subtitle: (!room.available).then(|| "Unavailable".to_string()),
        lines,
        action: room.available.then(|| CardAction::SelectRoom {
            room_id: room.id.clone(),
        }),
    }
}

fn hotel_card(hotel: &Hotel) -> Card {
    let mut lines = Vec::new();
    if let Some(rating) = hotel.rating {
        lines.push(format!("Rated {}", rating.normalize()));
    }
    if let Some(n) = hotel.rooms_available {
        lines.push(format!("{n} rooms available"));
    }
    Card {
        title: hotel.name.clone(),
        subtitle: hotel.city.clone(),
        lines,
        action: None,
    }
}

fn render_booking(booking: &BookingRecord, default_currency: &str) -> View {
    if let Some(error) = &booking.error {
        return View::ErrorMessage(error.clone());
    }
    let total = booking.pricing.effective_total();
    if booking.booking_id.is_none()
        && booking.status.is_none()
        && booking.check_in.is_none()
        && total.is_none()
    {
        return View::Empty { message: None };
    }

    let currency = booking
        .pricing
        .currency
        .as_deref()
        .unwrap_or(default_currency);
    let mut lines = Vec::new();

    if let Some(room) = &booking.room_name {
        lines.push(room.clone());
    }
    match (booking.check_in, booking.check_out) {
        (Some(arrive), Some(depart)) => {
            lines.push(format!("{} to {}", format_date(arrive), format_date(depart)));
        }
        (Some(arrive), None) => lines.push(format!("Arriving {}", format_date(arrive))),
        _ => {}
    }
    let stay: Vec<String> = [
        booking.stay_nights().map(|n| plural(n, "night")),
        booking.guests.map(|n| plural(n, "guest")),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !stay.is_empty() {
        lines.push(stay.join(", "));
    }
    if let Some(guest) = &booking.guest_name {
        lines.push(format!("Guest: {guest}"));
    }

    let pricing = &booking.pricing;
    for (label, amount) in [
        ("Nightly rate", pricing.nightly_rate),
        ("Subtotal", pricing.subtotal),
        ("Taxes", pricing.taxes),
        ("Fees", pricing.fees),
        ("Total", total),
    ] {
        if let Some(amount) = amount {
            lines.push(format!("{label}: {}", format_money(amount, currency)));
        }
    }

    let title = booking
        .property_name
        .clone()
        .unwrap_or_else(|| "Your booking".to_string());
    let subtitle = match (&booking.booking_id, &booking.status) {
        (Some(id), Some(status)) => Some(format!("{id} ({status})")),
        (Some(id), None) => Some(id.clone()),
        (None, Some(status)) => Some(status.clone()),
        (None, None) => None,
    };
    let action = booking
        .booking_id
        .as_ref()
        .filter(|_| !booking.is_confirmed())
        .map(|id| CardAction::ConfirmBooking {
            booking_id: id.clone(),
        });

    View::BookingCard(Card {
        title,
        subtitle,
        lines,
        action,
    })
}

fn plural(n: u32, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// `189.5, "EUR"` -> `"EUR 189.50"`.
#[must_use]
pub fn format_money(amount: Decimal, currency: &str) -> String {
    format!(
        "{currency} {:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// `2026-03-14` -> `"Sat, Mar 14 2026"`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d %Y").to_string()
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "* {}", self.title)?;
        if let Some(subtitle) = &self.subtitle {
            write!(f, " [{subtitle}]")?;
        }
        writeln!(f)?;
        for line in &self.lines {
            writeln!(f, "    {line}")?;
        }
        match &self.action {
            Some(CardAction::SelectRoom { room_id }) => writeln!(f, "    -> select room {room_id}"),
            Some(CardAction::ConfirmBooking { booking_id }) => {
                writeln!(f, "    -> confirm booking {booking_id}")
            }
            None => Ok(()),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Loading => writeln!(f, "Loading..."),
            View::ErrorMessage(message) => writeln!(f, "Error: {message}"),
            View::Empty { message } => {
                writeln!(f, "{}", message.as_deref().unwrap_or(EMPTY_TEXT))
            }
            View::RoomCards {
                heading,
                count,
                cards,
            } => {
                if let Some(heading) = heading {
                    writeln!(f, "{heading}")?;
                }
                writeln!(f, "{count} room(s)")?;
                cards.iter().try_for_each(|card| write!(f, "{card}"))
            }
            View::HotelCards { count, cards } => {
                writeln!(f, "{count} hotel(s)")?;
                cards.iter().try_for_each(|card| write!(f, "{card}"))
            }
            View::BookingCard(card) => write!(f, "{card}"),
        }
    }
}
